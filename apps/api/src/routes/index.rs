use axum::response::Html;

const INDEX_HTML: &str = r#"<html>
  <head><title>Watermark API</title></head>
  <body style="font-family: sans-serif;">
    <h2>Watermark API</h2>
    <p>POST <code>/watermark</code> with an image file and fields to get the processed image.</p>
    <pre>
    curl -s -X POST \
      -F "file=@/path/to/image.jpg" \
      -F "text=Your watermark here" \
      -F "opacity=200" \
      -F "text_color=#000000" \
      -F "font_size=0" \
      -F "output=png" \
      http://localhost:8000/watermark > out.png
    </pre>
    <p>POST <code>/layout</code> with JSON <code>{"text", "width", "height"}</code> to preview line breaks.</p>
  </body>
</html>
"#;

/// GET /
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
