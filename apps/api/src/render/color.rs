use image::Rgba;

/// Parses `#RGB`, `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
/// Returns `None` for anything else.
pub fn parse_hex_color(input: &str) -> Option<Rgba<u8>> {
    let hex = input.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            // Each nibble is doubled: "f80" → "ff8800"
            let mut out = [0u8; 4];
            for (i, c) in hex.chars().enumerate() {
                let n = c.to_digit(16)? as u8;
                out[i] = n * 17;
            }
            out[3] = 255;
            Some(Rgba(out))
        }
        6 | 8 => {
            let r = channel(&hex[0..2])?;
            let g = channel(&hex[2..4])?;
            let b = channel(&hex[4..6])?;
            let a = if hex.len() == 8 {
                channel(&hex[6..8])?
            } else {
                255
            };
            Some(Rgba([r, g, b, a]))
        }
        _ => None,
    }
}
