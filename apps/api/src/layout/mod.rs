// Watermark text layout core.
// Pure and synchronous: resolve a font, wrap text to a pixel width, center the block.
// Callers on the async runtime must run it inside tokio::task::spawn_blocking.

pub mod block;
pub mod error;
pub mod fitter;
pub mod font_metrics;
pub mod font_resolver;

// Re-export the public API consumed by the render and watermark modules.
pub use block::{layout, max_line_width, LayoutResult, LineOrigin, PanelRect};
pub use error::LayoutError;
pub use fitter::{fit, WrappedBlock};
pub use font_resolver::{FontFace, FontResolver, FontSpec, ResolvedFont};
