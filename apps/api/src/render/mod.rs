// Image side of the watermark: decode the upload, composite the panel and
// text from a LayoutResult, re-encode in the requested format.

pub mod codec;
pub mod color;
pub mod compositor;

pub use codec::{decode, encode, OutputFormat};
pub use color::parse_hex_color;
pub use compositor::{composite, WatermarkStyle};
