// POST /watermark and POST /layout: form handling around the layout core.

pub mod form;
pub mod handlers;
pub mod pipeline;
