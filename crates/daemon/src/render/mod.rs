mod html;
mod json;
mod text;

pub use html::*;
pub use json::*;
pub use text::*;
