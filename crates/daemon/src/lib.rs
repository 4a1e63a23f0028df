mod elevation;
mod input;
mod render;
mod session;
mod stream;
mod utils;

pub use elevation::*;
pub use input::*;
pub use render::*;
pub use session::*;
pub use stream::*;
pub use utils::*;
