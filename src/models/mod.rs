pub mod manifest;
pub mod sticker;

pub use manifest::*;
pub use sticker::*;
