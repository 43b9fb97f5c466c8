//! OpenType font support.

mod colr;
mod font;

pub use font::TtfFont;
