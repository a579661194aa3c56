pub mod codec;
pub mod neural;
pub mod pattern;
pub mod prelude;
pub mod viz;
