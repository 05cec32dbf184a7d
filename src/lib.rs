pub mod map;
pub mod config;
mod util;

pub use util::*;
