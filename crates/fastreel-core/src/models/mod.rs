//! Data models for the application

mod aspect;
mod locator;
mod video;

pub use aspect::*;
pub use locator::*;
pub use video::*;
