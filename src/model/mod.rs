pub mod analysis;
pub mod bot;
pub mod config;
pub mod image;
pub mod requests;

pub use analysis::*;
pub use bot::*;
pub use config::{Config, ModelSpec};
pub use image::{ImageInput, ImageInputError};
pub use requests::*;
