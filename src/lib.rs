pub mod asr;
pub mod audio;
pub mod config;
pub mod diagnosis;
pub mod error;
pub mod server;
pub mod vlm;

pub use error::{Error, Result};
