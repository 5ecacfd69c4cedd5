pub mod allergies;
pub mod config;
pub mod error;
pub mod image;
pub mod pipeline;
pub mod poller;
pub mod presentation;
pub mod service;

pub use error::{Error, Result};
