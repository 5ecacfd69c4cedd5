mod client;
mod types;

pub use client::{HttpInferenceClient, InferenceClient};
pub use types::*;
