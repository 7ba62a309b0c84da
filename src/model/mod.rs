pub mod client;
pub mod errors;
pub mod fences;
pub mod types;

pub use client::{GeminiClient, ModelClient};
pub use errors::ModelError;

#[cfg(test)]
pub use client::MockModelClient;
