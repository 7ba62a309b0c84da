pub mod client;
pub mod errors;
pub mod guard;
pub mod pipeline;
pub mod types;

pub use client::{BROWSER_USER_AGENT, Fetcher};
pub use errors::FetchError;
pub use types::{Charset, RawPage};
