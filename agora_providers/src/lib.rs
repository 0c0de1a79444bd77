#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod gemini;
mod retry;

pub use gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiProvider};
pub use retry::{DEFAULT_RETRY_DELAYS, retry_with_backoff};
