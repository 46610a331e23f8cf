//! Cooperative cancellation for crawl runs.

mod token;

pub use token::CancellationToken;
