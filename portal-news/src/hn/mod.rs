//! Hacker News Firebase API: client and response models.
pub mod client;
pub mod types;

pub use client::NewsClient;
pub use types::Story;
