//! Slack platform adapters.
//!
//! - `client`: Web API message sender
//! - `signature`: Events API request signature verification

pub mod client;
pub mod signature;

pub use client::SlackClient;
