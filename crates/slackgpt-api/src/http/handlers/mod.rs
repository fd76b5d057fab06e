//! HTTP request handlers.

pub mod events;
