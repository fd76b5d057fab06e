//! HTTP layer: the Slack Events API endpoint and a health check.

pub mod error;
pub mod handlers;
pub mod router;
