//! # Huntress connector
//!
//! Client for the Huntress `agents` API. Huntress reports no total page
//! count, so the full inventory is fetched with the sequential
//! until-empty strategy at up to 500 agents per page, throttled to
//! Huntress's documented 60 requests/second.

pub mod client;
pub mod config;

pub use client::{HuntressAgent, HuntressClient};
pub use config::HuntressConfig;
