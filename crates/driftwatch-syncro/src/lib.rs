//! # Syncro MSP connector
//!
//! Client for the Syncro MSP `customer_assets` API. Syncro reports the
//! total page count in response metadata, so the full inventory is fetched
//! with the metadata-driven parallel strategy, throttled by a shared
//! token-bucket limiter (3 requests/second with a 180-request burst
//! allowance, Syncro's documented limit).

pub mod client;
pub mod config;

pub use client::{SyncroAsset, SyncroClient};
pub use config::SyncroConfig;
