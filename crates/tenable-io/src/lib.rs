//! Tenable.io REST client implementing the scanning-service boundary.

mod client;
mod models;
mod scans;

pub use client::{ClientError, ClientSettings, TenableIo, DEFAULT_HOST, DEFAULT_PORT};
