//! REST client for the scenario backend

mod client;
pub mod types;

pub use client::ApiClient;
