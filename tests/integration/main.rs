//! Integration tests for the odds arbitrage library.
//!
//! Run with: cargo test --test integration

mod engine;
mod properties;
