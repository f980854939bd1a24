//! ordertrack: real-time delivery order tracking client
//!
//! This library provides the components for:
//! - A resilient WebSocket subscription client with automatic reconnection
//!   and exponential backoff (`tracking`)
//! - Order status taxonomy and a live-updating cached order view (`order`)
//! - Request/response access to the delivery backend (`api`)
//! - Configuration and structured logging

pub mod api;
pub mod cli;
pub mod config;
pub mod order;
pub mod telemetry;
pub mod tracking;
