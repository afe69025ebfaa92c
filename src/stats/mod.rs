//! Stats subscriptions and broadcast
//!
//! This module provides:
//! - The registry of peers subscribed to status broadcasts
//! - The UDP service handling subscriptions and the periodic send

pub mod registry;
pub mod service;

pub use registry::SubscriberRegistry;
pub use service::StatsService;
