//! FCM HTTP v1 implementation of the push-provider port.

mod client;
mod config;
mod message;

pub use client::FcmPushProvider;
pub use config::FcmConfig;
