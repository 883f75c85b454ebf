//! Configuration module

pub mod client;
pub mod settings;

pub use client::ClientSettings;
pub use settings::*;
