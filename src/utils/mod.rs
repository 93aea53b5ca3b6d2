//! Utility modules for the relay

pub mod error;
