//! Data models for the application
//!
//! This module contains the persisted records and response types for the
//! video ingestion pipeline, organized by domain.

mod frame;
mod video;

// Re-export all models for convenient imports
pub use frame::*;
pub use video::*;
