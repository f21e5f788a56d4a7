//! Integration tests for the galkin library
//!
//! This module organizes all integration tests that test the library as a whole,
//! rather than individual components.

// Full galaxy models driven like a sampler would
pub mod galaxy_models;
