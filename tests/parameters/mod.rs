//! Integration tests for the parameter system
//!
//! These tests verify the free/full bookkeeping of model sets and the
//! resolution of tied parameters.

// Free and full parameter vectors
mod store_tests;

// Tied parameters
mod tie_tests;
