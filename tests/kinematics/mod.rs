//! Integration tests for rotation curve evaluation

// Adiabatic contraction and pressure support
mod rotation_tests;
