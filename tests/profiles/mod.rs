//! Integration tests for the mass profiles

// Enclosed mass, density and velocity of every profile
mod profile_tests;

// Halo parameters from a target dark matter fraction
mod fdm_tests;
