//! Test utilities for integration testing.
//!
//! This module provides:
//! - Test data factories for principals and token configuration
//! - In-memory and failure-injecting `PrincipalRepo` implementations
//! - `TestAppStateBuilder` for HTTP-level tests

mod app_state_builder;
mod factories;
mod principal_mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use principal_mocks::*;
