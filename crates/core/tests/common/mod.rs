//! Common test utilities for supervisor integration tests.
//!
//! This module provides shared functionality across integration tests:
//! - Scripted provisioners and fixed inventories
//! - Isolated supervisor fixtures
//! - Event stream assertions

pub mod assertions;
pub mod fixtures;
pub mod mock_provisioners;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_provisioners::*;
