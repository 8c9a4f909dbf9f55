//! Mock implementations for testing.
//!
//! Both mocks are cheap to clone; clones share state, so a test can keep a
//! handle while the code under test owns another.

pub mod gateway;

pub use crate::storage::MemoryStorage;
pub use gateway::MockAuthGateway;
