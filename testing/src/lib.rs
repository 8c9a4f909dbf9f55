//! # ipgate Testing
//!
//! Testing utilities for reducers built on `ipgate-core`.
//!
//! This crate provides:
//! - [`ReducerTest`]: a Given-When-Then harness for reducers
//! - [`assertions`]: helpers for inspecting returned effects
//!
//! Mock providers for the auth crate (gateway, storage) live next to the
//! traits they implement, in `ipgate_auth::mocks`.

pub mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};
