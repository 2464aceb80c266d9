//! HTTP middleware for request processing and protection.
//!
//! Provides optional bearer authentication for the management API and
//! request tracing for every route.

pub mod auth;
pub mod tracing;
