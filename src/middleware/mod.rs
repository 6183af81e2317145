//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers.
//! They can:
//! - Identify the signed-in user
//! - Lock route groups behind feature flags
//! - Short-circuit requests (reject, or redirect to sign in)

/// Login token authentication
pub mod auth;
/// Feature flag gates
pub mod feature_flag;
/// Six Ways MOOC student authorization
pub mod mooc;
