//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (form or JSON body, URL params, etc.)
//! 2. Delegates to a service for business logic
//! 3. Returns an HTTP response (JSON, HTML page, redirect, status code)

/// Fee payment, stage confirmation and agreement endpoints
pub mod apply;
/// Service health
pub mod health;
/// Gateway redirect and webhook
pub mod instamojo;
/// Mentoring form options
pub mod mentoring;
/// Six Ways MOOC pages
pub mod six_ways_mooc;
/// Founder timeline endpoints
pub mod timeline_events;
