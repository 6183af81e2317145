//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables.

/// Application stages, batches, applicants and applications
pub mod application;
/// Mentoring directory option sets
pub mod mentor;
/// Six Ways MOOC student profiles
pub mod mooc_student;
/// Application fee payments
pub mod payment;
/// Founder timeline events
pub mod timeline_event;
/// Signed-in users
pub mod user;
