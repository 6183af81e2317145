//! Incubator web server.
//!
//! Applicant intake and fee payment through Instamojo, staged application
//! progression, the Six Ways MOOC, founder timelines, mentoring options and
//! educational agreements.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx, behind the `IncubatorStore` trait
//! - **Payments**: Instamojo API client behind the `PaymentGateway` trait
//! - **Authentication**: login token with SHA-256 hashing; webhooks use HMAC-SHA1

pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod views;
