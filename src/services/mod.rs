//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They talk to storage through `IncubatorStore` and to Instamojo through
//! `PaymentGateway`.

pub mod agreement_service;
pub mod instamojo;
pub mod payment_service;
pub mod timeline_service;
