//! # Quota Core
//!
//! The domain layer of the minute quota service.
//! This crate contains the fixed-window admission protocol with zero infrastructure
//! dependencies: every read and write goes through the [`ports::UsageStore`] port.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{UsageRecord, WindowKey};
pub use error::{QuotaError, StoreError};
pub use service::{Admission, AdmissionEngine, QuotaConfig, UsageReport, UsageReporter};
