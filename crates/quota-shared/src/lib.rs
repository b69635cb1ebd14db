//! # Quota Shared
//!
//! Wire types of the quota HTTP API, shared between the server and its clients.

pub mod dto;
pub mod response;

pub use response::ErrorBody;
