//! API layer - HTTP entry points.

pub mod dto;
pub mod error;
pub mod http;

pub use error::ApiError;
