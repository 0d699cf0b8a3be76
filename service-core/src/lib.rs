//! service-core: error type, request middleware and tracing setup shared by
//! the campaign tracker services.
pub mod error;
pub mod middleware;
pub mod observability;
