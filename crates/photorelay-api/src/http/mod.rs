//! HTTP surface modules (router, handlers, error mapping).

/// JSON error wrapper returned by handlers.
pub mod errors;
/// Health and metrics endpoints.
pub mod health;
/// Stored photo listing.
pub mod photos;
/// Router construction and server host.
pub mod router;
/// Request-id scope middleware.
pub mod scope;
/// Human-readable status page.
pub mod status;
/// Photo upload endpoint.
pub mod upload;
