//! Clinic REST backend: HTTP client, resource paths, error types.

pub mod client;
pub mod error;
pub mod resource;

use std::future::Future;

pub use client::ClinicClient;
pub use error::ApiError;
pub use resource::Resource;

use crate::models::Records;

/// Anything that can fetch a dashboard collection.
///
/// Implemented by `ClinicClient`; tests substitute scripted sources.
pub trait ResourceSource: Send + Sync + 'static {
    fn fetch(&self, resource: Resource)
        -> impl Future<Output = Result<Records, ApiError>> + Send;
}
