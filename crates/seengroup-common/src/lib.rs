//! seengroup-common: errors, envelope, records and input checks shared by the gateway and client.

pub mod error;
pub mod envelope;
pub mod models;
pub mod filename;
pub mod validate;

// Re-export commonly used types
pub use error::{ApiError, SeenError};
pub use models::{Application, ApplicationJob, Category, Job, JobFilters, Product, ProductFilters};
