//! seengroup-client: what the Seen Group pages do on the browser side,
//! expressed as a library:
//!   - Filter-keyed list caching with visibility-aware invalidation
//!   - Debounced search input and cancellation of superseded fetches
//!   - Local pagination of fully fetched lists
//!   - Retry wrapper and visibility-gated poller for dashboard stats
//!   - Admin sign-in state machine with a second factor
//!   - Applicant document downloads named after the applicant

pub mod auth;
pub mod cache;
pub mod debounce;
pub mod download;
pub mod error;
pub mod fetch;
pub mod gateway;
pub mod list;
pub mod pagination;

pub use auth::{SignInFlow, SignInState};
pub use error::ClientError;
pub use gateway::GatewayClient;
pub use list::{ListController, ListState};
pub use pagination::Page;
