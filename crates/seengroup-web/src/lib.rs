//! seengroup-web: HTTP gateway for the Seen Group site and admin dashboard.
//! Sits between the browser and the external backend:
//!   - Authenticated forwarding proxy with double-submit CSRF checks
//!   - Admin sign-in with one-time-code second factor
//!   - Career listings and job applications (multipart, résumé checks)
//!   - Contact form behind CAPTCHA verification
//!   - Product catalog passthrough

pub mod backend;
pub mod captcha;
pub mod handlers;
pub mod router;
pub mod session;
pub mod state;
