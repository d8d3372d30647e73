//! Axum router: maps all URL paths to handlers.

use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::handlers::{admin_career, auth, career, contact, products, proxy, system};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_body_bytes;
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Health
        .route("/livez",   get(system::livez))
        .route("/healthz", get(system::healthz))

        // Public site
        .route("/api/career",                    get(career::list_jobs).post(career::submit_application))
        .route("/api/career/jobs/{id}",          get(career::get_job))
        .route("/api/contact",                   post(contact::submit_contact))
        .route("/api/products",                  get(products::list_products))
        .route("/api/proxy/career/jobs/{id}",    get(career::proxy_job_detail))
        .route("/api/proxy/career/applications", post(career::proxy_application))

        // Admin session
        .route("/api/admin/auth",            get(auth::verify_session).post(auth::login))
        .route("/api/admin/auth/verify-otp", post(auth::verify_otp))
        .route("/api/admin/auth/resend-otp", post(auth::resend_otp))
        .route("/api/admin/logout",          post(auth::logout).get(auth::logout_not_allowed))
        .route("/api/admin/csrf",            get(auth::csrf_token))
        .route("/api/admin/change-password", put(auth::change_password))

        // Admin career
        .route("/api/admin/career/jobs",
            get(admin_career::list_jobs).post(admin_career::create_job))
        .route("/api/admin/career/jobs/{id}",
            get(admin_career::get_job).put(admin_career::update_job).delete(admin_career::delete_job))
        .route("/api/admin/career/applications",
            get(admin_career::list_applications)
                .patch(admin_career::update_application)
                .delete(admin_career::delete_application))
        .route("/api/admin/career/applications/bulk",          patch(admin_career::bulk_update))
        .route("/api/admin/career/applications/{id}/status",   patch(admin_career::set_application_status))
        .route("/api/admin/career/applications/{id}/email",    post(admin_career::email_applicant))
        .route("/api/admin/career/applications/{id}/resume",   get(admin_career::download_resume))
        .route("/api/admin/career/applications/{id}/cover-letter", get(admin_career::download_cover_letter))

        // Forwarding proxies
        .route("/api/proxy/{*path}",       any(proxy::general_proxy))
        .route("/api/admin/proxy/{*path}", any(proxy::admin_proxy))

        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
