//! Admin sign-in as a state machine.
//!
//! ```text
//! Unauthenticated --credentials--> Authenticated            (200)
//! Unauthenticated --credentials--> AwaitingCode { otp_id }  (202 + otpId)
//! AwaitingCode    --code---------> Authenticated
//! Authenticated   --logout-------> Unauthenticated
//! Authenticated   --validate(401)> Unauthenticated
//! ```
//!
//! Failed submissions leave the state as it was. Input that fails the local
//! shape checks is refused before any request is made.

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use seengroup_common::envelope::{error_or_message, is_success};
use seengroup_common::validate::{is_valid_email, is_valid_otp_code, is_valid_password};

use crate::error::{ClientError, Result};
use crate::gateway::GatewayClient;

#[derive(Debug, Clone, PartialEq)]
pub enum SignInState {
    Unauthenticated,
    AwaitingCode { otp_id: String },
    Authenticated { user: Value },
}

pub struct SignInFlow {
    gateway: GatewayClient,
    state: SignInState,
    last_error: Option<String>,
}

impl SignInFlow {
    pub fn new(gateway: GatewayClient) -> Self {
        Self { gateway, state: SignInState::Unauthenticated, last_error: None }
    }

    pub fn state(&self) -> &SignInState {
        &self.state
    }

    /// Message of the most recent failed step, cleared by the next attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn gateway(&self) -> &GatewayClient {
        &self.gateway
    }

    fn fail(&mut self, err: ClientError) -> ClientError {
        self.last_error = Some(err.to_string());
        err
    }

    #[instrument(skip(self, password))]
    pub async fn submit_credentials(
        &mut self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<&SignInState> {
        if self.state != SignInState::Unauthenticated {
            return Err(ClientError::InvalidState);
        }
        self.last_error = None;
        if !is_valid_email(email) || !is_valid_password(password) {
            return Err(self.fail(ClientError::Validation(
                "Please fill in all fields correctly".to_string(),
            )));
        }

        let body = json!({ "email": email, "password": password, "rememberMe": remember_me });
        let reply = match self.gateway.send_json(Method::POST, "/api/admin/auth", &body).await {
            Ok(r) => r,
            Err(e) => return Err(self.fail(e)),
        };

        if reply.status == 202 {
            if let Some(otp_id) = reply.body.pointer("/data/otpId").and_then(Value::as_str) {
                info!("second factor required");
                self.state = SignInState::AwaitingCode { otp_id: otp_id.to_string() };
                return Ok(&self.state);
            }
        }
        if reply.is_ok() && is_success(&reply.body) {
            self.state = SignInState::Authenticated { user: user_of(&reply.body) };
            return Ok(&self.state);
        }
        Err(self.fail(ClientError::Rejected {
            status: reply.status,
            message: error_or_message(&reply.body, "Invalid credentials"),
        }))
    }

    #[instrument(skip(self, code))]
    pub async fn submit_code(&mut self, code: &str) -> Result<&SignInState> {
        let SignInState::AwaitingCode { otp_id } = &self.state else {
            return Err(ClientError::InvalidState);
        };
        let otp_id = otp_id.clone();
        self.last_error = None;
        if !is_valid_otp_code(code) {
            return Err(self.fail(ClientError::Validation(
                "Please enter the 6-digit code".to_string(),
            )));
        }

        let body = json!({ "otpId": otp_id, "code": code });
        let reply = match self
            .gateway
            .send_json(Method::POST, "/api/admin/auth/verify-otp", &body)
            .await
        {
            Ok(r) => r,
            Err(e) => return Err(self.fail(e)),
        };
        if reply.is_ok() && is_success(&reply.body) {
            self.state = SignInState::Authenticated { user: user_of(&reply.body) };
            return Ok(&self.state);
        }
        warn!(status = reply.status, "code rejected");
        Err(self.fail(ClientError::Rejected {
            status: reply.status,
            message: error_or_message(&reply.body, "Invalid or expired code"),
        }))
    }

    /// Asks for a fresh code. The state does not change.
    pub async fn resend(&mut self) -> Result<()> {
        let SignInState::AwaitingCode { otp_id } = &self.state else {
            return Err(ClientError::InvalidState);
        };
        let body = json!({ "otpId": otp_id });
        self.last_error = None;
        let reply = match self
            .gateway
            .send_json(Method::POST, "/api/admin/auth/resend-otp", &body)
            .await
        {
            Ok(r) => r,
            Err(e) => return Err(self.fail(e)),
        };
        if reply.is_ok() {
            return Ok(());
        }
        Err(self.fail(ClientError::Rejected {
            status: reply.status,
            message: error_or_message(&reply.body, "Please wait before requesting a new code"),
        }))
    }

    /// Abandons a pending code challenge.
    pub fn cancel(&mut self) {
        if matches!(self.state, SignInState::AwaitingCode { .. }) {
            self.state = SignInState::Unauthenticated;
        }
    }

    /// Ends the session. The local state is reset even when the gateway
    /// cannot be reached; that error is still returned.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<()> {
        self.state = SignInState::Unauthenticated;
        self.last_error = None;
        let reply = match self.gateway.send_json(Method::POST, "/api/admin/logout", &json!({})).await {
            Ok(r) => r,
            Err(e) => return Err(self.fail(e)),
        };
        reply.into_result("Logout failed").map(|_| ())
    }

    /// Re-checks the session cookie with the gateway. A rejection drops to
    /// `Unauthenticated`; transport errors leave the state alone.
    pub async fn validate(&mut self) -> Result<&SignInState> {
        let builder = self.gateway.request(Method::GET, "/api/admin/auth")?;
        let reply = self.gateway.send(builder).await?;
        if reply.is_ok() && is_success(&reply.body) {
            self.state = SignInState::Authenticated { user: user_of(&reply.body) };
        } else {
            info!(status = reply.status, "session no longer valid");
            self.state = SignInState::Unauthenticated;
        }
        Ok(&self.state)
    }
}

/// `user` at the top level, else `data.user`, else null.
fn user_of(body: &Value) -> Value {
    body.get("user")
        .or_else(|| body.pointer("/data/user"))
        .cloned()
        .unwrap_or(Value::Null)
}
