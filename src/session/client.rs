//! Auth endpoint bindings. [`AuthApi`] is the seam the session controller
//! talks to; [`HttpAuthApi`] implements it against the REST backend. These
//! calls carry passwords and temporary tokens and must never log payloads.

use crate::{
    api::{encode_path, ApiClient, ApiError},
    session::types::{
        LoginRequest, LoginResponse, LogoutRequest, ResendVerificationRequest, SendTokenRequest,
        SendTokenResponse, VerifyEmailResponse, VerifyTokenRequest, VerifyTokenResponse,
    },
};
use serde_json::Value;
use tracing::instrument;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const VERIFY_TOKEN_PATH: &str = "/api/verify-token";
pub const SEND_TOKEN_PATH: &str = "/api/send-token";
pub const VERIFY_EMAIL_PATH: &str = "/api/verify-email";
pub const RESEND_VERIFICATION_PATH: &str = "/api/resend-verification";

#[allow(async_fn_in_trait)]
pub trait AuthApi {
    /// `POST /api/auth/login`.
    async fn login(&self, request: &LoginRequest<'_>) -> Result<LoginResponse, ApiError>;

    /// `POST /api/verify-token`, exchanging a temporary token for a session id.
    async fn verify_token(
        &self,
        request: &VerifyTokenRequest<'_>,
    ) -> Result<VerifyTokenResponse, ApiError>;

    /// `POST /api/send-token`.
    async fn send_token(&self, request: &SendTokenRequest<'_>)
        -> Result<SendTokenResponse, ApiError>;

    /// `POST /api/auth/logout`. Callers treat the outcome as best-effort.
    async fn logout(&self, request: &LogoutRequest<'_>) -> Result<(), ApiError>;

    /// `GET /api/verify-email/:token`.
    async fn verify_email(&self, token: &str) -> Result<VerifyEmailResponse, ApiError>;

    /// `POST /api/resend-verification`.
    async fn resend_verification(
        &self,
        request: &ResendVerificationRequest<'_>,
    ) -> Result<(), ApiError>;
}

#[derive(Clone, Debug)]
pub struct HttpAuthApi {
    api: ApiClient,
}

impl HttpAuthApi {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }
}

impl AuthApi for HttpAuthApi {
    #[instrument(skip_all)]
    async fn login(&self, request: &LoginRequest<'_>) -> Result<LoginResponse, ApiError> {
        self.api.post_json(LOGIN_PATH, request, None).await
    }

    #[instrument(skip_all)]
    async fn verify_token(
        &self,
        request: &VerifyTokenRequest<'_>,
    ) -> Result<VerifyTokenResponse, ApiError> {
        self.api.post_json(VERIFY_TOKEN_PATH, request, None).await
    }

    #[instrument(skip_all)]
    async fn send_token(
        &self,
        request: &SendTokenRequest<'_>,
    ) -> Result<SendTokenResponse, ApiError> {
        self.api.post_json(SEND_TOKEN_PATH, request, None).await
    }

    #[instrument(skip_all)]
    async fn logout(&self, request: &LogoutRequest<'_>) -> Result<(), ApiError> {
        self.api.post_json_empty(LOGOUT_PATH, request, None).await
    }

    #[instrument(skip_all)]
    async fn verify_email(&self, token: &str) -> Result<VerifyEmailResponse, ApiError> {
        let token = encode_path(&[token.trim()])?;
        self.api
            .get_json(&format!("{VERIFY_EMAIL_PATH}{token}"), None)
            .await
    }

    #[instrument(skip_all)]
    async fn resend_verification(
        &self,
        request: &ResendVerificationRequest<'_>,
    ) -> Result<(), ApiError> {
        // some deployments answer with a JSON body, some with nothing
        self.api
            .post_json::<_, Value>(RESEND_VERIFICATION_PATH, request, None)
            .await
            .map(|_| ())
            .or_else(|err| match err {
                ApiError::Parse(_) => Ok(()),
                other => Err(other),
            })
    }
}
