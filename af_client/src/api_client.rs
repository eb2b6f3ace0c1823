//! HTTP API client for the ActsFile auth server.
//!
//! Every call runs under its own deadline covering both the request and the
//! body read. Responses are only parsed when they declare a JSON content
//! type; error envelopes are turned into [`ClientError`]s.

use actsfile::{
    auth::{
        ChangePasswordRequest, EmailVerificationRequest, LoginRequest, PasswordResetConfirm,
        PasswordResetRequest, ProfileUpdate, RegisterRequest, User,
    },
    messages::{ErrorResponse, LoginResponse, MessageResponse, UserResponse, routes},
};
use reqwest::{
    Method, RequestBuilder, Response,
    header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{future::Future, time::Duration};

use crate::{
    config::ClientConfig,
    errors::{ClientError, ClientResult},
};

const HTML_ERROR: &str = "Server error occurred. Please try again later.";
const NOT_JSON: &str = "Server returned invalid response format. Please try again.";
const BAD_JSON: &str = "Invalid server response format. Please try again.";
const INCOMPLETE: &str = "Invalid server response. Please try again.";

/// API client for communicating with the auth server
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    request_timeout: Duration,
    verify_timeout: Duration,
    probe_timeout: Duration,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.server_url.clone(),
            client: reqwest::Client::new(),
            request_timeout: config.request_timeout,
            verify_timeout: config.verify_timeout,
            probe_timeout: config.probe_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a server path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /auth/login`; returns the user and the session token
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<(User, String)> {
        let builder = self.client.post(self.url(routes::LOGIN)).json(request);
        let response: LoginResponse = self.call(builder, self.request_timeout).await?;

        match (response.user, response.token) {
            (Some(user), Some(token)) if !token.is_empty() => Ok((user, token)),
            _ => {
                log::error!("Login response is missing the token or the user");
                Err(ClientError::MalformedResponse(INCOMPLETE.to_string()))
            }
        }
    }

    /// `POST /auth/register`; returns the server's message
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<String> {
        let builder = self.client.post(self.url(routes::REGISTER)).json(request);
        self.message(builder).await
    }

    /// `GET /auth/verify` with the session token
    pub async fn verify(&self, token: &str) -> ClientResult<User> {
        let builder = self
            .client
            .get(self.url(routes::VERIFY))
            .header(AUTHORIZATION, bearer(token));
        let response: UserResponse = self.call(builder, self.verify_timeout).await?;
        response
            .user
            .ok_or_else(|| ClientError::MalformedResponse(INCOMPLETE.to_string()))
    }

    /// `PUT /auth/profile`
    pub async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> ClientResult<User> {
        let builder = self
            .client
            .put(self.url(routes::PROFILE))
            .header(AUTHORIZATION, bearer(token))
            .json(update);
        let response: UserResponse = self.call(builder, self.request_timeout).await?;
        response
            .user
            .ok_or_else(|| ClientError::MalformedResponse(INCOMPLETE.to_string()))
    }

    /// `POST /auth/change-password`
    pub async fn change_password(
        &self,
        token: &str,
        request: &ChangePasswordRequest,
    ) -> ClientResult<String> {
        let builder = self
            .client
            .post(self.url(routes::CHANGE_PASSWORD))
            .header(AUTHORIZATION, bearer(token))
            .json(request);
        self.message(builder).await
    }

    /// `POST /auth/reset-password`
    pub async fn request_password_reset(&self, request: &PasswordResetRequest) -> ClientResult<String> {
        let builder = self.client.post(self.url(routes::RESET_PASSWORD)).json(request);
        self.message(builder).await
    }

    /// `POST /auth/reset-password/confirm`
    pub async fn confirm_password_reset(&self, request: &PasswordResetConfirm) -> ClientResult<String> {
        let builder = self
            .client
            .post(self.url(routes::RESET_PASSWORD_CONFIRM))
            .json(request);
        self.message(builder).await
    }

    /// `POST /auth/verify-email`
    pub async fn verify_email(&self, request: &EmailVerificationRequest) -> ClientResult<String> {
        let builder = self.client.post(self.url(routes::VERIFY_EMAIL)).json(request);
        self.message(builder).await
    }

    /// Send a bodiless request and report the status code.
    ///
    /// Used by diagnostics; the body is never read.
    pub async fn probe(&self, method: Method, url: &str) -> ClientResult<u16> {
        let builder = self
            .client
            .request(method, url)
            .header(CACHE_CONTROL, "no-cache");

        let response = with_deadline(self.probe_timeout, async {
            builder.send().await.map_err(transport_error)
        })
        .await?;

        Ok(response.status().as_u16())
    }

    async fn message(&self, builder: RequestBuilder) -> ClientResult<String> {
        let response: MessageResponse = self.call(builder, self.request_timeout).await?;
        Ok(response.message)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        deadline: Duration,
    ) -> ClientResult<T> {
        let builder = builder.header(ACCEPT, "application/json");
        with_deadline(deadline, async {
            let response = builder.send().await.map_err(transport_error)?;
            decode(response).await
        })
        .await
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

async fn with_deadline<T, F>(deadline: Duration, future: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout),
    }
}

fn transport_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else {
        log::warn!("Request failed: {}", e);
        ClientError::Network(e.to_string())
    }
}

/// Check the content type, then split success bodies from error envelopes.
async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));

    let body = response.text().await.map_err(transport_error)?;

    if !is_json {
        log::error!(
            "Non-JSON response ({}): {}",
            status,
            body.chars().take(200).collect::<String>()
        );
        let message = if looks_like_html(&body) {
            HTML_ERROR
        } else {
            NOT_JSON
        };
        return Err(ClientError::Server(message.to_string()));
    }

    let value: Value = serde_json::from_str(&body).map_err(|e| {
        log::error!("Failed to parse JSON response: {}", e);
        ClientError::MalformedResponse(BAD_JSON.to_string())
    })?;

    let succeeded = value.get("success").and_then(Value::as_bool).unwrap_or(false);
    if !status.is_success() || !succeeded {
        let envelope: ErrorResponse = serde_json::from_value(value)
            .map_err(|_| ClientError::MalformedResponse(BAD_JSON.to_string()))?;
        return Err(ClientError::from_envelope(status.as_u16(), envelope));
    }

    serde_json::from_value(value).map_err(|e| {
        log::error!("Unexpected response shape: {}", e);
        ClientError::MalformedResponse(INCOMPLETE.to_string())
    })
}

fn looks_like_html(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    lowered.contains("<!doctype html") || lowered.contains("<html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let client = ApiClient::new(&ClientConfig::new("http://localhost:3000/"));
        assert_eq!(client.url(routes::LOGIN), "http://localhost:3000/auth/login");
    }

    #[test]
    fn test_html_detection() {
        assert!(looks_like_html("<!DOCTYPE html><html><body>502</body></html>"));
        assert!(looks_like_html("  <HTML>oops</HTML>"));
        assert!(!looks_like_html("Bad Gateway"));
    }

    #[tokio::test]
    async fn test_deadline_maps_to_timeout() {
        let result: ClientResult<()> = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ClientError::Timeout)));
    }
}
