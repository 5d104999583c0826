// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Serena backend REST client.
//!
//! Handles:
//! - Sign-up and form-encoded sign-in
//! - Senior lookup, creation and user/senior association
//! - Prescriptions, symptoms, medications, dispenser and reports
//! - Mapping HTTP failures onto `AppError` (401 becomes `Unauthorized`)
//!
//! No retries: every call is a single request/response.

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::lenient;
use crate::models::{
    AuthSession, CompartmentUpdate, DeviceResponse, Medication, NewSenior, Prescription,
    PrescriptionDraft, SeniorReport, Senior, SignInForm, SignUpForm, Symptom,
};

/// Serena backend client.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.http_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ─── Auth ────────────────────────────────────────────────────────────────

    /// `POST /auth/register`.
    pub async fn register(&self, form: &SignUpForm) -> Result<AuthSession> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(form)
            .send()
            .await
            .map_err(transport_error)?;

        parse_json(response).await
    }

    /// `POST /auth/login`, form-encoded with the e-mail as `username`.
    pub async fn login(&self, form: &SignInForm) -> Result<AuthSession> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("username", form.email.as_str()),
                ("password", form.password.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        parse_json(response).await
    }

    // ─── Seniors ─────────────────────────────────────────────────────────────

    /// Seniors linked to a user.
    pub async fn seniors_by_user(&self, token: &str, user_id: &str) -> Result<Vec<Senior>> {
        let path = format!("/senior/by_user/{}", urlencoding::encode(user_id));
        self.get_json(&path, token).await
    }

    pub async fn create_senior(&self, token: &str, senior: &NewSenior) -> Result<()> {
        self.send(Method::POST, "/senior/", token, Some(senior)).await
    }

    /// Link an existing senior to a user.
    pub async fn relate_user_senior(
        &self,
        token: &str,
        user_id: &str,
        senior_id: &str,
    ) -> Result<()> {
        let response = self
            .http
            .post(self.url("/senior/relate_user_senior/"))
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("user_id", user_id), ("senior_id", senior_id)])
            .send()
            .await
            .map_err(transport_error)?;

        check_response(response).await?;
        Ok(())
    }

    // ─── Prescriptions ───────────────────────────────────────────────────────

    pub async fn prescriptions_by_senior(
        &self,
        token: &str,
        senior_id: &str,
    ) -> Result<Vec<Prescription>> {
        let path = format!("/prescriptions/by_senior/{}", urlencoding::encode(senior_id));
        let values: Vec<Value> = self.get_json(&path, token).await?;
        Ok(lenient::records(values, "prescription"))
    }

    pub async fn create_prescription(&self, token: &str, draft: &PrescriptionDraft) -> Result<()> {
        self.send(Method::POST, "/prescriptions/", token, Some(draft))
            .await
    }

    pub async fn update_prescription(
        &self,
        token: &str,
        prescription_id: &str,
        draft: &PrescriptionDraft,
    ) -> Result<()> {
        let path = format!("/prescriptions/{}", urlencoding::encode(prescription_id));
        self.send(Method::PUT, &path, token, Some(draft)).await
    }

    pub async fn delete_prescription(&self, token: &str, prescription_id: &str) -> Result<()> {
        let path = format!("/prescriptions/{}", urlencoding::encode(prescription_id));
        self.send::<()>(Method::DELETE, &path, token, None).await
    }

    // ─── Symptoms, medications ───────────────────────────────────────────────

    pub async fn symptoms_by_senior(&self, token: &str, senior_id: &str) -> Result<Vec<Symptom>> {
        let path = format!("/symptoms/by_senior/{}", urlencoding::encode(senior_id));
        let values: Vec<Value> = self.get_json(&path, token).await?;
        Ok(lenient::records(values, "symptom"))
    }

    pub async fn medications(&self, token: &str) -> Result<Vec<Medication>> {
        self.get_json("/medications/", token).await
    }

    // ─── Dispenser ───────────────────────────────────────────────────────────

    pub async fn device_by_senior(&self, token: &str, senior_id: &str) -> Result<DeviceResponse> {
        let path = format!("/device/by_senior/{}", urlencoding::encode(senior_id));
        self.get_json(&path, token).await
    }

    pub async fn update_compartment(
        &self,
        token: &str,
        compartment_id: &str,
        update: &CompartmentUpdate,
    ) -> Result<()> {
        let path = format!("/compartment/{}", urlencoding::encode(compartment_id));
        self.send(Method::PUT, &path, token, Some(update)).await
    }

    // ─── Reports ─────────────────────────────────────────────────────────────

    pub async fn report(&self, token: &str, senior_id: &str) -> Result<SeniorReport> {
        let path = format!("/reports/report/{}", urlencoding::encode(senior_id));
        self.get_json(&path, token).await
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    /// Authorized GET with JSON response.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T> {
        tracing::debug!(path, "GET");
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        parse_json(response).await
    }

    /// Authorized request whose response body is ignored.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<&B>,
    ) -> Result<()> {
        tracing::debug!(%method, path, "Sending");
        let mut request = self
            .http
            .request(method, self.url(path))
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        check_response(response).await?;
        Ok(())
    }
}

fn transport_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Network(format!("Request timed out: {}", e))
    } else {
        AppError::Network(e.to_string())
    }
}

/// Return the response if successful, else the mapped error.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(error_for_status(status, &body))
}

/// Check the response and parse its JSON body.
async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = check_response(response).await?;
    let body = response.text().await.map_err(transport_error)?;
    serde_json::from_str(&body)
        .map_err(|e| AppError::InvalidResponse(format!("JSON parse error: {}", e)))
}

/// Map a non-success status and body onto an `AppError`.
pub fn error_for_status(status: StatusCode, body: &str) -> AppError {
    if status == StatusCode::UNAUTHORIZED {
        return AppError::Unauthorized;
    }

    let message = extract_detail(body).unwrap_or_else(|| body.trim().to_string());
    if status == StatusCode::NOT_FOUND {
        tracing::debug!(message = %message, "Backend returned 404");
        return AppError::NotFound(if message.is_empty() {
            "resource".to_string()
        } else {
            message
        });
    }

    if status.is_server_error() {
        tracing::warn!(status = %status, "Backend server error");
    }
    AppError::Backend {
        status: status.as_u16(),
        message,
    }
}

/// Pull a human message out of an error body.
///
/// Understands `{"detail": "..."}`, FastAPI validation lists
/// (`{"detail": [{"msg": "..."}]}`) and `{"message": "..."}`.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail").or_else(|| value.get("message"))?;
    match detail {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    }
}
