//! Admin API client.
//!
//! All requests carry an admin access token as a bearer token. Obtain one by
//! logging in with an admin account (for instance via
//! [`MemberClient::login`](super::MemberClient::login)).

use reqwest::Client;
use url::Url;
use uuid::Uuid;

use super::{ClientError, expect_success, parse_response};
use crate::objects::events::{CreateEventRequest, EventResponse, UpdateEventRequest};
use crate::objects::sweep::{RunSweepRequest, SweepReportResponse};
use crate::objects::users::{CreateUserRequest, UpdateUserRequest, UserResponse};

/// Typed HTTP client for the admin API.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl AdminClient {
    /// Create a new `AdminClient`.
    ///
    /// * `base_url` – root URL of the Stichtag server.
    /// * `token` – access token of an admin account.
    pub fn new(base_url: Url, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token: token.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /api/admin/users` – list all user accounts.
    pub async fn list_users(&self) -> Result<Vec<UserResponse>, ClientError> {
        let url = self.base_url.join("/api/admin/users")?;

        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `POST /api/admin/users` – create a user account.
    pub async fn create_user(
        &self,
        request: &CreateUserRequest,
    ) -> Result<UserResponse, ClientError> {
        let url = self.base_url.join("/api/admin/users")?;

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `PUT /api/admin/users/{username}` – update a user account.
    pub async fn update_user(
        &self,
        username: &str,
        request: &UpdateUserRequest,
    ) -> Result<UserResponse, ClientError> {
        let url = self.base_url.join(&format!(
            "/api/admin/users/{}",
            urlencoding::encode(username)
        ))?;

        let resp = self
            .http
            .put(url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `DELETE /api/admin/users/{username}` – delete a user account and its
    /// enrollments.
    pub async fn delete_user(&self, username: &str) -> Result<(), ClientError> {
        let url = self.base_url.join(&format!(
            "/api/admin/users/{}",
            urlencoding::encode(username)
        ))?;

        let resp = self
            .http
            .delete(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        expect_success(resp).await
    }

    /// `POST /api/admin/events` – create an event.
    pub async fn create_event(
        &self,
        request: &CreateEventRequest,
    ) -> Result<EventResponse, ClientError> {
        let url = self.base_url.join("/api/admin/events")?;

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `PUT /api/admin/events/{event_id}` – replace an event's data.
    pub async fn update_event(
        &self,
        event_id: Uuid,
        request: &UpdateEventRequest,
    ) -> Result<EventResponse, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/admin/events/{event_id}"))?;

        let resp = self
            .http
            .put(url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `DELETE /api/admin/events/{event_id}` – delete an event and its
    /// enrollments.
    pub async fn delete_event(&self, event_id: Uuid) -> Result<(), ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/admin/events/{event_id}"))?;

        let resp = self
            .http
            .delete(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        expect_success(resp).await
    }

    /// `POST /api/admin/sweep` – run the deadline sweep, optionally for a
    /// given date.
    pub async fn run_sweep(
        &self,
        request: &RunSweepRequest,
    ) -> Result<SweepReportResponse, ClientError> {
        let url = self.base_url.join("/api/admin/sweep")?;

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        parse_response(resp).await
    }
}
