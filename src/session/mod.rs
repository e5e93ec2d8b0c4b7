//! Authenticated session lifecycle: login, re-authentication, expiry.
//!
//! This module owns the one long-lived HTTP context the rest of the pipeline
//! shares. A [`Session`] wraps a reqwest `Client` with a cookie jar, tracks
//! whether a login has succeeded, and knows how to (re-)authenticate against
//! the site's form-based login.
//!
//! # Login flow
//!
//! 1. `GET /login` and extract the anti-forgery token from the hidden
//!    `_token` input.
//! 2. `POST /login` with `_token`, `email`, and `password` form fields.
//! 3. Classify the response: if the body is itself another login form, the
//!    credentials were rejected.
//!
//! The rejection heuristic matches on the form's opening tag and is fragile
//! by nature; it tracks what the site currently serves, nothing more.

mod error;
mod expiry;

pub use error::AuthError;
pub use expiry::{ExpectedPayload, ExpiryPolicy, RedirectOrHtmlPolicy, response_expired};

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::{Client, ClientBuilder};
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Default HTTP connect timeout (30 seconds).
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes, downloads share this client's pool).
const READ_TIMEOUT_SECS: u64 = 300;

/// Opening tag of the login form as the site currently serves it.
///
/// A successful POST lands on the catalog; a rejected one re-renders the
/// form, and the body starts with this tag. Weak signal, documented as such.
const LOGIN_FORM_PREFIX: &str = "<form method=\"POST\" action=";

/// Email/password pair held only for the duration of a login attempt.
#[derive(Clone)]
pub struct Credentials {
    /// Account email address.
    pub email: String,
    /// Account password. Redacted from `Debug` output.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source of credentials for interactive (re-)authentication.
///
/// The binary implements this over terminal prompts; tests supply canned
/// values. Keeping the prompt behind a trait keeps the session free of any
/// terminal dependency.
pub trait CredentialPrompt {
    /// Collects an email/password pair from the user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Prompt`] when input cannot be read.
    fn credentials(&self) -> Result<Credentials, AuthError>;

    /// Asks whether another attempt should be made after a rejected login.
    fn retry_after_rejection(&self) -> bool;
}

/// One authenticated HTTP context shared by catalog fetches and downloads.
///
/// Created once by the top-level controller and passed by reference into the
/// catalog client and downloader; there is no hidden module-level state.
#[derive(Debug)]
pub struct Session {
    client: Client,
    base: Url,
    authenticated: bool,
}

impl Session {
    /// Creates an unauthenticated session against the given base origin.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static configuration.
    /// This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(base: Url) -> Self {
        let cookie_jar = Arc::new(Jar::default());
        let client = ClientBuilder::new()
            .cookie_provider(cookie_jar)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .read_timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self {
            client,
            base,
            authenticated: false,
        }
    }

    /// Returns the shared HTTP client.
    #[must_use]
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Returns the base origin all requests resolve under.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Returns whether a login has succeeded on this session.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Attempts a form login with the given credentials.
    ///
    /// Returns `Ok(true)` on success (the session is marked authenticated),
    /// `Ok(false)` when the site rejected the credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenNotFound`] when the hidden `_token` input is
    /// missing from the login page, or [`AuthError::Network`] on transport
    /// failure.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&mut self, credentials: &Credentials) -> Result<bool, AuthError> {
        let login_url = self
            .base
            .join("login")
            .map_err(|_| AuthError::invalid_url(format!("{}login", self.base)))?;

        debug!(url = %login_url, "fetching login form");
        let form_body = self
            .client
            .get(login_url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AuthError::network(login_url.as_str(), e))?
            .text()
            .await
            .map_err(|e| AuthError::network(login_url.as_str(), e))?;

        let token = extract_login_token(&form_body).ok_or(AuthError::TokenNotFound)?;
        debug!("extracted login token");

        let response_body = self
            .client
            .post(login_url.clone())
            .form(&[
                ("_token", token.as_str()),
                ("email", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::network(login_url.as_str(), e))?
            .text()
            .await
            .map_err(|e| AuthError::network(login_url.as_str(), e))?;

        // A rejected login re-renders the form as the response body.
        if response_body.trim_start().starts_with(LOGIN_FORM_PREFIX) {
            warn!("login rejected (response is the login form again)");
            return Ok(false);
        }

        self.authenticated = true;
        info!("login successful");
        Ok(true)
    }

    /// Ensures the session is authenticated, prompting for credentials as
    /// needed. Idempotent: an already-authenticated session returns
    /// immediately.
    ///
    /// Rejected logins loop while the prompt agrees to retry. Returns
    /// `Ok(false)` when the user gives up.
    ///
    /// # Errors
    ///
    /// Propagates login and prompt failures; the interactive layer decides
    /// whether to retry those.
    #[instrument(skip(self, prompt))]
    pub async fn ensure_authenticated(
        &mut self,
        prompt: &dyn CredentialPrompt,
    ) -> Result<bool, AuthError> {
        if self.authenticated {
            return Ok(true);
        }
        loop {
            let credentials = prompt.credentials()?;
            if self.login(&credentials).await? {
                return Ok(true);
            }
            if !prompt.retry_after_rejection() {
                return Ok(false);
            }
        }
    }

    /// Drops the authenticated flag, forcing the next
    /// [`ensure_authenticated`](Self::ensure_authenticated) to log in again.
    ///
    /// Used after the downloader's pre-flight check detects an expired
    /// session.
    pub fn mark_expired(&mut self) {
        if self.authenticated {
            info!("session marked expired");
        }
        self.authenticated = false;
    }
}

/// Pulls the anti-forgery token out of the login page markup.
///
/// Sync helper so the parsed document never lives across an await point.
fn extract_login_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"input[type="hidden"][name="_token"]"#).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(std::string::ToString::to_string)
}
