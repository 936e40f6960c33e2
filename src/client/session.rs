//! Authenticated session.
//!
//! The session owns its credentials and hands them to the engine on every
//! call. Logging in consumes the basic-auth session and returns one that
//! authenticates with the session token instead.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use idoit_protocol::headers;
use idoit_protocol::ops::{Login, LoginResponse, Logout};
use idoit_protocol::{Batch, BatchResponse, IdoitRequest};

use super::objects::ObjectsReader;
use super::rpc::{IdoitError, IdoitResult, JsonRpcClient};
use super::transport::{HttpConfig, HttpTransport};
use crate::config::ClientConfig;

/// The auth header set sent with a call. Exactly one is active at a time.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Before login: username and password.
    Basic { username: String, password: String },
    /// After login: the session token.
    Session { token: String },
}

impl Credentials {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn session(token: impl Into<String>) -> Self {
        Credentials::Session { token: token.into() }
    }

    /// Headers carrying these credentials.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        match self {
            Credentials::Basic { username, password } => vec![
                (headers::USERNAME, username.clone()),
                (headers::PASSWORD, password.clone()),
            ],
            Credentials::Session { token } => vec![(headers::SESSION, token.clone())],
        }
    }

    pub fn is_session(&self) -> bool {
        matches!(self, Credentials::Session { .. })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Credentials::Session { token } => {
                let prefix: String = token.chars().take(4).collect();
                f.debug_struct("Session")
                    .field("token", &format!("{}***", prefix))
                    .finish()
            }
        }
    }
}

/// A logical connection to one i-doit instance.
pub struct IdoitSession {
    client: JsonRpcClient,
    credentials: Credentials,
    login: Option<LoginResponse>,
}

impl IdoitSession {
    /// Create a session that has not logged in yet.
    pub fn new(client: JsonRpcClient, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            client,
            credentials: Credentials::basic(username, password),
            login: None,
        }
    }

    /// Build an HTTP-backed session from configuration. Does not log in.
    pub fn connect(config: &ClientConfig) -> IdoitResult<Self> {
        config.validate()?;
        let transport = HttpTransport::new(HttpConfig::from(config))?;
        let client = JsonRpcClient::new(Arc::new(transport), config.api_key.clone());
        Ok(Self::new(client, config.username.clone(), config.password.clone()))
    }

    /// Trade the username/password for a session token.
    ///
    /// On success every later call sends only `X-RPC-Auth-Session`.
    pub fn login(self) -> IdoitResult<Self> {
        let response = self.client.send(&self.credentials, &Login)?;
        if response.session_id.is_empty() {
            return Err(IdoitError::Protocol("Login returned an empty session id".to_string()));
        }

        info!(
            username = response.username.as_deref().unwrap_or_default(),
            "logged in"
        );

        Ok(Self {
            credentials: Credentials::session(response.session_id.clone()),
            login: Some(response),
            client: self.client,
        })
    }

    /// End the server-side session.
    pub fn logout(self) -> IdoitResult<()> {
        let response = self.client.send(&self.credentials, &Logout)?;
        info!(message = %response.message, "logged out");
        Ok(())
    }

    pub fn send<R: IdoitRequest>(&self, request: &R) -> IdoitResult<R::Response> {
        self.client.send(&self.credentials, request)
    }

    pub fn send_batch<R: IdoitRequest>(&self, batch: &Batch<R>) -> IdoitResult<BatchResponse<R::Response>> {
        self.client.send_batch(&self.credentials, batch)
    }

    /// Two-phase object reads through this session.
    pub fn objects(&self) -> ObjectsReader<'_> {
        ObjectsReader::new(self)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Details returned by the last successful login.
    pub fn login_info(&self) -> Option<&LoginResponse> {
        self.login.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.credentials.is_session()
    }
}
