//! `EmailJS` REST transport.
//!
//! Posts each message to the `EmailJS` send endpoint with the configured
//! service, template, and public key. The template receives the
//! [`TemplateParams`] fields verbatim.
//!
//! See <https://www.emailjs.com/docs/rest-api/send/>

use serde::Serialize;

use crate::{EmailTransport, TemplateParams, TransportError};

/// Default `EmailJS` send endpoint.
pub const DEFAULT_API_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Credentials and endpoint for the `EmailJS` API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailJsConfig {
    /// Email service id.
    pub service_id: String,
    /// Template id.
    pub template_id: String,
    /// Account public key (sent as `user_id`).
    pub public_key: String,
    /// Optional private key (sent as `accessToken`) for non-browser use.
    pub private_key: Option<String>,
    /// Send endpoint.
    pub api_url: String,
}

impl EmailJsConfig {
    /// Reads the configuration from environment variables.
    ///
    /// Required: `EMAILJS_SERVICE_ID`, `EMAILJS_TEMPLATE_ID`,
    /// `EMAILJS_PUBLIC_KEY`. Optional: `EMAILJS_PRIVATE_KEY`,
    /// `EMAILJS_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Config`] naming the first missing variable.
    pub fn from_env() -> Result<Self, TransportError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`], reading variables through `lookup`.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Config`] naming the first missing variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TransportError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| TransportError::Config {
                message: format!("{key} environment variable not set"),
            })
        };

        Ok(Self {
            service_id: require("EMAILJS_SERVICE_ID")?,
            template_id: require("EMAILJS_TEMPLATE_ID")?,
            public_key: require("EMAILJS_PUBLIC_KEY")?,
            private_key: get("EMAILJS_PRIVATE_KEY"),
            api_url: get("EMAILJS_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        })
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: &'a TemplateParams,
}

impl<'a> SendRequest<'a> {
    fn new(config: &'a EmailJsConfig, params: &'a TemplateParams) -> Self {
        Self {
            service_id: &config.service_id,
            template_id: &config.template_id,
            user_id: &config.public_key,
            access_token: config.private_key.as_deref(),
            template_params: params,
        }
    }
}

/// Delivers alerts through `EmailJS`.
#[derive(Debug, Clone)]
pub struct EmailJsTransport {
    client: reqwest::Client,
    config: EmailJsConfig,
}

impl EmailJsTransport {
    /// Creates a transport with a default HTTP client.
    #[must_use]
    pub fn new(config: EmailJsConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Creates a transport using an existing HTTP client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client, config: EmailJsConfig) -> Self {
        Self { client, config }
    }

    /// The transport's configuration.
    #[must_use]
    pub const fn config(&self) -> &EmailJsConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl EmailTransport for EmailJsTransport {
    async fn send(&self, params: &TemplateParams) -> Result<(), TransportError> {
        let resp = self
            .client
            .post(&self.config.api_url)
            .json(&SendRequest::new(&self.config, params))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(TransportError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
