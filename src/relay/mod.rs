//! Email relay for sending a quote with photo attachments
//!
//! Assembles a raw MIME message (base64 HTML body plus at most
//! [`MAX_ATTACHMENTS`] JPEG attachments), signs the request with AWS SigV4
//! and posts it to the SES v2 `outbound-emails` endpoint. A failed send is
//! reported, never retried.

mod sigv4;

pub use sigv4::{sign_request, SigningParams};

use crate::core::RelayConfig;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard cap on forwarded photos; the config can only lower it
pub const MAX_ATTACHMENTS: usize = 5;

/// MIME line length for base64 bodies
const MIME_LINE_LEN: usize = 76;

/// Errors from the email relay, each mapping to an HTTP-style status
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Relay not configured: {0}")]
    Config(String),

    #[error("Upstream send failed ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl RelayError {
    /// Status code a relay endpoint would answer with
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::BadRequest(_) => 400,
            RelayError::Config(_) => 500,
            RelayError::Upstream { .. } | RelayError::Transport(_) => 502,
        }
    }
}

/// Secret credential pair used for signing
#[derive(Clone)]
pub struct RelayCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl RelayCredentials {
    /// Read `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY`
    pub fn from_env() -> Result<Self, RelayError> {
        let read = |key: &str| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| RelayError::Config(format!("Missing {} env", key)))
        };

        Ok(Self {
            access_key_id: read("AWS_ACCESS_KEY_ID")?,
            secret_access_key: read("AWS_SECRET_ACCESS_KEY")?,
        })
    }
}

impl std::fmt::Debug for RelayCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// A photo to attach, as a `data:` URL
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoAttachment {
    #[serde(default = "default_filename")]
    pub filename: String,
    #[serde(default)]
    pub data_url: String,
}

fn default_filename() -> String { "photo.jpg".to_string() }

impl PhotoAttachment {
    /// Build a JPEG data URL attachment from raw bytes
    pub fn from_bytes(filename: &str, bytes: &[u8]) -> Self {
        Self {
            filename: filename.to_string(),
            data_url: format!("data:image/jpeg;base64,{}", BASE64.encode(bytes)),
        }
    }

    /// The base64 payload after the comma, if any
    fn base64_payload(&self) -> Option<&str> {
        self.data_url
            .split_once(',')
            .map(|(_, payload)| payload)
            .filter(|payload| !payload.is_empty())
    }
}

/// Email to relay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailRequest {
    pub to: String,
    pub subject: String,
    pub html: String,
    #[serde(default)]
    pub photos: Vec<PhotoAttachment>,
}

impl EmailRequest {
    fn validate(&self) -> Result<(), RelayError> {
        if self.to.trim().is_empty() || self.subject.trim().is_empty() || self.html.is_empty() {
            return Err(RelayError::BadRequest("Missing to/subject/html".to_string()));
        }
        Ok(())
    }
}

/// Break an already base64-encoded payload into CRLF-separated MIME lines
fn wrap_base64(encoded: &str) -> String {
    encoded
        .as_bytes()
        .chunks(MIME_LINE_LEN)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Header value, as an RFC 2047 encoded word unless it is plain printable ASCII
fn encode_header(value: &str) -> String {
    if value.is_ascii() && !value.contains(['\r', '\n']) {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", BASE64.encode(value))
    }
}

/// Assemble the raw multipart MIME message. `max_attachments` is capped at
/// [`MAX_ATTACHMENTS`].
pub fn build_raw_message(
    from: &str,
    request: &EmailRequest,
    boundary: &str,
    max_attachments: usize,
) -> String {
    let mut parts = Vec::new();
    parts.push(format!(
        "--{}\r\nContent-Type: text/html; charset=\"UTF-8\"\r\nContent-Transfer-Encoding: base64\r\n\r\n{}\r\n",
        boundary,
        wrap_base64(&BASE64.encode(&request.html))
    ));

    // Photos without a payload still count against the limit
    for photo in request.photos.iter().take(max_attachments.min(MAX_ATTACHMENTS)) {
        let Some(payload) = photo.base64_payload() else {
            log::debug!("Skipping attachment {} with empty data", photo.filename);
            continue;
        };
        parts.push(format!(
            "--{b}\r\nContent-Type: image/jpeg; name=\"{f}\"\r\nContent-Disposition: attachment; filename=\"{f}\"\r\nContent-Transfer-Encoding: base64\r\n\r\n{p}\r\n",
            b = boundary,
            f = photo.filename,
            p = wrap_base64(payload)
        ));
    }
    parts.push(format!("--{}--", boundary));

    format!(
        "From: {}\r\nTo: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n{}",
        from,
        request.to,
        encode_header(&request.subject),
        boundary,
        parts.concat()
    )
}

/// SES v2 SendEmail body carrying a raw message
pub fn build_send_body(from: &str, to: &str, raw_message: &str) -> serde_json::Value {
    serde_json::json!({
        "Content": { "Raw": { "Data": BASE64.encode(raw_message) } },
        "Destination": { "ToAddresses": [to] },
        "FromEmailAddress": from,
    })
}

/// Client that signs and forwards quote emails
pub struct EmailRelay {
    config: RelayConfig,
    credentials: RelayCredentials,
    client: reqwest::Client,
}

impl EmailRelay {
    pub fn new(config: RelayConfig, credentials: RelayCredentials) -> Self {
        Self {
            config,
            credentials,
            client: reqwest::Client::new(),
        }
    }

    /// Send one email. Validation failures never reach the network.
    pub async fn send(&self, request: &EmailRequest) -> Result<(), RelayError> {
        request.validate()?;

        let from = self
            .config
            .from
            .as_deref()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| RelayError::Config("Missing SES_FROM env".to_string()))?;

        let boundary = format!("BOUNDARY-{}", uuid::Uuid::new_v4());
        let raw = build_raw_message(from, request, &boundary, self.config.max_attachments);
        let body = build_send_body(from, &request.to, &raw).to_string();

        let url = self.config.endpoint_url();
        let params = SigningParams {
            method: "POST",
            url: &url,
            service: "ses",
            region: &self.config.region,
            access_key_id: &self.credentials.access_key_id,
            secret_access_key: &self.credentials.secret_access_key,
        };
        let headers = sign_request(&params, body.as_bytes(), Utc::now())?;

        let mut builder = self.client.post(&url).body(body);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        log::info!("Relaying quote email to {}", request.to);
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("Email relay failed with {}: {}", status, body);
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
