use crate::error::{Result, SigningError};
use chrono::{DateTime, NaiveDate, Utc};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::fmt;

/// Region marker fed into the HMAC chain for the asymmetric variant
pub const REGION_MARKER: &str = "*";

/// Default request type terminating the credential scope
pub const DEFAULT_REQUEST_TYPE: &str = "aws4_request";

/// Algorithm identifier for asymmetric request signing
pub const ALGORITHM: &str = "AWS4-ECDSA-P256-SHA256";

const DATE_FORMAT: &str = "%Y%m%d";

/// How the ECDSA nonce is chosen when signing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonceMode {
    /// Hedged nonce mixing fresh OS randomness; signatures differ per call
    #[default]
    Random,
    /// RFC 6979 nonce; identical inputs give byte-identical signatures
    Deterministic,
}

/// Long-lived signing configuration
///
/// Holds the secret access key plus the scope values that stay fixed across
/// requests. The per-request date is supplied at signing time.
///
/// # Example
/// ```rust
/// use sigv4a_sign::SigningConfig;
/// use secrecy::Secret;
///
/// let config = SigningConfig::new(
///     Secret::new("wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY".to_string()),
///     "s3",
/// );
/// assert_eq!(config.region_set, "*");
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct SigningConfig {
    /// Secret access key the HMAC chain starts from
    ///
    /// Never logged and zeroized when the configuration is dropped.
    pub secret_access_key: Secret<String>,
    /// Region set the request is scoped to
    ///
    /// Selects the asymmetric mode upstream and is echoed in request headers.
    /// The key derivation always uses [`REGION_MARKER`] regardless.
    #[serde(default = "default_region_set")]
    pub region_set: String,
    /// Service name, e.g. `s3`
    pub service: String,
    /// Request type terminating the scope
    #[serde(default = "default_request_type")]
    pub request_type: String,
    #[serde(default)]
    pub nonce: NonceMode,
}

fn default_region_set() -> String {
    REGION_MARKER.to_string()
}

fn default_request_type() -> String {
    DEFAULT_REQUEST_TYPE.to_string()
}

impl SigningConfig {
    pub fn new(secret_access_key: Secret<String>, service: impl Into<String>) -> Self {
        Self {
            secret_access_key,
            region_set: default_region_set(),
            service: service.into(),
            request_type: default_request_type(),
            nonce: NonceMode::default(),
        }
    }

    /// Build the per-request context for `date`
    pub fn context<'a>(&'a self, date: &'a str) -> Result<SigningContext<'a>> {
        SigningContext::new(
            self.secret_access_key.expose_secret().as_bytes(),
            date,
            &self.region_set,
            &self.service,
            &self.request_type,
        )
        .map(|ctx| ctx.with_nonce(self.nonce))
    }
}

/// Request-scoped inputs to one signing call
///
/// Borrowed from the caller and never retained past the call.
#[derive(Clone, Copy)]
pub struct SigningContext<'a> {
    pub(crate) secret: &'a [u8],
    pub(crate) date: &'a str,
    pub(crate) region_set: &'a str,
    pub(crate) service: &'a str,
    pub(crate) request_type: &'a str,
    pub(crate) nonce: NonceMode,
}

impl<'a> SigningContext<'a> {
    /// Create a context, validating the scope values
    ///
    /// # Errors
    /// - `Configuration` if `date` is not an 8-digit `YYYYMMDD` date, or if
    ///   `service` or `request_type` is empty
    ///
    /// An empty secret is accepted here and rejected by the HMAC chain.
    pub fn new(
        secret: &'a [u8],
        date: &'a str,
        region_set: &'a str,
        service: &'a str,
        request_type: &'a str,
    ) -> Result<Self> {
        validate_date(date)?;
        if service.is_empty() {
            return Err(SigningError::Configuration(
                "service must not be empty".to_string(),
            ));
        }
        if request_type.is_empty() {
            return Err(SigningError::Configuration(
                "request type must not be empty".to_string(),
            ));
        }
        Ok(Self {
            secret,
            date,
            region_set,
            service,
            request_type,
            nonce: NonceMode::default(),
        })
    }

    pub fn with_nonce(mut self, nonce: NonceMode) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn date(&self) -> &str {
        self.date
    }

    pub fn region_set(&self) -> &str {
        self.region_set
    }

    pub fn service(&self) -> &str {
        self.service
    }

    pub fn request_type(&self) -> &str {
        self.request_type
    }

    pub fn nonce(&self) -> NonceMode {
        self.nonce
    }

    /// Credential scope `<date>/<service>/<request_type>`
    ///
    /// The asymmetric scope carries no region component.
    pub fn credential_scope(&self) -> String {
        format!("{}/{}/{}", self.date, self.service, self.request_type)
    }
}

impl fmt::Debug for SigningContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningContext")
            .field("secret", &"[REDACTED]")
            .field("date", &self.date)
            .field("region_set", &self.region_set)
            .field("service", &self.service)
            .field("request_type", &self.request_type)
            .field("nonce", &self.nonce)
            .finish()
    }
}

/// Format `now` as the `YYYYMMDD` date stamp used in the credential scope
pub fn date_stamp(now: DateTime<Utc>) -> String {
    now.format(DATE_FORMAT).to_string()
}

fn validate_date(date: &str) -> Result<()> {
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SigningError::Configuration(format!(
            "date must be 8 digits (YYYYMMDD), got {date:?}"
        )));
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map(|_| ())
        .map_err(|e| SigningError::Configuration(format!("invalid date {date:?}: {e}")))
}
