//! Configuration module for environment variable parsing.
//!
//! Each binary loads its own configuration once at startup and hands it to
//! the router state. Required keys that are missing or empty are fatal.

use std::env;
use std::fmt;

use url::Url;

use crate::error::ConfigError;
use crate::web::form::{FormPolicy, OriginAllowList};
use crate::web::signature::SignaturePolicy;

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

/// Configuration for the issue bot binary.
#[derive(Clone)]
pub struct IssueBotConfig {
    /// Shared secret used to sign webhook deliveries
    pub webhook_secret: String,

    /// Token used to authenticate against the issues API
    pub github_token: String,

    /// Base URL of the issues API
    pub github_api_url: Url,

    /// Whether unsigned deliveries are rejected
    pub signature_policy: SignaturePolicy,

    /// Outbound HTTP request timeout in milliseconds
    pub http_timeout_ms: u64,

    /// Port for the web server to listen on
    pub port: u16,
}

impl IssueBotConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        Ok(IssueBotConfig {
            webhook_secret: vars.required("GITHUB_WEBHOOK_SECRET")?,
            github_token: vars.required("GITHUB_TOKEN")?,
            github_api_url: vars.url_or("GITHUB_API_URL", DEFAULT_GITHUB_API_URL)?,
            signature_policy: SignaturePolicy {
                require_signature: vars.bool_or("REQUIRE_WEBHOOK_SIGNATURE", false)?,
            },
            http_timeout_ms: vars.parse_or("HTTP_TIMEOUT_MS", DEFAULT_HTTP_TIMEOUT_MS)?,
            port: vars.parse_or("PORT", DEFAULT_PORT)?,
        })
    }
}

impl fmt::Debug for IssueBotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssueBotConfig")
            .field("webhook_secret", &"<REDACTED>")
            .field("github_token", &"<REDACTED>")
            .field("github_api_url", &self.github_api_url.as_str())
            .field("signature_policy", &self.signature_policy)
            .field("http_timeout_ms", &self.http_timeout_ms)
            .field("port", &self.port)
            .finish()
    }
}

/// SMTP relay settings for notification emails.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Also used as the sender address
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

/// Appwrite document database settings.
#[derive(Clone)]
pub struct AppwriteConfig {
    pub endpoint: Url,
    pub project: String,
    pub api_key: Option<String>,
    pub database_id: Option<String>,
    pub collection_id: Option<String>,
}

impl AppwriteConfig {
    /// Database and collection to persist submissions into.
    ///
    /// Persistence is enabled only when both ids are configured.
    pub fn collection(&self) -> Option<(&str, &str)> {
        match (&self.database_id, &self.collection_id) {
            (Some(db), Some(collection)) => Some((db.as_str(), collection.as_str())),
            _ => None,
        }
    }
}

impl fmt::Debug for AppwriteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppwriteConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("project", &self.project)
            .field("api_key", &self.api_key.as_ref().map(|_| "<REDACTED>"))
            .field("database_id", &self.database_id)
            .field("collection_id", &self.collection_id)
            .finish()
    }
}

/// Configuration for the contact form binary.
#[derive(Debug, Clone)]
pub struct ContactFormConfig {
    /// Recipient of submission notifications
    pub submit_email: String,

    pub smtp: SmtpConfig,

    pub appwrite: AppwriteConfig,

    /// Origin allow-list and required fields
    pub form: FormPolicy,

    /// Outbound HTTP request timeout in milliseconds
    pub http_timeout_ms: u64,

    /// Port for the web server to listen on
    pub port: u16,
}

impl ContactFormConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let allowed_origins = OriginAllowList::parse(&vars.required("ALLOWED_ORIGINS")?)
            .map_err(|reason| ConfigError::Invalid {
                name: "ALLOWED_ORIGINS",
                reason,
            })?;

        let required_fields = vars
            .csv("REQUIRED_FIELDS")
            .unwrap_or_else(|| vec!["email".to_string()]);
        if required_fields.is_empty() {
            return Err(ConfigError::Invalid {
                name: "REQUIRED_FIELDS",
                reason: "at least one field name is required".to_string(),
            });
        }

        Ok(ContactFormConfig {
            submit_email: vars.required("SUBMIT_EMAIL")?,
            smtp: SmtpConfig {
                host: vars.required("SMTP_HOST")?,
                port: vars.parse_or("SMTP_PORT", DEFAULT_SMTP_PORT)?,
                username: vars.required("SMTP_USERNAME")?,
                password: vars.required("SMTP_PASSWORD")?,
            },
            appwrite: AppwriteConfig {
                endpoint: vars.required_url("APPWRITE_ENDPOINT")?,
                project: vars.required("APPWRITE_PROJECT")?,
                api_key: vars.optional("APPWRITE_API_KEY"),
                database_id: vars.optional("APPWRITE_DATABASE_ID"),
                collection_id: vars.optional("APPWRITE_COLLECTION_ID"),
            },
            form: FormPolicy {
                allowed_origins,
                required_fields,
            },
            http_timeout_ms: vars.parse_or("HTTP_TIMEOUT_MS", DEFAULT_HTTP_TIMEOUT_MS)?,
            port: vars.parse_or("PORT", DEFAULT_PORT)?,
        })
    }
}

/// Typed accessors over a key lookup. Blank values count as unset.
struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn parse_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: fmt::Display,
    {
        match self.optional(name) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            }),
        }
    }

    fn bool_or(&self, name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.optional(name).map(|v| v.to_ascii_lowercase()) {
            None => Ok(default),
            Some(v) => match v.as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::Invalid {
                    name,
                    reason: format!("expected a boolean, got {v:?}"),
                }),
            },
        }
    }

    fn required_url(&self, name: &'static str) -> Result<Url, ConfigError> {
        let raw = self.required(name)?;
        parse_url(name, &raw)
    }

    fn url_or(&self, name: &'static str, default: &str) -> Result<Url, ConfigError> {
        let raw = self.optional(name).unwrap_or_else(|| default.to_string());
        parse_url(name, &raw)
    }

    /// Parse a comma-separated list of strings.
    fn csv(&self, name: &str) -> Option<Vec<String>> {
        self.optional(name).map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}
