//! Contact form validation.
//!
//! A submission passes three ordered gates, each short-circuiting:
//!
//! ```text
//! content-type == urlencoded → referer origin allowed → required fields present
//! ```
//!
//! The body is only parsed once the first two gates have passed.

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;
use url::{form_urlencoded, Origin, Url};

use crate::web::outcome::{Rejection, ValidationOutcome};
use crate::web::request::IncomingRequest;

/// The only accepted request media type.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Field holding the optional post-success redirect path.
pub const CONTINUATION_FIELD: &str = "_next";

/// Used when the `name` field is absent or empty.
pub const DEFAULT_NAME: &str = "Anonymous";

/// Origins allowed to post the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginAllowList {
    /// `*`: any origin.
    Any,
    Only(Vec<Origin>),
}

impl OriginAllowList {
    /// Parse a comma-separated list of origins, or a lone `*`.
    ///
    /// Entries may carry a path (`https://example.com/contact`); only their
    /// origin is kept.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let entries: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if entries == ["*"] {
            return Ok(OriginAllowList::Any);
        }
        if entries.is_empty() {
            return Err("no origins listed".to_string());
        }

        let mut origins = Vec::with_capacity(entries.len());
        for entry in entries {
            let url = Url::parse(entry).map_err(|e| format!("{entry:?}: {e}"))?;
            let origin = url.origin();
            if !origin.is_tuple() {
                return Err(format!("{entry:?} has no scheme/host origin"));
            }
            if !origins.contains(&origin) {
                origins.push(origin);
            }
        }
        Ok(OriginAllowList::Only(origins))
    }

    pub fn permits(&self, origin: &Origin) -> bool {
        match self {
            OriginAllowList::Any => true,
            OriginAllowList::Only(origins) => origins.contains(origin),
        }
    }

    /// Value for `Access-Control-Allow-Origin`, if the referer may see the
    /// response.
    pub fn cors_origin(&self, referer: Option<&str>) -> Option<String> {
        let referer = Url::parse(referer?).ok()?;
        match self {
            OriginAllowList::Any => Some("*".to_string()),
            OriginAllowList::Only(_) => {
                let origin = referer.origin();
                self.permits(&origin).then(|| origin.ascii_serialization())
            }
        }
    }
}

/// Gates applied to every form post.
#[derive(Debug, Clone)]
pub struct FormPolicy {
    pub allowed_origins: OriginAllowList,
    pub required_fields: Vec<String>,
}

/// Decoded form fields in submission order. Repeated keys keep their first
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    pub fn parse(body: &[u8]) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut fields: Vec<(String, String)> = Vec::new();
        for (key, value) in form_urlencoded::parse(body) {
            if seen.insert(key.to_string()) {
                fields.push((key.into_owned(), value.into_owned()));
            }
        }
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Present and not empty.
    pub fn get_filled(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An accepted form post.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub fields: FormFields,
    /// The referring page, already checked against the allow-list
    pub referer: Url,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(fields: FormFields, referer: Url) -> Self {
        Self {
            fields,
            referer,
            submitted_at: Utc::now(),
        }
    }

    pub fn email(&self) -> &str {
        self.fields.get("email").unwrap_or_default()
    }

    pub fn message(&self) -> Option<&str> {
        self.fields.get("message")
    }

    pub fn name(&self) -> &str {
        self.fields.get_filled("name").unwrap_or(DEFAULT_NAME)
    }

    pub fn continuation(&self) -> Option<&str> {
        self.fields.get_filled(CONTINUATION_FIELD)
    }

    /// RFC 3339 timestamp with millisecond precision.
    pub fn submitted_at_rfc3339(&self) -> String {
        self.submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Run a form post through the content-type, origin and required-field gates.
pub fn validate(request: &IncomingRequest, policy: &FormPolicy) -> ValidationOutcome<Submission> {
    if request.header("content-type") != Some(FORM_CONTENT_TYPE) {
        warn!(
            content_type = request.header("content-type").unwrap_or(""),
            "form_invalid_content_type"
        );
        return ValidationOutcome::Rejected(Rejection::invalid_request());
    }

    let referer = match request.header("referer").map(Url::parse) {
        Some(Ok(url)) => url,
        Some(Err(_)) | None => {
            warn!(has_referer = request.header("referer").is_some(), "form_invalid_referer");
            return ValidationOutcome::Rejected(Rejection::invalid_request());
        }
    };

    let origin = referer.origin();
    if !policy.allowed_origins.permits(&origin) {
        warn!(origin = %origin.ascii_serialization(), "form_origin_not_permitted");
        return ValidationOutcome::Rejected(Rejection::invalid_request());
    }

    let fields = FormFields::parse(request.body());

    let missing: Vec<String> = policy
        .required_fields
        .iter()
        .filter(|name| fields.get_filled(name).is_none())
        .cloned()
        .collect();

    if !missing.is_empty() {
        warn!(missing = %missing.join(","), "form_missing_fields");
        return ValidationOutcome::Rejected(Rejection::missing_fields(missing));
    }

    ValidationOutcome::Accepted(Submission::new(fields, referer))
}
