//! Mocked responses.
//!
//! A [`MockDefinition`] is the raw record posted to the management API. It is
//! turned into a [`Mock`] by validated conversion; a `Mock` always has an id, a
//! method, a status code and exactly one URL matcher.

use crate::error::{ApiError, ValidationError};
use crate::matcher::{body_matches, UrlMatcher};
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// A mock as submitted to the management API, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockDefinition {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub method: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub url_pattern: Option<String>,

    #[serde(default)]
    pub request_body: Option<Value>,

    #[serde(default)]
    pub response_status_code: Option<u16>,

    #[serde(default)]
    pub response_body: Option<Value>,
}

/// A validated mock.
#[derive(Debug, Clone)]
pub struct Mock {
    id: String,
    method: String,
    url: UrlMatcher,
    request_body: Option<Value>,
    response_status_code: u16,
    response_body: Option<Value>,
    last_access: DateTime<Utc>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<MockDefinition> for Mock {
    type Error = ValidationError;

    fn try_from(definition: MockDefinition) -> Result<Self, Self::Error> {
        let id = non_empty(definition.id).ok_or(ValidationError::MissingId)?;
        let method = non_empty(definition.method).ok_or(ValidationError::MissingMethod)?;

        let response_status_code = match definition.response_status_code {
            None | Some(0) => return Err(ValidationError::MissingStatusCode),
            Some(code) if !(100..=999).contains(&code) => {
                return Err(ValidationError::InvalidStatusCode(code))
            }
            Some(code) => code,
        };

        let url = match (non_empty(definition.url), non_empty(definition.url_pattern)) {
            (Some(_), Some(_)) => return Err(ValidationError::BothUrlAndPattern),
            (None, None) => return Err(ValidationError::NoUrlOrPattern),
            (Some(url), None) => UrlMatcher::Exact(url),
            (None, Some(pattern)) => UrlMatcher::pattern(&pattern)
                .map_err(|e| ValidationError::InvalidPattern(e.to_string()))?,
        };

        Ok(Self {
            id,
            method,
            url,
            request_body: definition.request_body,
            response_status_code,
            response_body: definition.response_body,
            last_access: Utc::now(),
        })
    }
}

impl Mock {
    /// Parse and validate a JSON management body in one step.
    pub fn from_json(json: &[u8]) -> Result<Self, ApiError> {
        let definition: MockDefinition = serde_json::from_slice(json)?;
        Ok(Self::try_from(definition)?)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The exact URL, when this mock matches by URL.
    pub fn url(&self) -> Option<&str> {
        match &self.url {
            UrlMatcher::Exact(url) => Some(url),
            UrlMatcher::Pattern(_) => None,
        }
    }

    /// The regex source, when this mock matches by pattern.
    pub fn url_pattern(&self) -> Option<&str> {
        match &self.url {
            UrlMatcher::Exact(_) => None,
            UrlMatcher::Pattern(regex) => Some(regex.as_str()),
        }
    }

    pub fn request_body(&self) -> Option<&Value> {
        self.request_body.as_ref()
    }

    pub fn response_status_code(&self) -> u16 {
        self.response_status_code
    }

    pub fn response_body(&self) -> Option<&Value> {
        self.response_body.as_ref()
    }

    /// Last time this mock was created, updated, read or matched.
    pub fn last_access(&self) -> DateTime<Utc> {
        self.last_access
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_access = now;
    }

    /// Check whether a request is answered by this mock.
    ///
    /// The method comparison is case-sensitive.
    pub fn matches(&self, method: &str, url: &str, body: Option<&Value>) -> bool {
        self.method == method
            && self.url.matches(url)
            && body_matches(self.request_body.as_ref(), body)
    }

    /// Compare every field except the access timestamp.
    pub fn same_definition(&self, other: &Mock) -> bool {
        self.id == other.id
            && self.method == other.method
            && self.url == other.url
            && self.request_body == other.request_body
            && self.response_status_code == other.response_status_code
            && self.response_body == other.response_body
    }
}

impl Serialize for Mock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Mock", 8)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("method", &self.method)?;
        match &self.url {
            UrlMatcher::Exact(url) => state.serialize_field("url", url)?,
            UrlMatcher::Pattern(regex) => state.serialize_field("urlPattern", regex.as_str())?,
        }
        if let Some(body) = &self.request_body {
            state.serialize_field("requestBody", body)?;
        }
        state.serialize_field("responseStatusCode", &self.response_status_code)?;
        if let Some(body) = &self.response_body {
            state.serialize_field("responseBody", body)?;
        }
        state.serialize_field("lastAccess", &self.last_access.timestamp_millis())?;
        state.end()
    }
}
