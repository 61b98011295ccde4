// SPDX-License-Identifier: AGPL-3.0
// Rentboard Core - Type definitions

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Maximum number of images a single draft may carry
pub const MAX_DRAFT_IMAGES: usize = 5;

/// Known city codes and their display names
pub const CITIES: [(&str, &str); 6] = [
    ("minsk", "Minsk"),
    ("brest", "Brest"),
    ("grodno", "Grodno"),
    ("gomel", "Gomel"),
    ("vitebsk", "Vitebsk"),
    ("mogilev", "Mogilev"),
];

/// Display name for a city code, if it is one we know
pub fn city_label(code: &str) -> Option<&'static str> {
    CITIES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, label)| *label)
}

/// The three independent listing collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewId {
    #[default]
    Search,
    Newest,
    Mine,
}

impl ViewId {
    pub const ALL: [ViewId; 3] = [ViewId::Search, ViewId::Newest, ViewId::Mine];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Newest => "newest",
            Self::Mine => "mine",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Search => 0,
            Self::Newest => 1,
            Self::Mine => 2,
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" => Ok(Self::Search),
            "newest" | "new" => Ok(Self::Newest),
            "mine" | "my" => Ok(Self::Mine),
            other => Err(AppError::InvalidConfig(format!("Unknown view: {}", other))),
        }
    }
}

/// Advertisement identity. The API sends either a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AdId(String);

impl AdId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AdId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::string_or_number(deserializer).map(AdId)
    }
}

/// A listing as returned by the remote API. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advertisement {
    /// Scraped rows are keyed by their source `link`
    #[serde(alias = "link")]
    pub id: AdId,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub city: String,
    #[serde(default)]
    pub rooms: Option<u32>,
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub description: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Image URLs. Older rows carry a single `image` or a comma-joined list.
    #[serde(default, alias = "image", deserialize_with = "lenient::image_list")]
    pub images: Vec<String>,
    #[serde(
        default,
        alias = "timestamp",
        with = "timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<NaiveDateTime>,
}

/// The last-used search filter. Values are carried verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_string"
    )]
    pub city: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_string"
    )]
    pub min_price: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_string"
    )]
    pub max_price: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_string"
    )]
    pub rooms: Option<String>,
}

impl SearchCriteria {
    /// Field names accepted by [`SearchCriteria::set`], in query order
    pub const FIELDS: [&'static str; 4] = ["city", "minPrice", "maxPrice", "rooms"];

    /// Trim values and drop blank ones so they are omitted rather than sent empty
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            city: clean(self.city),
            min_price: clean(self.min_price),
            max_price: clean(self.max_price),
            rooms: clean(self.rooms),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    /// Present fields as query parameters, in fixed order
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        Self::FIELDS
            .iter()
            .zip([&self.city, &self.min_price, &self.max_price, &self.rooms])
            .filter_map(|(name, value)| value.as_deref().map(|v| (*name, v)))
            .collect()
    }

    /// Set a field by its wire name. A blank value clears the field.
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), AppError> {
        let slot = match field {
            "city" => &mut self.city,
            "minPrice" | "min_price" => &mut self.min_price,
            "maxPrice" | "max_price" => &mut self.max_price,
            "rooms" => &mut self.rooms,
            other => {
                return Err(AppError::InvalidConfig(format!(
                    "Unknown search field: {}",
                    other
                )))
            }
        };

        let value = value.trim();
        *slot = (!value.is_empty()).then(|| value.to_string());
        Ok(())
    }
}

/// Persisted search session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub is_searched: bool,
    #[serde(default)]
    pub criteria: SearchCriteria,
}

/// Submission form payload for a user's own listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdDraft {
    /// Local image files, at most [`MAX_DRAFT_IMAGES`]
    #[serde(default)]
    pub images: Vec<PathBuf>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub rooms: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub phone: String,
}

impl AdDraft {
    /// Required fields that are still blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("city", &self.city),
            ("price", &self.price),
            ("address", &self.address),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Attach an image, returning false once the limit is reached
    pub fn attach_image(&mut self, path: impl Into<PathBuf>) -> bool {
        if self.images.len() >= MAX_DRAFT_IMAGES {
            return false;
        }
        self.images.push(path.into());
        true
    }

    /// Set a text field by name
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), AppError> {
        let slot = match field {
            "city" => &mut self.city,
            "rooms" => &mut self.rooms,
            "price" => &mut self.price,
            "address" => &mut self.address,
            "description" => &mut self.description,
            "phone" => &mut self.phone,
            other => {
                return Err(AppError::InvalidConfig(format!(
                    "Unknown draft field: {}",
                    other
                )))
            }
        };
        *slot = value.trim().to_string();
        Ok(())
    }
}

/// Browser settings (frontend-agnostic)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserSettings {
    /// Base URL of the listings API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Owner id sent with requests for the `mine` view
    #[serde(default)]
    pub user_id: Option<String>,
    /// Transport timeout for a single request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://newtg-3bcd.onrender.com".to_string()
}

fn default_page_size() -> usize {
    7
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            user_id: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BrowserSettings {
    /// Settings keys in display order
    pub const KEYS: [&'static str; 4] = ["apiBaseUrl", "pageSize", "userId", "requestTimeoutSecs"];

    /// Set one value by key. An empty `userId` clears it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let value = value.trim();
        match key {
            "apiBaseUrl" | "api_base_url" => self.api_base_url = value.to_string(),
            "pageSize" | "page_size" => self.page_size = parse_number(key, value)?,
            "userId" | "user_id" => self.user_id = (!value.is_empty()).then(|| value.to_string()),
            "requestTimeoutSecs" | "request_timeout_secs" => {
                self.request_timeout_secs = parse_number(key, value)?
            }
            other => {
                return Err(AppError::InvalidConfig(format!(
                    "Unknown setting: {}",
                    other
                )))
            }
        }
        Ok(())
    }

    /// Current value of a key, as shown to the user
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "apiBaseUrl" => Some(self.api_base_url.clone()),
            "pageSize" => Some(self.page_size.to_string()),
            "userId" => Some(self.user_id.clone().unwrap_or_default()),
            "requestTimeoutSecs" => Some(self.request_timeout_secs.to_string()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.page_size == 0 {
            return Err(AppError::InvalidConfig(
                "Page size must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::InvalidConfig(
                "Request timeout must be greater than zero".to_string(),
            ));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(AppError::InvalidConfig(format!(
                "API base URL must start with http:// or https://, got {:?}",
                self.api_base_url
            )));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|_| AppError::InvalidConfig(format!("{} expects a number, got {:?}", key, value)))
}

/// Errors from a single page fetch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("A fetch for this view is already in flight")]
    AlreadyInFlight,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Error types for the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to read persisted state: {0}")]
    PersistenceRead(String),

    #[error("File I/O error: {0}")]
    FileIo(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Draft is missing required fields: {}", .0.join(", "))]
    InvalidDraft(Vec<&'static str>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileIo(err.to_string())
    }
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number, got {}",
                other
            ))),
        }
    }

    /// Nullable text columns arrive as `null`
    pub fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
    }

    pub fn optional_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn image_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) if !s.is_empty() => Some(s),
                    _ => None,
                })
                .collect(),
            Value::String(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        })
    }
}

mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    const BACKEND_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_some(&ts.format(BACKEND_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    // Unparseable timestamps become absent instead of failing the whole page
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => parse(&raw),
            _ => None,
        })
    }

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.naive_utc())
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(raw, BACKEND_FORMAT).ok())
    }
}
