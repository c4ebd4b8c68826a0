//! Query URL construction.
//!
//! URLs have the shape `{base_url}/{project_id}/{endpoint}?{parameters}`.
//! Parameter names are emitted verbatim (`elements.title[eq]`), values are
//! percent-encoded.

use std::fmt;

use tracing::trace;
use url::Url;

use super::error::DeliveryError;
use crate::mapping::MapperConfig;

/// Public delivery API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://deliver.kenticocloud.com";

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default whole-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Project-wide client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub project_id: String,
    pub base_url: String,
    /// Language applied to queries that do not set one.
    pub default_language: Option<String>,
    /// Ask the API to wait for content published moments ago.
    pub wait_for_loading_new_content: bool,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl DeliveryConfig {
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_language: None,
            wait_for_loading_new_content: false,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = Some(language.into());
        self
    }

    #[must_use]
    pub fn with_wait_for_loading_new_content(mut self, enabled: bool) -> Self {
        self.wait_for_loading_new_content = enabled;
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// API endpoint relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Item(String),
    Items,
    ItemsFeed,
    Type(String),
    Types,
    Taxonomy(String),
    Taxonomies,
}

impl Endpoint {
    fn segments(&self) -> Vec<&str> {
        match self {
            Self::Item(codename) => vec!["items", codename],
            Self::Items => vec!["items"],
            Self::ItemsFeed => vec!["items-feed"],
            Self::Type(codename) => vec!["types", codename],
            Self::Types => vec!["types"],
            Self::Taxonomy(codename) => vec!["taxonomies", codename],
            Self::Taxonomies => vec!["taxonomies"],
        }
    }
}

/// Sort direction for [`ItemsQuery::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        })
    }
}

/// Content filter on a `system.*` or `elements.*` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Equals(String, String),
    NotEquals(String, String),
    In(String, Vec<String>),
    /// Array element contains the value.
    Contains(String, String),
    /// Array element contains at least one of the values.
    Any(String, Vec<String>),
    /// Array element contains all of the values.
    All(String, Vec<String>),
    GreaterThan(String, String),
    GreaterThanOrEqual(String, String),
    LessThan(String, String),
    LessThanOrEqual(String, String),
    Range(String, String, String),
    Empty(String),
    NotEmpty(String),
}

impl Filter {
    fn parameter(&self) -> (String, String) {
        match self {
            Self::Equals(path, value) => (format!("{path}[eq]"), value.clone()),
            Self::NotEquals(path, value) => (format!("{path}[neq]"), value.clone()),
            Self::In(path, values) => (format!("{path}[in]"), values.join(",")),
            Self::Contains(path, value) => (format!("{path}[contains]"), value.clone()),
            Self::Any(path, values) => (format!("{path}[any]"), values.join(",")),
            Self::All(path, values) => (format!("{path}[all]"), values.join(",")),
            Self::GreaterThan(path, value) => (format!("{path}[gt]"), value.clone()),
            Self::GreaterThanOrEqual(path, value) => (format!("{path}[gte]"), value.clone()),
            Self::LessThan(path, value) => (format!("{path}[lt]"), value.clone()),
            Self::LessThanOrEqual(path, value) => (format!("{path}[lte]"), value.clone()),
            Self::Range(path, lower, upper) => (format!("{path}[range]"), format!("{lower},{upper}")),
            Self::Empty(path) => (format!("{path}[empty]"), String::new()),
            Self::NotEmpty(path) => (format!("{path}[nempty]"), String::new()),
        }
    }
}

/// Query parameters plus per-query mapping configuration.
///
/// The same builder serves every endpoint; parameters an endpoint does not
/// understand are ignored by the API.
///
/// # Example
///
/// ```
/// use delivery_core::query::{Filter, ItemsQuery, Order};
///
/// let query = ItemsQuery::new()
///     .with_type("movie")
///     .filter(Filter::Contains("elements.category".into(), "drama".into()))
///     .order_by("elements.release_date", Order::Descending)
///     .limit(10);
/// assert!(query.to_query_string().contains("order=elements.release_date[desc]"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ItemsQuery {
    parameters: Vec<(String, String)>,
    mapper_config: Option<MapperConfig>,
    wait_for_loading_new_content: bool,
}

impl ItemsQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a raw parameter, replacing an earlier one with the same name.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.parameters.retain(|(existing, _)| *existing != name);
        self.parameters.push((name, value.into()));
        self
    }

    /// Restricts results to one content type.
    #[must_use]
    pub fn with_type(self, content_type: &str) -> Self {
        self.parameter("system.type", content_type)
    }

    /// Restricts results to any of several content types.
    #[must_use]
    pub fn with_types(self, content_types: &[&str]) -> Self {
        self.filter(Filter::In(
            "system.type".to_string(),
            content_types.iter().map(ToString::to_string).collect(),
        ))
    }

    #[must_use]
    pub fn language(self, language: &str) -> Self {
        self.parameter("language", language)
    }

    /// How many levels of linked items the API includes in `modular_content`.
    #[must_use]
    pub fn depth(self, depth: u32) -> Self {
        self.parameter("depth", depth.to_string())
    }

    /// Projects the response to the named elements.
    #[must_use]
    pub fn elements(self, elements: &[&str]) -> Self {
        self.parameter("elements", elements.join(","))
    }

    #[must_use]
    pub fn order_by(self, path: &str, order: Order) -> Self {
        self.parameter("order", format!("{path}[{order}]"))
    }

    #[must_use]
    pub fn limit(self, limit: u32) -> Self {
        self.parameter("limit", limit.to_string())
    }

    #[must_use]
    pub fn skip(self, skip: u32) -> Self {
        self.parameter("skip", skip.to_string())
    }

    #[must_use]
    pub fn include_total_count(self) -> Self {
        self.parameter("includeTotalCount", "true")
    }

    #[must_use]
    pub fn filter(self, filter: Filter) -> Self {
        let (name, value) = filter.parameter();
        self.parameter(name, value)
    }

    /// Mapping configuration overriding the client's for this query.
    #[must_use]
    pub fn with_mapper_config(mut self, config: MapperConfig) -> Self {
        self.mapper_config = Some(config);
        self
    }

    #[must_use]
    pub fn wait_for_loading_new_content(mut self) -> Self {
        self.wait_for_loading_new_content = true;
        self
    }

    #[must_use]
    pub fn mapper_config(&self) -> Option<&MapperConfig> {
        self.mapper_config.as_ref()
    }

    #[must_use]
    pub fn waits_for_loading_new_content(&self) -> bool {
        self.wait_for_loading_new_content
    }

    #[must_use]
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|(existing, _)| existing == name)
    }

    /// Renders `name=value&...` with percent-encoded values.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.parameters
            .iter()
            .map(|(name, value)| {
                let encoded = value
                    .split(',')
                    .map(|part| urlencoding::encode(part).into_owned())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{name}={encoded}")
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Builds the full request URL for an endpoint.
///
/// # Errors
///
/// Returns [`DeliveryError::InvalidUrl`] when the base URL does not parse or
/// cannot carry a path.
pub fn build_url(
    config: &DeliveryConfig,
    endpoint: &Endpoint,
    query: &ItemsQuery,
) -> Result<Url, DeliveryError> {
    let mut url =
        Url::parse(&config.base_url).map_err(|e| DeliveryError::invalid_url(&config.base_url, e))?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| DeliveryError::invalid_url(&config.base_url, "URL cannot be a base"))?;
        segments
            .pop_if_empty()
            .push(&config.project_id)
            .extend(endpoint.segments());
    }

    let mut query = query.clone();
    if let Some(language) = &config.default_language
        && !query.has_parameter("language")
    {
        query = query.language(language);
    }
    let query_string = query.to_query_string();
    if !query_string.is_empty() {
        url.set_query(Some(&query_string));
    }

    trace!(url = %url, "Built query URL");
    Ok(url)
}
