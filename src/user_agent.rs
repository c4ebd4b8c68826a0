//! Client identification headers.
//!
//! Single source for the user agent and the SDK tracking header so every
//! request identifies the crate the same way.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/content-delivery";

/// Name of the SDK tracking header the delivery API records.
pub(crate) const SDK_HEADER: &str = "X-KC-SDKID";

/// Header asking the API to wait for freshly published content.
pub(crate) const WAIT_FOR_NEW_CONTENT_HEADER: &str = "X-KC-Wait-For-Loading-New-Content";

/// Default User-Agent for delivery requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("content-delivery/{version} (rust-sdk; +{PROJECT_UA_URL})")
}

/// Value of the SDK tracking header: `{registry};{package};{version}`.
#[must_use]
pub(crate) fn sdk_tracking_value() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("crates.io;{};{version}", env!("CARGO_PKG_NAME"))
}
