//! Placeholder extraction and tag rewriting for rich-text HTML.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Linked-item embed: `<object type="application/kenticocloud" ...></object>`.
#[allow(clippy::expect_used)]
pub(crate) static OBJECT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<object\b([^>]*?)\s*(?:/>|>.*?</object>)").expect("object regex is valid")
});

/// Inline image; group 2 keeps the original tag ending (`>` or `/>`).
#[allow(clippy::expect_used)]
pub(crate) static IMAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<img\b([^>]*?)(\s*/?>)").expect("image regex is valid"));

/// Anchor with its inner HTML.
#[allow(clippy::expect_used)]
pub(crate) static ANCHOR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<a\b([^>]*)>(.*?)</a>").expect("anchor regex is valid"));

#[allow(clippy::expect_used)]
static ATTRIBUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*"([^"]*)""#).expect("attribute regex is valid")
});

/// MIME type marking delivery-API object placeholders.
pub(crate) const OBJECT_TYPE: &str = "application/kenticocloud";

/// Returns the value of a double-quoted attribute (name match is ASCII case-insensitive).
pub(crate) fn attribute<'a>(attributes: &'a str, name: &str) -> Option<&'a str> {
    ATTRIBUTE_PATTERN
        .captures_iter(attributes)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .and_then(|caps| caps.get(2))
        .map(|value| value.as_str())
}

/// Codenames of the linked items embedded in `html`, in document order.
pub(crate) fn embedded_codenames(html: &str) -> Vec<&str> {
    OBJECT_PATTERN
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|attributes| attributes.as_str())
        .filter(|attributes| {
            attribute(attributes, "type") == Some(OBJECT_TYPE)
                && attribute(attributes, "data-type") == Some("item")
        })
        .filter_map(|attributes| attribute(attributes, "data-codename"))
        .collect()
}

/// Returns `attributes` with `name` set to `value`, appending it when absent.
pub(crate) fn with_attribute(attributes: &str, name: &str, value: &str) -> String {
    let escaped = escape_attribute(value);
    let existing = ATTRIBUTE_PATTERN
        .captures_iter(attributes)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .and_then(|caps| caps.get(2));

    match existing {
        Some(range) => format!(
            "{}{}{}",
            &attributes[..range.start()],
            escaped,
            &attributes[range.end()..]
        ),
        None => format!("{attributes} {name}=\"{escaped}\""),
    }
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Like [`Regex::replace_all`], but the replacement may fail.
pub(crate) fn try_replace_all<E>(
    pattern: &Regex,
    haystack: &str,
    mut replacement: impl FnMut(&Captures<'_>) -> Result<String, E>,
) -> Result<String, E> {
    let mut output = String::with_capacity(haystack.len());
    let mut last = 0;
    for caps in pattern.captures_iter(haystack) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        output.push_str(&haystack[last..whole.start()]);
        output.push_str(&replacement(&caps)?);
        last = whole.end();
    }
    output.push_str(&haystack[last..]);
    Ok(output)
}
