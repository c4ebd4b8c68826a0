//! Config file holding CLI defaults.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};

/// Maximum linked-item depth the CLI accepts.
pub const MAX_DEPTH: u32 = 10;

/// File configuration for CLI defaults. Flags override every value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Project to query.
    pub project_id: Option<String>,
    /// Delivery API base URL.
    pub base_url: Option<String>,
    /// Default content language.
    pub language: Option<String>,
    /// Default linked-item depth.
    pub depth: Option<u32>,
    /// Fail on missing linked items instead of dropping them.
    pub strict: Option<bool>,
    /// Log degraded content resolution at warn level.
    pub advanced_logging: Option<bool>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(project_id) = &self.project_id
            && project_id.trim().is_empty()
        {
            bail!("Invalid config value for `project_id`: must not be empty");
        }
        if let Some(base_url) = &self.base_url
            && !(base_url.starts_with("http://") || base_url.starts_with("https://"))
        {
            bail!("Invalid config value for `base_url`: '{base_url}'. Expected an http(s) URL");
        }
        if let Some(depth) = self.depth
            && depth > MAX_DEPTH
        {
            bail!("Invalid config value for `depth`: {depth}. Expected range: 0..={MAX_DEPTH}");
        }
        if let Some(timeout_secs) = self.timeout_secs
            && !(1..=3600).contains(&timeout_secs)
        {
            bail!("Invalid config value for `timeout_secs`: {timeout_secs}. Expected range: 1..=3600");
        }
        Ok(())
    }
}

const APP_DIR: &str = "content-delivery";
const FILE_NAME: &str = "config.toml";

/// `$XDG_CONFIG_HOME/content-delivery/config.toml`, falling back to
/// `$HOME/.config/content-delivery/config.toml`.
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    let config_home = non_empty_var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| non_empty_var("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(config_home.join(APP_DIR).join(FILE_NAME))
}

fn non_empty_var(name: &str) -> Option<OsString> {
    env::var_os(name).filter(|value| !value.is_empty())
}

/// Loads config from `explicit` if given, otherwise from the default path
/// when a file exists there.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = explicit {
        return read_file_config(path);
    }
    match resolve_default_config_path() {
        Some(path) if path.exists() => read_file_config(&path),
        _ => Ok(FileConfig::default()),
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

/// Parses `key = value` lines; `#` starts a comment outside quotes.
fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    let lines = raw
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, uncomment(line).trim()));

    for (line_no, line) in lines {
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line
            .split_once('=')
            .map(|(key, value)| (key.trim(), value.trim()))
        else {
            bail!("Invalid config syntax on line {line_no}: expected `key = value`");
        };
        let context = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "project_id" => cfg.project_id = Some(quoted(value).with_context(context)?),
            "base_url" => cfg.base_url = Some(quoted(value).with_context(context)?),
            "language" => cfg.language = Some(quoted(value).with_context(context)?),
            "depth" => cfg.depth = Some(number(value).with_context(context)?),
            "strict" => cfg.strict = Some(flag(value).with_context(context)?),
            "advanced_logging" => cfg.advanced_logging = Some(flag(value).with_context(context)?),
            "timeout_secs" => cfg.timeout_secs = Some(number(value).with_context(context)?),
            other => bail!("Unknown configuration key: '{other}' on line {line_no}"),
        }
    }

    cfg.validate()?;
    Ok(cfg)
}

fn uncomment(line: &str) -> &str {
    let mut in_quotes = false;
    line.char_indices()
        .find(|&(_, ch)| {
            if ch == '"' {
                in_quotes = !in_quotes;
            }
            ch == '#' && !in_quotes
        })
        .map_or(line, |(index, _)| &line[..index])
}

fn quoted(value: &str) -> Result<String> {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .map(ToString::to_string)
        .context("Expected double-quoted string")
}

fn number<T>(value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .with_context(|| format!("Expected a non-negative integer, got '{value}'"))
}

fn flag(value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => bail!("Expected `true` or `false`, got '{other}'"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
project_id = "975bf280-fd91-488c-994c-2f04416e5ee3"
base_url = "http://127.0.0.1:9000/#root"
language = "es-ES" # spanish
depth = 2
strict = true
advanced_logging = false
timeout_secs = 15
"#,
        )
        .unwrap();
        assert_eq!(cfg.project_id.as_deref(), Some("975bf280-fd91-488c-994c-2f04416e5ee3"));
        assert_eq!(cfg.base_url.as_deref(), Some("http://127.0.0.1:9000/#root"));
        assert_eq!(cfg.language.as_deref(), Some("es-ES"));
        assert_eq!(cfg.depth, Some(2));
        assert_eq!(cfg.strict, Some(true));
        assert_eq!(cfg.advanced_logging, Some(false));
        assert_eq!(cfg.timeout_secs, Some(15));
    }

    #[test]
    fn test_parse_config_rejects_depth_out_of_range() {
        let err = parse_config_str("depth = 11").unwrap_err();
        assert!(err.to_string().contains("depth"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_key() {
        let err = parse_config_str("output_dir = \"/tmp\"").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
    }

    #[test]
    fn test_parse_config_rejects_api_key() {
        let err = parse_config_str("preview_api_key = \"ew0KICAiYWxnIjog\"").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key: 'preview_api_key'"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_string() {
        let err = parse_config_str("project_id = abc").unwrap_err();
        assert!(format!("{err:#}").contains("project_id"));
    }

    #[test]
    fn test_parse_config_rejects_non_http_base_url() {
        let err = parse_config_str("base_url = \"ftp://example.com\"").unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_boolean() {
        let err = parse_config_str("strict = yes").unwrap_err();
        assert!(format!("{err:#}").contains("strict"));
    }

    #[test]
    fn test_parse_config_rejects_zero_timeout() {
        let err = parse_config_str("timeout_secs = 0").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "project_id = \"p1\"").unwrap();
        let cfg = load_file_config(Some(file.path())).unwrap();
        assert_eq!(cfg.project_id.as_deref(), Some("p1"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file_config(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
