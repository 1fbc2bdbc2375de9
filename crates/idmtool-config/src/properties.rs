//! Minimal reader for the line-oriented `key=value` files under `etc/`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Parsed `key=value` pairs. Later duplicates win.
pub type Properties = BTreeMap<String, String>;

/// Parse `key=value` lines, skipping comments and lines without a separator.
#[must_use]
pub fn parse_properties(text: &str) -> Properties {
    text.lines()
        .filter_map(entry)
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Read and parse a properties file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read.
pub fn load_properties(path: &Path) -> ConfigResult<Properties> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_properties(&text))
}

/// Split an uncommented line into its trimmed key and value.
pub(crate) fn entry(line: &str) -> Option<(&str, &str)> {
    if is_comment(line) {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}

pub(crate) fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_comments_and_blank_lines() {
        let props = parse_properties(
            "# header\n\norg.osgi.service.http.port = 8181\n  # indented=comment\nnot a pair\n",
        );
        assert_eq!(props.len(), 1);
        assert_eq!(
            props.get("org.osgi.service.http.port").map(String::as_str),
            Some("8181")
        );
    }

    #[test]
    fn value_keeps_everything_after_first_separator() {
        let props = parse_properties("url=http://host/?a=b\n");
        assert_eq!(props.get("url").map(String::as_str), Some("http://host/?a=b"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_properties(Path::new("/nonexistent/idmtool/props.cfg")).err();
        assert!(matches!(err, Some(ConfigError::Io { operation: "read", .. })));
    }
}
