//! Output renderers for command results.

use anyhow::anyhow;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::client::{CliError, CliResult};

/// Success banner followed by the response body, if any.
pub(crate) fn render_success(body: Option<&Value>) -> CliResult<()> {
    println!("{}", success_report(body)?);
    Ok(())
}

pub(crate) fn success_report(body: Option<&Value>) -> CliResult<String> {
    let mut report = String::from("\nOperation Successful!!");
    if let Some(body) = body {
        report.push_str("\njson:\n");
        report.push_str(&format_json(body)?);
    }
    Ok(report)
}

/// Pretty-print with four-space indentation and sorted object keys.
pub(crate) fn format_json(value: &Value) -> CliResult<String> {
    let sorted = sort_keys(value);
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    sorted
        .serialize(&mut serializer)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    String::from_utf8(buffer)
        .map_err(|err| CliError::failure(anyhow!("formatted JSON was not UTF-8: {err}")))
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(left, _), (right, _)| left.cmp(right));
            let mut sorted = Map::new();
            for (key, entry) in entries {
                sorted.insert(key.clone(), sort_keys(entry));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
