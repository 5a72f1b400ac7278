//! Loading JSON/YAML documents passed on the command line.

use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Path meaning "read from stdin".
pub const STDIN: &str = "-";

/// Loads a document from `path`, or from stdin when `path` is `-`.
///
/// `.json` files and stdin input starting with `{` or `[` are parsed as
/// JSON; anything else as YAML.
///
/// # Errors
///
/// Returns an error if the document cannot be read or parsed.
pub fn load_document(path: &Path) -> Result<Value> {
    if path.as_os_str() == STDIN {
        debug!("Reading document from stdin");
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return parse_document(&content, None);
    }

    debug!("Reading document from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into()
        } else {
            crate::error::ProviderError::from(e)
        }
    })?;
    parse_document(&content, Some(path))
}

/// Parses document text; `source` picks the format by extension.
///
/// # Errors
///
/// Returns an error if the text is not valid for its format.
pub fn parse_document(content: &str, source: Option<&Path>) -> Result<Value> {
    let is_json = source.map_or_else(
        || content.trim_start().starts_with(['{', '[']),
        |path| path.extension().is_some_and(|ext| ext == "json"),
    );
    let location = source.map(|path| path.display().to_string());

    let value = if is_json {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError {
            message: format!("Invalid JSON: {e}"),
            location,
        })?
    } else {
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: format!("Invalid YAML: {e}"),
            location,
        })?
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "name: demo\nmember_roles:\n  - r1").unwrap();

        let value = load_document(file.path()).unwrap();
        assert_eq!(value, json!({"name": "demo", "member_roles": ["r1"]}));
    }

    #[test]
    fn test_json_file_keeps_unknown_marker() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"id": {{"$unknown": true}}}}"#).unwrap();

        let value = load_document(file.path()).unwrap();
        assert_eq!(value, json!({"id": {"$unknown": true}}));
    }

    #[test]
    fn test_missing_file() {
        let result = load_document(Path::new("/nonexistent/state.json"));
        assert!(matches!(
            result,
            Err(crate::error::ProviderError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_stdin_text_sniffing() {
        assert_eq!(parse_document("{\"a\": 1}", None).unwrap(), json!({"a": 1}));
        assert_eq!(parse_document("a: 1", None).unwrap(), json!({"a": 1}));
        assert!(parse_document("{", None).is_err());
    }
}
