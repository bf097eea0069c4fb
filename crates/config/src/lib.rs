//! Converter options files
//!
//! Options come from a `key = value` text file, or from JSON when the file
//! name ends in `.json`. Missing keys keep their defaults.

use gs1conv_core::{ConvertError, ConvertOptions, CoordinateMode, PlayerListMode, Result};
use std::fs;
use std::path::Path;

/// Load options from a file
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ConvertOptions> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    let options = if is_json {
        parse_json(&content)?
    } else {
        parse(&content)
    };

    tracing::debug!("Loaded options from {}", path.display());
    Ok(options)
}

/// Parse `key = value` options text
pub fn parse(content: &str) -> ConvertOptions {
    let mut options = ConvertOptions::default();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let value = line[eq_pos + 1..].trim();

            parse_option(&mut options, key, value);
        }
    }

    options
}

/// Parse JSON options
pub fn parse_json(content: &str) -> Result<ConvertOptions> {
    serde_json::from_str(content).map_err(|e| ConvertError::Config(e.to_string()))
}

fn parse_option(options: &mut ConvertOptions, key: &str, value: &str) {
    match key.to_lowercase().as_str() {
        "clientside" => {
            options.client_side = parse_bool(value).unwrap_or(options.client_side);
        }
        "localcoordinates" => {
            if let Some(local) = parse_bool(value) {
                options.coordinates = if local {
                    CoordinateMode::Local
                } else {
                    CoordinateMode::Global
                };
            }
        }
        "localplayerlist" => {
            if let Some(local) = parse_bool(value) {
                options.player_list = if local {
                    PlayerListMode::Level
                } else {
                    PlayerListMode::Server
                };
            }
        }
        _ => {
            tracing::debug!("Unknown option: {} = {}", key, value);
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Log the active options
pub fn display(options: &ConvertOptions) {
    tracing::info!("Conversion options:");
    tracing::info!("  Side: {}", if options.client_side { "client" } else { "server" });
    tracing::info!("  Coordinates: {:?}", options.coordinates);
    tracing::info!("  Player list: {:?}", options.player_list);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_simple_options() {
        let text = r#"
# converter options
clientside = true
localcoordinates = false
localplayerlist = no
"#;
        let options = parse(text);
        assert!(options.client_side);
        assert_eq!(options.coordinates, CoordinateMode::Global);
        assert_eq!(options.player_list, PlayerListMode::Server);
    }

    #[test]
    fn test_unknown_and_malformed_keep_defaults() {
        let options = parse("colour = blue\nclientside = maybe\nnot an option\n");
        assert_eq!(options, ConvertOptions::default());
    }

    #[test]
    fn test_load_text_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "localcoordinates = 0").unwrap();

        let options = load_from_file(file.path()).unwrap();
        assert_eq!(options.coordinates, CoordinateMode::Global);
        assert!(!options.client_side);
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        fs::write(&path, r#"{ "client_side": true, "player_list": "server" }"#).unwrap();

        let options = load_from_file(&path).unwrap();
        assert!(options.client_side);
        assert_eq!(options.player_list, PlayerListMode::Server);
        assert_eq!(options.coordinates, CoordinateMode::Local);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = parse_json("{ not json").unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from_file(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, ConvertError::Io(_)));
    }
}
