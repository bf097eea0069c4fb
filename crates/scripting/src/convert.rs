//! Conversion entry points

use crate::error::Diagnostic;
use crate::gs1::{parse, Script};
use crate::synth::Synthesizer;
use gs1conv_core::ConvertOptions;
use tracing::{debug, warn};

const SERVER_HEADER: &str = "//sgscript\n";
const CLIENT_MARKER: &str = "//#clientside\n";
const ORIGINAL_OPEN: &str = "/*\n//gs1script\n";
const ORIGINAL_CLOSE: &str = "*/";

/// Single-use converter from a parsed GS1 script to target-language text
pub struct Converter {
    synth: Synthesizer,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            synth: Synthesizer::new(options),
        }
    }

    /// Convert a script, consuming the converter
    pub fn convert(self, script: &Script) -> String {
        self.convert_reporting(script).0
    }

    /// Convert a script, also returning generation diagnostics
    pub fn convert_reporting(mut self, script: &Script) -> (String, Vec<Diagnostic>) {
        self.synth.script(script);
        self.synth.finish()
    }

    /// Parse and convert source text, logging diagnostics
    pub fn convert_string(source: &str, options: ConvertOptions) -> String {
        Self::convert_string_with(source, options, &mut |diagnostic| {
            warn!(line = diagnostic.line, "{}", diagnostic.message);
        })
    }

    /// Parse and convert source text, passing each diagnostic to `observer`
    pub fn convert_string_with(
        source: &str,
        options: ConvertOptions,
        observer: &mut dyn FnMut(&Diagnostic),
    ) -> String {
        let parsed = parse(source);
        for diagnostic in &parsed.diagnostics {
            observer(diagnostic);
        }

        let (code, diagnostics) = Self::new(options).convert_reporting(&parsed.script);
        for diagnostic in &diagnostics {
            observer(diagnostic);
        }
        code
    }
}

/// Convert a script with optional client-side section, embedding the
/// original source so it can be recovered
pub fn convert_with_split(source: &str, options: ConvertOptions) -> String {
    let mut out = String::from(SERVER_HEADER);

    match split_client_side(source) {
        Some((server, client)) => {
            debug!(server = server.len(), client = client.len(), "client-side marker found");
            push_section(&mut out, &Converter::convert_string(server, options.with_client_side(false)));
            out.push_str(CLIENT_MARKER);
            push_section(&mut out, &Converter::convert_string(client, options.with_client_side(true)));
        }
        None => {
            push_section(&mut out, &Converter::convert_string(source, options.with_client_side(false)));
        }
    }

    out.push_str(ORIGINAL_OPEN);
    out.push_str(source);
    out.push_str(ORIGINAL_CLOSE);
    out
}

fn push_section(out: &mut String, code: &str) {
    out.push_str(code);
    if !code.is_empty() && !code.ends_with('\n') {
        out.push('\n');
    }
}

/// Split source at the earliest `//#clientside` or `//clientside` marker,
/// matched case-insensitively anywhere in the text
fn split_client_side(source: &str) -> Option<(&str, &str)> {
    let lowered = source.to_ascii_lowercase();
    ["//#clientside", "//clientside"]
        .iter()
        .filter_map(|marker| lowered.find(marker).map(|pos| (pos, marker.len())))
        .min_by_key(|&(pos, _)| pos)
        .map(|(pos, len)| (&source[..pos], &source[pos + len..]))
}

/// Extract the original source embedded by [`convert_with_split`]
///
/// Returns an empty string when the marker or its matching close is missing.
pub fn recover_original(text: &str) -> String {
    let Some(open) = text.find(ORIGINAL_OPEN) else {
        return String::new();
    };
    let body_start = open + ORIGINAL_OPEN.len();
    let bytes = text.as_bytes();

    let mut depth = 1usize;
    let mut i = body_start;
    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'/', b'*') => {
                depth += 1;
                i += 2;
            }
            (b'*', b'/') => {
                depth -= 1;
                if depth == 0 {
                    return text[body_start..i].to_string();
                }
                i += 2;
            }
            _ => i += 1,
        }
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_string() {
        let out = Converter::convert_string("if (wasshot) { hurt(5); }", ConvertOptions::default());
        assert!(out.contains("this.hurtPlayer(player, 5);"));
    }

    #[test]
    fn test_observer_receives_diagnostics() {
        let mut seen = Vec::new();
        let out = Converter::convert_string_with(
            "if (playerenters) { a = ; show; }",
            ConvertOptions::default(),
            &mut |d| seen.push(d.clone()),
        );
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].line, 1);
        assert!(out.contains("this.show();"));
    }

    #[test]
    fn test_split_sections() {
        let source = "if (playerenters) { show; }\n//#CLIENTSIDE\nif (timeout) { hurt 1; }\n";
        let out = convert_with_split(source, ConvertOptions::default());

        assert!(out.starts_with("//sgscript\nfunction onPlayerEntersLevel() {\n  this.show();\n}\n//#clientside\n"));
        assert!(out.contains("var player = getLocalPlayer();"));
        assert!(out.ends_with(&format!("/*\n//gs1script\n{}*/", source)));
    }

    #[test]
    fn test_split_without_marker() {
        let out = convert_with_split("if (playerenters) { show; }", ConvertOptions::default());
        assert!(!out.contains("//#clientside"));
        assert!(out.starts_with("//sgscript\n"));
    }

    #[test]
    fn test_alternate_marker() {
        let (server, client) = split_client_side("a = 1;\n//clientside\nb = 2;").unwrap();
        assert_eq!(server, "a = 1;\n");
        assert_eq!(client, "\nb = 2;");
        assert!(split_client_side("a = 1; // not clientside").is_none());
    }

    #[test]
    fn test_marker_after_code_on_same_line() {
        let (server, client) = split_client_side("show; //#CLIENTSIDE\nhide;").unwrap();
        assert_eq!(server, "show; ");
        assert_eq!(client, "\nhide;");

        let out = convert_with_split("show; //#CLIENTSIDE\nhide;", ConvertOptions::default());
        assert!(out.starts_with(
            "//sgscript\nfunction onCreated() {\n  this.show();\n}\n//#clientside\nfunction onCreated() {\n  this.hide();\n}\n/*\n//gs1script\n"
        ));
    }

    #[test]
    fn test_inline_marker_moves_events_to_client() {
        let out = convert_with_split(
            "if (playerenters) { show; } //#clientside\nif (timeout) { hide; }\n",
            ConvertOptions::default(),
        );
        let marker = out.find("//#clientside\n").unwrap();
        let embedded = out.find("/*\n//gs1script\n").unwrap();
        let timeout = out.find("function onTimeout()").unwrap();
        assert!(marker < timeout && timeout < embedded);
        assert!(out.find("function onPlayerEntersLevel()").unwrap() < marker);
    }

    #[test]
    fn test_round_trip() {
        for source in [
            "if (playerenters) { show; }",
            "/* note */\nif (timeout) { message #c; }\n//#clientside\nhide;\n",
            "",
        ] {
            let converted = convert_with_split(source, ConvertOptions::default());
            assert_eq!(recover_original(&converted), source);
        }
    }

    #[test]
    fn test_unmatched_comment_in_string_breaks_recovery() {
        let converted = convert_with_split("message \"/* hi\";", ConvertOptions::default());
        assert_eq!(recover_original(&converted), "");
    }

    #[test]
    fn test_recover_missing_marker() {
        assert_eq!(recover_original("function onCreated() {}"), "");
        assert_eq!(recover_original("/*\n//gs1script\nunclosed /* */"), "");
    }
}
