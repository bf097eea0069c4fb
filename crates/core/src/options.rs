//! Conversion options

use crate::modes::{CoordinateMode, PlayerListMode};
use serde::{Deserialize, Serialize};

/// Options controlling a single conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Generate client-side code (affects player resolution)
    pub client_side: bool,

    /// How tile coordinates are translated
    pub coordinates: CoordinateMode,

    /// Which list "all players" resolves to
    pub player_list: PlayerListMode,
}

impl ConvertOptions {
    /// Options for the server-side half of a script
    pub fn server() -> Self {
        Self::default()
    }

    /// Options for the client-side half of a script
    pub fn client() -> Self {
        Self {
            client_side: true,
            ..Self::default()
        }
    }

    /// Copy of these options with a different side
    pub fn with_client_side(self, client_side: bool) -> Self {
        Self { client_side, ..self }
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            client_side: false,
            coordinates: CoordinateMode::Local,
            player_list: PlayerListMode::Level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ConvertOptions::default();
        assert!(!options.client_side);
        assert_eq!(options.coordinates, CoordinateMode::Local);
        assert_eq!(options.player_list, PlayerListMode::Level);
    }

    #[test]
    fn test_with_client_side() {
        let options = ConvertOptions {
            coordinates: CoordinateMode::Global,
            ..ConvertOptions::default()
        }
        .with_client_side(true);
        assert!(options.client_side);
        assert_eq!(options.coordinates, CoordinateMode::Global);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let options: ConvertOptions =
            serde_json::from_str(r#"{ "player_list": "server" }"#).unwrap();
        assert_eq!(options.player_list, PlayerListMode::Server);
        assert_eq!(options.coordinates, CoordinateMode::Local);
    }
}
