//! Language tables
//!
//! Static knowledge about GS1 and its target: events, identifier rewrites,
//! built-in prototypes and helper sources. [`LanguageTables`] binds the
//! tables to the coordinate and player-list modes of one conversion.

pub mod actions;
pub mod helpers;
pub mod identifiers;
pub mod prototypes;

pub use actions::{lookup_action, Action, ParamRole, ACTIONS, CHAT_ACTION};
pub use helpers::{lookup_helper, Helper};
pub use identifiers::{is_root, lookup_rewrite, IdentifierRewrite};
pub use prototypes::{favors_string, lookup_prototype, Prototype};

use gs1conv_core::{Axis, ConvertOptions, CoordinateMode, PlayerListMode};

const X_TOKEN: &str = "#x#";
const Y_TOKEN: &str = "#y#";
const PLAYERS_TOKEN: &str = "#players#";

/// Mode-bound view of the language tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageTables {
    pub coordinates: CoordinateMode,
    pub player_list: PlayerListMode,
}

impl LanguageTables {
    pub fn new(options: &ConvertOptions) -> Self {
        Self {
            coordinates: options.coordinates,
            player_list: options.player_list,
        }
    }

    /// Player-list accessor for the current mode
    pub fn players(&self) -> &'static str {
        self.player_list.accessor()
    }

    /// Replace mode tokens in registry text
    ///
    /// Returns the substituted text and the helpers it now calls, in order of
    /// first appearance.
    pub fn substitute(&self, text: &str) -> (String, Vec<&'static str>) {
        let mut helpers = Vec::new();
        let mut out = text.replace(PLAYERS_TOKEN, self.players());

        for (token, axis) in [(X_TOKEN, Axis::X), (Y_TOKEN, Axis::Y)] {
            if out.contains(token) {
                let helper = self.coordinates.tile_helper(axis);
                out = out.replace(token, helper);
                helpers.push(helper);
            }
        }

        (out, helpers)
    }

    /// Helper source with mode tokens substituted
    pub fn helper_source(&self, name: &str) -> Option<String> {
        lookup_helper(name).map(|helper| helper.source().replace(PLAYERS_TOKEN, self.players()))
    }
}

impl Default for LanguageTables {
    fn default() -> Self {
        Self::new(&ConvertOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_players() {
        let level = LanguageTables::default();
        assert_eq!(level.substitute("#players#.size").0, "this.level.players.size");

        let server = LanguageTables {
            player_list: PlayerListMode::Server,
            ..level
        };
        assert_eq!(server.substitute("#players#.size").0, "players.size");
    }

    #[test]
    fn test_substitute_coordinates() {
        let local = LanguageTables::default();
        let (text, helpers) = local.substitute("#x#(player.mouseX)");
        assert_eq!(text, "localTileX(player.mouseX)");
        assert_eq!(helpers, vec!["localTileX"]);

        let global = LanguageTables {
            coordinates: CoordinateMode::Global,
            ..local
        };
        let (text, helpers) = global.substitute("#y#(player.mouseY)");
        assert_eq!(text, "tileY(player.mouseY)");
        assert_eq!(helpers, vec!["tileY"]);
    }

    #[test]
    fn test_substitute_plain_text() {
        let (text, helpers) = LanguageTables::default().substitute("player.gx");
        assert_eq!(text, "player.gx");
        assert!(helpers.is_empty());
    }

    #[test]
    fn test_helper_source_substitutes_players() {
        let server = LanguageTables {
            player_list: PlayerListMode::Server,
            ..LanguageTables::default()
        };
        let source = server.helper_source("_propOwner").unwrap();
        assert!(source.contains("return players[index];"));
        assert!(!source.contains("#players#"));
    }
}
