//! Coordinate and player-list modes
//!
//! GS1 works in tile units relative to the level the script lives in, while
//! the target runtime positions objects in pixels. These switches decide how
//! that gap is bridged in generated code.

use serde::{Deserialize, Serialize};

/// Pixels per tile
pub const TILE_SIZE: i32 = 16;

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Level origin property for this axis
    pub const fn origin(self) -> &'static str {
        match self {
            Axis::X => "this.level.x",
            Axis::Y => "this.level.y",
        }
    }
}

/// How tile coordinates map onto target-language positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateMode {
    /// Tile coordinates are relative to the containing level
    Local,
    /// Tile coordinates are world coordinates
    Global,
}

impl CoordinateMode {
    /// Name of the generated helper converting a pixel value back to tiles
    pub const fn tile_helper(self, axis: Axis) -> &'static str {
        match (self, axis) {
            (CoordinateMode::Local, Axis::X) => "localTileX",
            (CoordinateMode::Local, Axis::Y) => "localTileY",
            (CoordinateMode::Global, Axis::X) => "tileX",
            (CoordinateMode::Global, Axis::Y) => "tileY",
        }
    }

    /// Render a tile-coordinate expression as a pixel expression
    ///
    /// Numeric literals are folded, e.g. `3` becomes `48` (plus the level
    /// origin in local mode).
    pub fn tile_to_pixels(self, tile_expr: &str, axis: Axis) -> String {
        let scaled = match tile_expr.trim().parse::<f64>() {
            Ok(value) => format_number(value * TILE_SIZE as f64),
            Err(_) if is_atom(tile_expr) => format!("{}*{}", tile_expr, TILE_SIZE),
            Err(_) => format!("({})*{}", tile_expr, TILE_SIZE),
        };

        match self {
            CoordinateMode::Local => format!("{} + {}", scaled, axis.origin()),
            CoordinateMode::Global => scaled,
        }
    }
}

impl Default for CoordinateMode {
    fn default() -> Self {
        CoordinateMode::Local
    }
}

/// Which player list "all players" refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerListMode {
    /// Players of the containing level
    Level,
    /// Every player on the server
    Server,
}

impl PlayerListMode {
    /// Target-language accessor for the player list
    pub const fn accessor(self) -> &'static str {
        match self {
            PlayerListMode::Level => "this.level.players",
            PlayerListMode::Server => "players",
        }
    }
}

impl Default for PlayerListMode {
    fn default() -> Self {
        PlayerListMode::Level
    }
}

/// Format a number without a trailing `.0`
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn is_atom(expr: &str) -> bool {
    !expr.is_empty()
        && expr
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_to_pixel_folding() {
        assert_eq!(CoordinateMode::Global.tile_to_pixels("3", Axis::X), "48");
        assert_eq!(
            CoordinateMode::Local.tile_to_pixels("3", Axis::Y),
            "48 + this.level.y"
        );
        assert_eq!(CoordinateMode::Global.tile_to_pixels("2.5", Axis::X), "40");
    }

    #[test]
    fn test_tile_to_pixel_expressions() {
        assert_eq!(
            CoordinateMode::Local.tile_to_pixels("this.gx", Axis::X),
            "this.gx*16 + this.level.x"
        );
        assert_eq!(
            CoordinateMode::Global.tile_to_pixels("this.gx + 1", Axis::X),
            "(this.gx + 1)*16"
        );
    }

    #[test]
    fn test_tile_helpers() {
        assert_eq!(CoordinateMode::Local.tile_helper(Axis::X), "localTileX");
        assert_eq!(CoordinateMode::Global.tile_helper(Axis::Y), "tileY");
    }

    #[test]
    fn test_player_list_accessor() {
        assert_eq!(PlayerListMode::Level.accessor(), "this.level.players");
        assert_eq!(PlayerListMode::Server.accessor(), "players");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(16.0), "16");
        assert_eq!(format_number(-1.0), "-1");
        assert_eq!(format_number(0.5), "0.5");
    }
}
