//! Helper-source table
//!
//! Support functions appended to generated code on demand. Bodies may use the
//! `#players#` mode token.

/// A generated support function
#[derive(Debug, PartialEq, Eq)]
pub struct Helper {
    pub name: &'static str,
    pub params: &'static str,
    pub body: &'static [&'static str],
}

pub static HELPERS: &[Helper] = &[
    Helper {
        name: "localTileX",
        params: "px",
        body: &["return (px - this.level.x)/16;"],
    },
    Helper {
        name: "localTileY",
        params: "px",
        body: &["return (px - this.level.y)/16;"],
    },
    Helper {
        name: "tileX",
        params: "px",
        body: &["return px/16;"],
    },
    Helper {
        name: "tileY",
        params: "px",
        body: &["return px/16;"],
    },
    Helper {
        name: "_propOwner",
        params: "index, player",
        body: &[
            "if (index == -1) {",
            "  return this;",
            "}",
            "if (index == 0) {",
            "  return player;",
            "}",
            "return #players#[index];",
        ],
    },
    Helper {
        name: "_getAngle",
        params: "dx, dy",
        body: &[
            "var angle = atan2(0 - dy, dx);",
            "if (angle < 0) {",
            "  angle += 6.28318530717959;",
            "}",
            "return angle;",
        ],
    },
    Helper {
        name: "_getDir",
        params: "dx, dy",
        body: &[
            "if (abs(dx) > abs(dy)) {",
            "  return if(dx > 0, 3, 1);",
            "}",
            "return if(dy > 0, 2, 0);",
        ],
    },
    Helper {
        name: "_vecX",
        params: "dir",
        body: &["return [0, -1, 0, 1][mod(dir, 4)];"],
    },
    Helper {
        name: "_vecY",
        params: "dir",
        body: &["return [-1, 0, 1, 0][mod(dir, 4)];"],
    },
];

/// Look up a helper by its generated name
pub fn lookup_helper(name: &str) -> Option<&'static Helper> {
    HELPERS.iter().find(|helper| helper.name == name)
}

impl Helper {
    /// Render the helper as a complete function; mode tokens are left for
    /// the caller to substitute
    pub fn source(&self) -> String {
        let mut out = format!("function {}({}) {{\n", self.name, self.params);
        for line in self.body {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_source() {
        let helper = lookup_helper("tileX").unwrap();
        assert_eq!(helper.source(), "function tileX(px) {\n  return px/16;\n}\n");
    }

    #[test]
    fn test_tile_helpers_present() {
        for name in ["localTileX", "localTileY", "tileX", "tileY"] {
            assert!(lookup_helper(name).is_some(), "{}", name);
        }
    }
}
