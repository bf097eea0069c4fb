//! Identifier-rewrite registry
//!
//! Maps GS1 built-in variables onto target-language expressions. The
//! replacement text may contain mode tokens (`#x#`, `#y#`, `#players#`) that
//! are substituted by [`LanguageTables::substitute`](super::LanguageTables::substitute).

/// A single identifier rewrite
#[derive(Debug, PartialEq, Eq)]
pub struct IdentifierRewrite {
    /// GS1 identifier
    pub name: &'static str,
    /// Prefix `this.` when the identifier appears bare
    pub prepend_self: bool,
    /// Replacement text
    pub replacement: &'static str,
}

const fn member(name: &'static str, replacement: &'static str) -> IdentifierRewrite {
    IdentifierRewrite { name, prepend_self: true, replacement }
}

const fn absolute(name: &'static str, replacement: &'static str) -> IdentifierRewrite {
    IdentifierRewrite { name, prepend_self: false, replacement }
}

/// All identifier rewrites
pub static IDENTIFIER_REWRITES: &[IdentifierRewrite] = &[
    // Own properties
    member("x", "gx"),
    member("y", "gy"),
    member("hearts", "hp"),
    member("isweapon", "isWeapon"),
    member("tokenscount", "tokens.size"),
    member("mousex", "#x#(player.mouseX)"),
    member("mousey", "#y#(player.mouseY)"),

    // Player properties
    absolute("playerx", "player.gx"),
    absolute("playery", "player.gy"),
    absolute("playerdir", "player.dir"),
    absolute("playersprite", "player.sprite"),
    absolute("playerhearts", "player.hp"),
    absolute("playerfullhearts", "player.maxhp"),
    absolute("playerrupees", "player.rupees"),
    absolute("playerbombs", "player.bombs"),
    absolute("playerdarts", "player.arrows"),
    absolute("playerswordpower", "player.swordPower"),
    absolute("playershieldpower", "player.shieldPower"),
    absolute("playerglovepower", "player.glovePower"),
    absolute("playerap", "player.ap"),
    absolute("playermp", "player.mp"),
    absolute("playerid", "player.id"),
    absolute("playeraccount", "player.account"),
    absolute("setplayerdir", "player.setDir"),

    // Level and world
    absolute("players", "#players#"),
    absolute("playerscount", "#players#.size"),
    absolute("npcscount", "this.level.npcs.size"),
    absolute("compuscount", "this.level.baddies.size"),
    absolute("tiles", "this.level.tiles"),
    absolute("board", "this.level.tiles"),

    // Constants and clocks
    absolute("pi", "3.14159265358979"),
    absolute("timevar", "int(getTime() * 2)"),
    absolute("timevar2", "getTime()"),
];

/// Look up a rewrite for a GS1 identifier
pub fn lookup_rewrite(name: &str) -> Option<&'static IdentifierRewrite> {
    IDENTIFIER_REWRITES.iter().find(|rewrite| rewrite.name == name)
}

/// Identifiers that are already qualified and never receive `this.`
pub const ROOT_IDENTIFIERS: &[&str] = &[
    "this", "player", "server", "serverr", "client", "clientr", "level", "npc", "text",
    "true", "false", "null",
];

/// Whether an identifier is a qualification root
pub fn is_root(name: &str) -> bool {
    ROOT_IDENTIFIERS.contains(&name)
}
