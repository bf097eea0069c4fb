//! Action/event registry
//!
//! GS1 scripts test bare event flags (`if (playerenters)`); the target
//! language delivers events as named callbacks. Each entry names the callback
//! and the contextual parameters the host passes to it, in order.

/// Contextual parameter supplied to an event callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRole {
    Player,
    Npc,
    ChatText,
}

impl ParamRole {
    /// Parameter name used in generated code
    pub const fn name(self) -> &'static str {
        match self {
            ParamRole::Player => "player",
            ParamRole::Npc => "npc",
            ParamRole::ChatText => "text",
        }
    }
}

/// A GS1 event and its target-language callback
#[derive(Debug, PartialEq, Eq)]
pub struct Action {
    /// GS1 flag name
    pub name: &'static str,
    /// Callback function name
    pub callback: &'static str,
    /// Ordered contextual parameters
    pub params: &'static [ParamRole],
    /// Raised by a weapon; the wielding player is `this.player`
    pub weapon: bool,
}

impl Action {
    const fn new(name: &'static str, callback: &'static str, params: &'static [ParamRole]) -> Self {
        Self { name, callback, params, weapon: false }
    }

    const fn weapon(name: &'static str, callback: &'static str) -> Self {
        Self { name, callback, params: &[], weapon: true }
    }

    /// Whether the host supplies this parameter
    pub fn has_param(&self, role: ParamRole) -> bool {
        self.params.contains(&role)
    }
}

use ParamRole::{ChatText, Npc, Player};

/// All known actions
pub static ACTIONS: &[Action] = &[
    Action::new("created", "onCreated", &[]),
    Action::new("playerenters", "onPlayerEntersLevel", &[Player]),
    Action::new("playerleaves", "onPlayerLeavesLevel", &[Player]),
    Action::new("playertouchsme", "onPlayerTouchsMe", &[Player]),
    Action::new("playertouchsother", "onPlayerTouchsOther", &[Player, Npc]),
    Action::new("playerchats", "onPlayerChats", &[Player, ChatText]),
    Action::new("playerpushes", "onPlayerPushes", &[Player]),
    Action::new("playerhurt", "onPlayerHurt", &[Player]),
    Action::new("playerdies", "onPlayerDies", &[Player]),
    Action::new("playerlaysitem", "onPlayerLaysItem", &[Player]),
    Action::new("playerendsreading", "onPlayerEndsReading", &[Player]),
    Action::new("playerlogin", "onPlayerLogin", &[Player]),
    Action::new("playerfires", "onPlayerFires", &[Player]),
    Action::new("wasshot", "onWasShot", &[Player]),
    Action::new("washit", "onWasHit", &[Player]),
    Action::new("wasthrown", "onWasThrown", &[Player]),
    Action::new("mousedown", "onMouseDown", &[Player]),
    Action::new("keypressed", "onKeyPressed", &[Player]),
    Action::new("actionserverside", "onActionServerSide", &[Player]),
    Action::new("timeout", "onTimeout", &[]),
    Action::new("exploded", "onExploded", &[]),
    Action::new("npcwarped", "onNPCWarped", &[]),
    Action::weapon("weaponfired", "onWeaponFired"),
];

/// Name of the action raised by `playersays(...)`
pub const CHAT_ACTION: &str = "playerchats";

/// Look up an action by its GS1 flag name
pub fn lookup_action(name: &str) -> Option<&'static Action> {
    ACTIONS.iter().find(|action| action.name == name)
}
