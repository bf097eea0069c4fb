//! Action-event synthesis
//!
//! GS1 scripts are one flat block re-run on every event, with bare flags
//! such as `playerenters` deciding what applies. The target language calls a
//! named function per event instead. [`Synthesizer`] sorts each top-level
//! statement into the output section it belongs to:
//!
//! - `if (action) ...` without `else` goes straight into that event's callback
//! - a condition mentioning no action goes into `_onAnyAction`, run first by
//!   every callback
//! - a condition mentioning exactly one action, without `else`, goes into
//!   that event's callback with the flag rendered as `true`
//! - anything else goes into the shared `_actions` dispatcher, and every
//!   action it mentions forwards to the dispatcher once
//! - function declarations stay global; all other statements run on creation

use crate::codegen::{Generator, Target};
use crate::error::Diagnostic;
use crate::gs1::ast::{Expr, Script, Stmt};
use crate::sink::Sink;
use crate::tables::{lookup_action, Action, ParamRole, CHAT_ACTION};
use gs1conv_core::ConvertOptions;
use tracing::debug;

const DISPATCHER: &str = "_actions";
const PROLOGUE: &str = "_onAnyAction";
const SECTION_PARAMS: &str = "_actionName, player, npc, text";

/// Accumulated body of one event callback
#[derive(Debug)]
struct EventBody {
    action: &'static Action,
    body: Sink,
    forwards: bool,
}

/// Sorts top-level statements into callbacks and assembles the output
pub struct Synthesizer {
    gen: Generator,
    events: Vec<EventBody>,
    dispatcher: Sink,
    prologue: Sink,
}

impl Synthesizer {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            gen: Generator::new(options),
            events: Vec::new(),
            dispatcher: Sink::new(),
            prologue: Sink::new(),
        }
    }

    /// Classify and translate a whole script
    pub fn script(&mut self, script: &Script) {
        for stmt in &script.statements {
            self.top_level(stmt);
        }
    }

    /// Classify and translate one top-level statement
    pub fn top_level(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                for inner in statements {
                    self.top_level(inner);
                }
            }
            Stmt::Empty => {}
            Stmt::Function { name, .. } => {
                debug!(function = %name, "global function");
                self.gen.set_target(Target::Global, 0);
                if !self.gen.global().is_empty() {
                    self.gen.global().write("\n");
                }
                self.gen.statement(stmt);
            }
            Stmt::If { condition, then_branch, else_branch } => {
                self.conditional(stmt, condition, then_branch, else_branch.is_some())
            }
            other => {
                if let Some(created) = lookup_action("created") {
                    self.splice(created, Target::Create, |g| g.statement(other));
                }
            }
        }
    }

    fn conditional(&mut self, stmt: &Stmt, condition: &Expr, then_branch: &Stmt, has_else: bool) {
        let bare = ungrouped(condition).as_identifier().and_then(lookup_action);
        if let (Some(action), false) = (bare, has_else) {
            debug!(action = action.name, "bare action condition");
            self.splice(action, Target::Event(action), |g| g.body_contents(then_branch));
            return;
        }

        let actions = collect_actions(condition);
        match (actions.as_slice(), has_else) {
            ([], _) => {
                debug!("condition without actions");
                let sink = std::mem::take(&mut self.prologue);
                let (sink, ()) = self.gen.redirected(sink, |g| {
                    g.set_target(Target::Prologue, 1);
                    g.statement(stmt);
                });
                self.prologue = sink;
            }
            ([action], false) => {
                debug!(action = action.name, "single action condition");
                self.splice(*action, Target::Event(*action), |g| g.statement(stmt));
            }
            _ => {
                debug!(actions = actions.len(), has_else, "dispatched condition");
                let sink = std::mem::take(&mut self.dispatcher);
                let (sink, ()) = self.gen.redirected(sink, |g| {
                    g.set_target(Target::Dispatcher, 1);
                    g.statement(stmt);
                });
                self.dispatcher = sink;

                for &action in &actions {
                    self.forward(action);
                }
            }
        }
    }

    /// Append generated code to an event's callback body
    fn splice(&mut self, action: &'static Action, target: Target, f: impl FnOnce(&mut Generator)) {
        let index = self.event_index(action);
        let sink = std::mem::take(&mut self.events[index].body);
        let (sink, ()) = self.gen.redirected(sink, |g| {
            g.set_target(target, 1);
            f(g);
        });
        self.events[index].body = sink;
    }

    /// Make an event forward to the dispatcher, once
    fn forward(&mut self, action: &'static Action) {
        let index = self.event_index(action);
        let event = &mut self.events[index];
        if event.forwards {
            return;
        }

        let target = Target::Event(action);
        event.body.line(
            1,
            &format!(
                "this.{}({}, {}, {}, {});",
                DISPATCHER,
                target.action_name(),
                target.role_arg(ParamRole::Player),
                target.role_arg(ParamRole::Npc),
                target.role_arg(ParamRole::ChatText),
            ),
        );
        event.forwards = true;
        self.gen.mark_dispatcher();
    }

    /// Index of an event's body, creating it on first use
    fn event_index(&mut self, action: &'static Action) -> usize {
        match self.events.iter().position(|e| e.action.name == action.name) {
            Some(index) => index,
            None => {
                self.events.push(EventBody {
                    action,
                    body: Sink::new(),
                    forwards: false,
                });
                self.events.len() - 1
            }
        }
    }

    /// Assemble the final text
    pub fn finish(mut self) -> (String, Vec<Diagnostic>) {
        if !self.prologue.is_empty() && self.events.is_empty() {
            if let Some(created) = lookup_action("created") {
                self.event_index(created);
            }
        }

        let mut sections: Vec<String> = Vec::new();

        let global = self.gen.global().as_str().to_string();
        if !global.is_empty() {
            sections.push(global);
        }

        for event in &self.events {
            sections.push(self.callback(event));
        }

        if !self.dispatcher.is_empty() || self.gen.dispatcher_referenced() {
            sections.push(section_function(DISPATCHER, &self.dispatcher));
        }
        if !self.prologue.is_empty() {
            sections.push(section_function(PROLOGUE, &self.prologue));
        }

        for helper in self.gen.helpers() {
            match self.gen.tables().helper_source(helper) {
                Some(source) => {
                    debug!(helper, "emitting helper");
                    sections.push(source);
                }
                None => debug!(helper, "unknown helper requested"),
            }
        }

        let diagnostics = self.gen.take_diagnostics();
        (sections.join("\n"), diagnostics)
    }

    /// Render one event callback
    fn callback(&self, event: &EventBody) -> String {
        let action = event.action;
        let body = event.body.as_str();

        let prologue = self.prologue.as_str();
        let has_prologue = !prologue.is_empty();

        let has_player = action.has_param(ParamRole::Player);
        let resolve_player = !has_player
            && (mentions(body, "player") || (has_prologue && mentions(prologue, "player")));

        let referenced = |role: ParamRole| {
            action.has_param(role) && (has_prologue || mentions(body, role.name()))
        };
        let count = action
            .params
            .iter()
            .rposition(|role| referenced(*role))
            .map_or(0, |last| last + 1);
        let params: Vec<&str> = action.params[..count].iter().map(|role| role.name()).collect();

        let mut sink = Sink::new();
        sink.line(0, &format!("function {}({}) {{", action.callback, params.join(", ")));

        if resolve_player {
            for line in self.player_resolution(action) {
                sink.line(1, &line);
            }
        }

        if has_prologue {
            let player = if has_player || resolve_player { "player" } else { "null" };
            let target = Target::Event(action);
            sink.line(
                1,
                &format!(
                    "this.{}(\"{}\", {}, {}, {});",
                    PROLOGUE,
                    action.name,
                    player,
                    target.role_arg(ParamRole::Npc),
                    target.role_arg(ParamRole::ChatText),
                ),
            );
        }

        sink.write(body);
        sink.line(0, "}");
        sink.into_string()
    }

    /// Lines binding `player` in a callback that is not passed one
    fn player_resolution(&self, action: &Action) -> Vec<String> {
        let source = if self.gen.options().client_side {
            "getLocalPlayer()".to_string()
        } else if action.weapon {
            "this.player".to_string()
        } else {
            format!("{}[0]", self.gen.tables().players())
        };

        let mut lines = vec![format!("var player = {};", source)];
        if action.name == "timeout" {
            lines.extend(
                ["if (player == null) {", "  this.timeout = 0.05;", "  return;", "}"]
                    .iter()
                    .map(|line| line.to_string()),
            );
        }
        lines
    }
}

fn section_function(name: &str, body: &Sink) -> String {
    let mut sink = Sink::new();
    sink.line(0, &format!("function {}({}) {{", name, SECTION_PARAMS));
    sink.write(body.as_str());
    sink.line(0, "}");
    sink.into_string()
}

fn ungrouped(expr: &Expr) -> &Expr {
    match expr {
        Expr::Grouped(inner) => ungrouped(inner),
        other => other,
    }
}

/// Actions a condition mentions, in order of first appearance
///
/// Mirrors where the generator recognizes action flags, without emitting
/// anything.
pub fn collect_actions(condition: &Expr) -> Vec<&'static Action> {
    let mut found = Vec::new();
    scan(condition, &mut found);
    found
}

fn add(action: Option<&'static Action>, found: &mut Vec<&'static Action>) {
    if let Some(action) = action {
        if !found.iter().any(|a| a.name == action.name) {
            found.push(action);
        }
    }
}

fn scan(expr: &Expr, found: &mut Vec<&'static Action>) {
    match expr {
        Expr::Number(_) | Expr::String(_) => {}
        Expr::Identifier(name) => add(lookup_action(name), found),
        Expr::List(items) => items.iter().for_each(|item| scan(item, found)),
        Expr::Range { low, high } => {
            scan(low, found);
            scan(high, found);
        }
        Expr::Grouped(inner) => scan(inner, found),
        Expr::Unary { operand, .. } => scan(operand, found),
        Expr::Binary { left, right, .. } => {
            scan(left, found);
            scan(right, found);
        }
        Expr::Ternary { condition, then_expr, else_expr } => {
            scan(condition, found);
            scan(then_expr, found);
            scan(else_expr, found);
        }
        Expr::Call { name, args } => {
            if name == "playersays" {
                add(lookup_action(CHAT_ACTION), found);
            }
            args.iter().for_each(|arg| scan(arg, found));
        }
        Expr::Index { target, indices } => {
            scan(target, found);
            indices.iter().for_each(|index| scan(index, found));
        }
        Expr::Dotted(segments) => {
            if let Some(head) = segments.first() {
                scan(head, found);
            }
            for segment in segments.iter().skip(1) {
                scan_member(segment, found);
            }
        }
    }
}

/// Members of a dotted chain are never action flags, but their arguments
/// may mention one
fn scan_member(segment: &Expr, found: &mut Vec<&'static Action>) {
    match segment {
        Expr::Call { args, .. } => args.iter().for_each(|arg| scan(arg, found)),
        Expr::Index { target, indices } => {
            scan_member(target, found);
            indices.iter().for_each(|index| scan(index, found));
        }
        _ => {}
    }
}

/// Whether generated code uses `word` as a bare name outside string literals
pub fn mentions(code: &str, word: &str) -> bool {
    let bytes = code.as_bytes();
    let mut in_string = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if b == b'\\' {
                i += 1;
            } else if b == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        if b == b'"' {
            in_string = true;
            i += 1;
            continue;
        }

        if bytes[i..].starts_with(word.as_bytes()) {
            let before_ok = i == 0 || (!is_name_byte(bytes[i - 1]) && bytes[i - 1] != b'.');
            let end = i + word.len();
            let after_ok = end >= bytes.len() || !is_name_byte(bytes[end]);
            if before_ok && after_ok {
                return true;
            }
        }
        i += 1;
    }

    false
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gs1::{parse, parse_expression};
    use gs1conv_core::PlayerListMode;

    fn synthesize(src: &str, options: ConvertOptions) -> String {
        let parsed = parse(src);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let mut synth = Synthesizer::new(options);
        synth.script(&parsed.script);
        synth.finish().0
    }

    fn server(src: &str) -> String {
        synthesize(src, ConvertOptions::server())
    }

    #[test]
    fn test_single_action_optimization() {
        let out = server("if (wasshot) { hurt(5); }");
        assert_eq!(
            out,
            "function onWasShot(player) {\n  this.hurtPlayer(player, 5);\n}\n"
        );
        assert!(!out.contains(DISPATCHER));
    }

    #[test]
    fn test_multi_action_disjunction() {
        let out = server("if (playerchats || timeout) { hide; }");

        assert!(out.contains("function onPlayerChats(player, text) {"));
        assert!(out.contains("function onTimeout() {"));
        assert_eq!(out.matches("this._actions(\"playerchats\", player, null, text);").count(), 1);
        assert_eq!(out.matches("this._actions(\"timeout\", player, null, null);").count(), 1);
        assert_eq!(out.matches("this.hide();").count(), 1);
        assert!(out.contains(
            "function _actions(_actionName, player, npc, text) {\n  if (_actionName == \"playerchats\" || _actionName == \"timeout\") {\n    this.hide();\n  }\n}\n"
        ));
    }

    #[test]
    fn test_forwarding_once_per_action() {
        let out = server("if (playerenters || timeout) hide;\nif (playerenters && a) show;\nelse destroy;");
        assert_eq!(out.matches("this._actions(\"playerenters\"").count(), 1);
        assert_eq!(out.matches("this._actions(\"timeout\"").count(), 1);
        assert_eq!(out.matches("function _actions(").count(), 1);
    }

    #[test]
    fn test_timeout_resolves_player_with_guard() {
        let out = server("if (playerchats || timeout) { hide; }");
        assert!(out.contains(
            "function onTimeout() {\n  var player = this.level.players[0];\n  if (player == null) {\n    this.timeout = 0.05;\n    return;\n  }\n  this._actions(\"timeout\", player, null, null);\n}\n"
        ));
    }

    #[test]
    fn test_client_side_resolution() {
        let out = synthesize("if (timeout) { message #n(0); }", ConvertOptions::client());
        assert!(out.starts_with("function onTimeout() {\n  var player = getLocalPlayer();\n"));
    }

    #[test]
    fn test_server_player_list_resolution() {
        let options = ConvertOptions {
            player_list: PlayerListMode::Server,
            ..ConvertOptions::server()
        };
        let out = synthesize("if (exploded) { hurt 1; }", options);
        assert!(out.contains("var player = players[0];"));
        assert!(!out.contains("player == null"));
    }

    #[test]
    fn test_weapon_event_uses_wielder() {
        let out = server("if (weaponfired) { hurt 1; }");
        assert!(out.contains("function onWeaponFired() {\n  var player = this.player;\n"));
    }

    #[test]
    fn test_params_only_when_referenced() {
        let out = server("if (playerchats) { hide; }");
        assert!(out.contains("function onPlayerChats() {"));

        let out = server("if (playersays(hello)) { hide; }");
        assert!(out.contains("function onPlayerChats(player, text) {\n  if (text == \"hello\") {"));
    }

    #[test]
    fn test_no_action_condition_goes_to_prologue() {
        let out = server("if (a == 1) { hide; }\nif (playerenters) { show; }");
        assert!(out.contains("function _onAnyAction(_actionName, player, npc, text) {\n  if (this.a == 1) {"));
        assert!(out.contains(
            "function onPlayerEntersLevel(player) {\n  this._onAnyAction(\"playerenters\", player, null, null);\n  this.show();\n}"
        ));
    }

    #[test]
    fn test_prologue_alone_gets_created_callback() {
        let out = server("if (a == 1) { hide; }");
        assert!(out.starts_with("function onCreated() {\n  this._onAnyAction(\"created\", null, null, null);\n}\n"));
    }

    #[test]
    fn test_create_code_and_functions() {
        let out = server("function foo() { hide; }\nsetimg door.png;\nif (created) { show; }");
        assert_eq!(
            out,
            "function foo() {\n  this.hide();\n}\n\nfunction onCreated() {\n  this.image = \"door.png\";\n  this.show();\n}\n"
        );
    }

    #[test]
    fn test_created_body_keeps_source_order() {
        let out = server("if (created && a == 1) { show; }\nsetimg x.png;");
        assert_eq!(
            out,
            "function onCreated() {\n  if (true && this.a == 1) {\n    this.show();\n  }\n  this.image = \"x.png\";\n}\n"
        );
    }

    #[test]
    fn test_else_goes_to_dispatcher() {
        let out = server("if (playerenters) { show; } else { hide; }");
        assert!(out.contains("function _actions("));
        assert!(out.contains("if (_actionName == \"playerenters\") {"));
        assert!(out.contains("this._actions(\"playerenters\", player, null, null);"));
    }

    #[test]
    fn test_set_flag_references_dispatcher() {
        let out = server("if (playerenters) { set flag1; }");
        assert!(out.contains("this._actions(\"playerenters\", player, null, null);"));
        assert!(out.contains("function _actions(_actionName, player, npc, text) {\n}\n"));
    }

    #[test]
    fn test_helpers_appended_once_in_order() {
        let out = server("if (timeout) { a = getangle(1, 2); b = getdir(1, 2); c = getangle(3, 4); }");
        assert_eq!(out.matches("function _getAngle(").count(), 1);
        assert_eq!(out.matches("function _getDir(").count(), 1);
        assert!(out.find("function _getAngle(").unwrap() < out.find("function _getDir(").unwrap());
    }

    #[test]
    fn test_collect_actions() {
        let expr = parse_expression("playerenters || (timeout && playersays(hi)) || playerenters").unwrap();
        let names: Vec<&str> = collect_actions(&expr).iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["playerenters", "timeout", "playerchats"]);

        let expr = parse_expression("npc.timeout").unwrap();
        assert!(collect_actions(&expr).is_empty());
    }

    #[test]
    fn test_mentions() {
        assert!(mentions("  player.gx = 1;", "player"));
        assert!(!mentions("  this.say(\"player\");", "player"));
        assert!(!mentions("  this.hurtPlayer(1);", "player"));
        assert!(!mentions("  this.player.x;", "player"));
        assert!(!mentions("  playerx;", "player"));
        assert!(mentions("f(a, text)", "text"));
    }
}
