//! Code generator
//!
//! Walks the GS1 tree and produces target-language text. Statements are
//! written into whichever sink is on top of the generator's [`SinkStack`];
//! expressions are returned as strings. The [`Target`] records which output
//! section is being produced, since several translations (action flags,
//! `playersays`, `set`) depend on it.

mod builtins;
mod expr;
pub mod property;
mod stmt;

pub use builtins::{Builtin, Builtins};

use crate::error::Diagnostic;
use crate::sink::{Sink, SinkStack};
use crate::tables::{Action, LanguageTables, ParamRole};
use gs1conv_core::ConvertOptions;
use tracing::debug;

/// Flags threaded through expression generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExprCtx {
    /// Generating the controlling condition of an `if`, loop or ternary;
    /// a bare `=` means comparison here
    pub in_condition: bool,
    /// Anywhere inside a condition, including call arguments; action flags
    /// are only recognized here
    pub condition_region: bool,
    /// Do not qualify bare identifiers with `this.`
    pub suppress_self: bool,
}

impl ExprCtx {
    /// Context for a controlling condition
    pub fn condition() -> Self {
        Self {
            in_condition: true,
            condition_region: true,
            suppress_self: false,
        }
    }

    /// Context for call arguments and index lists
    pub fn args(self) -> Self {
        Self {
            in_condition: false,
            suppress_self: false,
            ..self
        }
    }

    /// Context for non-leading segments of a dotted chain
    pub fn suppressed(self) -> Self {
        Self {
            suppress_self: true,
            ..self
        }
    }
}

/// Output section currently being generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Function declarations outside any callback
    Global,
    /// Unconditional top-level code, run on creation
    Create,
    /// Body of one event callback
    Event(&'static Action),
    /// Shared multi-action dispatcher
    Dispatcher,
    /// Shared no-action prologue
    Prologue,
}

impl Target {
    /// Expression naming the action being handled
    pub fn action_name(self) -> String {
        match self {
            Target::Event(action) => format!("\"{}\"", action.name),
            Target::Dispatcher | Target::Prologue => "_actionName".to_string(),
            Target::Create => "\"created\"".to_string(),
            Target::Global => "\"\"".to_string(),
        }
    }

    /// Expression for a contextual parameter, or `null` when the section
    /// has no such value
    pub fn role_arg(self, role: ParamRole) -> &'static str {
        let available = match self {
            Target::Event(action) => role == ParamRole::Player || action.has_param(role),
            Target::Dispatcher | Target::Prologue => true,
            Target::Create | Target::Global => role == ParamRole::Player,
        };
        if available {
            role.name()
        } else {
            "null"
        }
    }
}

/// Generator state for one conversion
pub struct Generator {
    tables: LanguageTables,
    options: ConvertOptions,
    builtins: Builtins,
    sinks: SinkStack,
    helpers: Vec<&'static str>,
    diagnostics: Vec<Diagnostic>,
    dispatcher_referenced: bool,
    target: Target,
    depth: usize,
}

impl Generator {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            tables: LanguageTables::new(&options),
            options,
            builtins: Builtins::new(),
            sinks: SinkStack::new(),
            helpers: Vec::new(),
            diagnostics: Vec::new(),
            dispatcher_referenced: false,
            target: Target::Global,
            depth: 0,
        }
    }

    pub fn tables(&self) -> &LanguageTables {
        &self.tables
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Route subsequent statements to another section at the given depth
    pub fn set_target(&mut self, target: Target, depth: usize) {
        self.target = target;
        self.depth = depth;
    }

    /// Request a helper function; repeated requests are ignored
    pub fn request_helper(&mut self, name: &'static str) {
        if !self.helpers.contains(&name) {
            debug!(helper = name, "helper requested");
            self.helpers.push(name);
        }
    }

    /// Requested helpers in first-request order
    pub fn helpers(&self) -> &[&'static str] {
        &self.helpers
    }

    /// Record that generated code calls the dispatcher
    pub fn mark_dispatcher(&mut self) {
        self.dispatcher_referenced = true;
    }

    pub fn dispatcher_referenced(&self) -> bool {
        self.dispatcher_referenced
    }

    /// Record a non-fatal problem
    pub fn report(&mut self, line: usize, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            line,
            message: message.into(),
        });
    }

    /// Drain recorded diagnostics
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Run `f` with output redirected into `sink`, returning the sink with
    /// whatever `f` wrote appended to it
    pub fn redirected<R>(&mut self, sink: Sink, f: impl FnOnce(&mut Self) -> R) -> (Sink, R) {
        let depth = self.sinks.depth();
        self.sinks.push(sink);
        let result = f(self);
        let captured = self.sinks.pop().unwrap_or_default();
        debug_assert_eq!(self.sinks.depth(), depth);
        (captured, result)
    }

    /// The global sink
    pub fn global(&mut self) -> &mut Sink {
        self.sinks.global_mut()
    }

    /// Write text at the current indentation depth
    fn emit(&mut self, text: &str) {
        let depth = self.depth;
        self.sinks.current().block(depth, text);
    }

    /// Run `f` one indentation level deeper
    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::lookup_action;

    #[test]
    fn test_helper_requests_are_idempotent() {
        let mut gen = Generator::new(ConvertOptions::default());
        gen.request_helper("_getAngle");
        gen.request_helper("tileX");
        gen.request_helper("_getAngle");
        assert_eq!(gen.helpers(), &["_getAngle", "tileX"]);
    }

    #[test]
    fn test_redirection_restores_previous_sink() {
        let mut gen = Generator::new(ConvertOptions::default());
        gen.emit("global;");

        let (outer, ()) = gen.redirected(Sink::new(), |g| {
            g.emit("outer;");
            let (inner, ()) = g.redirected(Sink::new(), |g| g.emit("inner;"));
            assert_eq!(inner.as_str(), "inner;\n");
            g.emit("outer again;");
        });

        assert_eq!(outer.as_str(), "outer;\nouter again;\n");
        gen.emit("tail;");
        assert_eq!(gen.global().as_str(), "global;\ntail;\n");
    }

    #[test]
    fn test_target_role_args() {
        let chats = Target::Event(lookup_action("playerchats").unwrap());
        assert_eq!(chats.role_arg(ParamRole::ChatText), "text");
        assert_eq!(chats.role_arg(ParamRole::Npc), "null");
        assert_eq!(chats.action_name(), "\"playerchats\"");

        assert_eq!(Target::Dispatcher.role_arg(ParamRole::Npc), "npc");
        assert_eq!(Target::Dispatcher.action_name(), "_actionName");
        assert_eq!(Target::Create.action_name(), "\"created\"");
    }

    #[test]
    fn test_condition_flag_cleared_for_args() {
        let ctx = ExprCtx::condition().args();
        assert!(!ctx.in_condition);
        assert!(ctx.condition_region);
    }
}
