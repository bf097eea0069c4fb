//! Expression translation

use super::{ExprCtx, Generator, Target};
use crate::gs1::ast::{BinaryOp, Expr, UnaryOp};
use crate::tables::{is_root, lookup_action, lookup_rewrite, Action};

/// Tiles per level row in the flat tile array
const BOARD_WIDTH: usize = 64;

impl Generator {
    /// Translate an expression
    pub fn expression(&mut self, expr: &Expr, ctx: ExprCtx) -> String {
        match expr {
            Expr::Number(n) if n.starts_with('.') => format!("0{}", n),
            Expr::Number(n) => n.clone(),
            Expr::String(s) => self.expand_property_string(s),
            Expr::Identifier(name) => self.identifier(name, ctx),
            Expr::List(items) => format!("[{}]", self.expression_list(items, ctx.args())),
            Expr::Range { low, high } => {
                let ctx = ctx.args();
                format!("[{}, {}]", self.expression(low, ctx), self.expression(high, ctx))
            }
            Expr::Grouped(inner) => format!("({})", self.expression(inner, ctx)),
            Expr::Unary { op, operand } => self.unary(*op, operand, ctx),
            Expr::Binary { left, op, right } => self.binary(left, *op, right, ctx),
            Expr::Ternary { condition, then_expr, else_expr } => {
                let condition = self.expression(
                    condition,
                    ExprCtx { in_condition: true, ..ctx },
                );
                let args = ctx.args();
                format!(
                    "if({}, {}, {})",
                    condition,
                    self.expression(then_expr, args),
                    self.expression(else_expr, args)
                )
            }
            Expr::Call { name, args } => self.call(name, args, ctx),
            Expr::Index { target, indices } => self.index(target, indices, ctx),
            Expr::Dotted(segments) => self.dotted(segments, ctx),
        }
    }

    /// Translate and comma-join a list of expressions
    pub(crate) fn expression_list(&mut self, items: &[Expr], ctx: ExprCtx) -> String {
        items
            .iter()
            .map(|item| self.expression(item, ctx))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Translate a bare identifier
    fn identifier(&mut self, name: &str, ctx: ExprCtx) -> String {
        if ctx.condition_region {
            if let Some(action) = lookup_action(name) {
                return self.action_condition(action);
            }
        }

        if let Some(rewrite) = lookup_rewrite(name) {
            if ctx.suppress_self && !rewrite.prepend_self {
                return name.to_string();
            }
            let text = self.substitute(rewrite.replacement);
            return if rewrite.prepend_self && !ctx.suppress_self {
                format!("this.{}", text)
            } else {
                text
            };
        }

        if ctx.suppress_self || is_root(name) {
            name.to_string()
        } else {
            format!("this.{}", name)
        }
    }

    /// Substitute mode tokens, requesting any helper the text now calls
    pub(crate) fn substitute(&mut self, text: &str) -> String {
        let (text, helpers) = self.tables.substitute(text);
        for helper in helpers {
            self.request_helper(helper);
        }
        text
    }

    /// An action flag inside a condition
    fn action_condition(&self, action: &'static Action) -> String {
        match self.target {
            Target::Event(current) if current.name == action.name => "true".to_string(),
            Target::Dispatcher | Target::Prologue => format!("_actionName == \"{}\"", action.name),
            _ => "false".to_string(),
        }
    }

    fn unary(&mut self, op: UnaryOp, operand: &Expr, ctx: ExprCtx) -> String {
        let value = self.expression(operand, ctx);
        match op {
            UnaryOp::Not => match operand {
                Expr::Binary { op, .. } if op.is_boolean() => format!("!({})", value),
                _ => format!("!{}", value),
            },
            UnaryOp::Negate => format!("-{}", value),
            UnaryOp::PreIncrement => format!("++{}", value),
            UnaryOp::PreDecrement => format!("--{}", value),
            UnaryOp::PostIncrement => format!("{}++", value),
            UnaryOp::PostDecrement => format!("{}--", value),
        }
    }

    fn binary(&mut self, left: &Expr, op: BinaryOp, right: &Expr, ctx: ExprCtx) -> String {
        match op {
            BinaryOp::Pow | BinaryOp::Mod => {
                let args = ctx.args();
                let name = if op == BinaryOp::Pow { "pow" } else { "mod" };
                format!(
                    "{}({}, {})",
                    name,
                    self.expression(left, args),
                    self.expression(right, args)
                )
            }
            BinaryOp::In => {
                let value = self.expression(left, ctx.args());
                match right {
                    Expr::Range { low, high } => {
                        let args = ctx.args();
                        format!(
                            "inRange({}, {}, {})",
                            value,
                            self.expression(low, args),
                            self.expression(high, args)
                        )
                    }
                    collection => {
                        let collection = self.expression(collection, ctx.args());
                        format!("{}.find({}) !== null", collection, value)
                    }
                }
            }
            BinaryOp::Assign if ctx.in_condition => {
                format!("{} == {}", self.expression(left, ctx), self.expression(right, ctx))
            }
            _ => {
                let lhs = self.expression(left, ctx);
                let rhs = self.expression(right, ctx);
                format!("{} {} {}", lhs, op.symbol(), rhs)
            }
        }
    }

    /// Translate a call through the built-in table, falling back to a
    /// generic method call
    pub(crate) fn call(&mut self, name: &str, args: &[Expr], ctx: ExprCtx) -> String {
        let ctx = ctx.args();

        if let Some(builtin) = self.builtins.get(name) {
            if let Some(text) = builtin.apply(self, args, ctx) {
                return text;
            }
        }

        let callee = self.callee(name);
        format!("{}({})", callee, self.expression_list(args, ctx))
    }

    /// Callee text for a call the built-in table did not handle
    fn callee(&mut self, name: &str) -> String {
        if let Some(rewrite) = lookup_rewrite(name) {
            let text = self.substitute(rewrite.replacement);
            return if rewrite.prepend_self {
                format!("this.{}", text)
            } else {
                text
            };
        }

        if name.starts_with("player") || name.starts_with("setplayer") {
            format!("player.{}", name)
        } else {
            format!("this.{}", name)
        }
    }

    fn index(&mut self, target: &Expr, indices: &[Expr], ctx: ExprCtx) -> String {
        let base = self.expression(target, ctx);
        let args = ctx.args();

        let is_board = matches!(target.as_identifier(), Some("tiles" | "board"));
        if is_board && indices.len() == 2 {
            let col = self.expression(&indices[0], args);
            let row = self.expression(&indices[1], args);
            return format!("{}[({})*{}+({})]", base, row, BOARD_WIDTH, col);
        }

        let mut out = base;
        for index in indices {
            let index = self.expression(index, args);
            out.push('[');
            out.push_str(&index);
            out.push(']');
        }
        out
    }

    /// Translate `a.b.c`; only the head may receive `this.`
    fn dotted(&mut self, segments: &[Expr], ctx: ExprCtx) -> String {
        let mut parts = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            let part = if i == 0 {
                self.expression(segment, ctx)
            } else {
                self.member(segment, ctx.suppressed())
            };
            parts.push(part);
        }
        parts.join(".")
    }

    /// A non-leading segment of a dotted chain
    fn member(&mut self, segment: &Expr, ctx: ExprCtx) -> String {
        match segment {
            Expr::Identifier(name) => match lookup_rewrite(name) {
                Some(rewrite) if rewrite.prepend_self => self.substitute(rewrite.replacement),
                _ => name.clone(),
            },
            Expr::Call { name, args } => {
                format!("{}({})", name, self.expression_list(args, ctx.args()))
            }
            Expr::Index { target, indices } => {
                let base = self.member(target, ctx);
                let mut out = base;
                for index in indices {
                    let index = self.expression(index, ctx.args());
                    out.push_str(&format!("[{}]", index));
                }
                out
            }
            other => self.expression(other, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gs1::parse_expression;
    use gs1conv_core::{ConvertOptions, CoordinateMode, PlayerListMode};

    fn render(src: &str) -> String {
        render_with(src, ExprCtx::default(), ConvertOptions::default())
    }

    fn render_with(src: &str, ctx: ExprCtx, options: ConvertOptions) -> String {
        let mut gen = Generator::new(options);
        let expr = parse_expression(src).unwrap();
        gen.expression(&expr, ctx)
    }

    #[test]
    fn test_number_normalization() {
        assert_eq!(render(".5"), "0.5");
        assert_eq!(render("12"), "12");
    }

    #[test]
    fn test_pow_and_mod() {
        assert_eq!(render("a ^ b"), "pow(this.a, this.b)");
        assert_eq!(render("a % 3"), "mod(this.a, 3)");
    }

    #[test]
    fn test_assignment_in_and_out_of_condition() {
        assert_eq!(render("a = b"), "this.a = this.b");
        assert_eq!(render_with("a = b", ExprCtx::condition(), ConvertOptions::default()), "this.a == this.b");
    }

    #[test]
    fn test_assignment_inside_call_args_in_condition() {
        assert_eq!(
            render_with("foo(a = 1)", ExprCtx::condition(), ConvertOptions::default()),
            "this.foo(this.a = 1)"
        );
    }

    #[test]
    fn test_legacy_comparisons() {
        assert_eq!(render("a => 1"), "this.a >= 1");
        assert_eq!(render("a =< 1"), "this.a <= 1");
    }

    #[test]
    fn test_ternary() {
        assert_eq!(render("a = b ? 1 : 2"), "this.a = if(this.b, 1, 2)");
    }

    #[test]
    fn test_not_wraps_boolean_binary() {
        assert_eq!(render("!a"), "!this.a");
        assert_eq!(render("!a == 1"), "!this.a == 1");
        assert_eq!(render("!(a == 1)"), "!(this.a == 1)");
    }

    #[test]
    fn test_not_parenthesizes_bare_boolean_operand() {
        let expr = Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::Binary {
                left: Box::new(Expr::Identifier("a".into())),
                op: BinaryOp::And,
                right: Box::new(Expr::Identifier("b".into())),
            }),
        };
        let mut gen = Generator::new(ConvertOptions::default());
        assert_eq!(gen.expression(&expr, ExprCtx::default()), "!(this.a && this.b)");

        let arithmetic = Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::Binary {
                left: Box::new(Expr::Identifier("a".into())),
                op: BinaryOp::Add,
                right: Box::new(Expr::Number("1".into())),
            }),
        };
        assert_eq!(gen.expression(&arithmetic, ExprCtx::default()), "!this.a + 1");
    }

    #[test]
    fn test_membership() {
        assert_eq!(render("a in <1, 5>"), "inRange(this.a, 1, 5)");
        assert_eq!(render("a in {1, 2}"), "[1, 2].find(this.a) !== null");
        assert_eq!(render("a in list"), "this.list.find(this.a) !== null");
    }

    #[test]
    fn test_identifier_rewrites() {
        assert_eq!(render("x"), "this.gx");
        assert_eq!(render("playerx"), "player.gx");
        assert_eq!(render("player"), "player");
        assert_eq!(render("myvar"), "this.myvar");
    }

    #[test]
    fn test_rewrite_with_coordinate_token() {
        assert_eq!(render("mousex"), "this.localTileX(player.mouseX)");
        let global = ConvertOptions {
            coordinates: CoordinateMode::Global,
            ..ConvertOptions::default()
        };
        assert_eq!(render_with("mousex", ExprCtx::default(), global), "this.tileX(player.mouseX)");
    }

    #[test]
    fn test_player_list_modes() {
        assert_eq!(render("playerscount"), "this.level.players.size");
        let server = ConvertOptions {
            player_list: PlayerListMode::Server,
            ..ConvertOptions::default()
        };
        assert_eq!(render_with("playerscount", ExprCtx::default(), server), "players.size");
    }

    #[test]
    fn test_dotted_chain() {
        assert_eq!(render("player.x"), "player.gx");
        assert_eq!(render("foo.bar"), "this.foo.bar");
        assert_eq!(render("npc.weapons[1].name"), "npc.weapons[1].name");
        assert_eq!(render("foo.go(x)"), "this.foo.go(this.gx)");
    }

    #[test]
    fn test_tiles_index() {
        assert_eq!(render("tiles[5]"), "this.level.tiles[5]");
        assert_eq!(render("board[1, 2]"), "this.level.tiles[(2)*64+(1)]");
    }

    #[test]
    fn test_actions_only_in_conditions() {
        assert_eq!(render("timeout = 1"), "this.timeout = 1");
        assert_eq!(render_with("timeout", ExprCtx::condition(), ConvertOptions::default()), "false");
    }

    #[test]
    fn test_action_rendering_by_target() {
        let mut gen = Generator::new(ConvertOptions::default());
        let expr = parse_expression("playerenters").unwrap();

        gen.set_target(Target::Event(lookup_action("playerenters").unwrap()), 1);
        assert_eq!(gen.expression(&expr, ExprCtx::condition()), "true");

        gen.set_target(Target::Event(lookup_action("timeout").unwrap()), 1);
        assert_eq!(gen.expression(&expr, ExprCtx::condition()), "false");

        gen.set_target(Target::Dispatcher, 1);
        assert_eq!(gen.expression(&expr, ExprCtx::condition()), "_actionName == \"playerenters\"");
    }

    #[test]
    fn test_generic_call_fallback() {
        assert_eq!(render("dosomething(1, x)"), "this.dosomething(1, this.gx)");
        assert_eq!(render("setplayerdir(2)"), "player.setDir(2)");
        assert_eq!(render("playerthing(1)"), "player.playerthing(1)");
    }
}
