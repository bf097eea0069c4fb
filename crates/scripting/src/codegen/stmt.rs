//! Statement translation

use super::{ExprCtx, Generator};
use crate::gs1::ast::{Expr, Stmt};

impl Generator {
    /// Translate a statement into the current sink
    pub fn statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.emit("{");
                self.indented(|g| g.statements(statements));
                self.emit("}");
            }
            Stmt::If { .. } => self.if_statement(stmt),
            Stmt::While { condition, body } => {
                let condition = self.expression(condition, ExprCtx::condition());
                self.emit(&format!("while ({}) {{", condition));
                self.body(body);
                self.emit("}");
            }
            Stmt::For { init, condition, step, body } => {
                let init = self.optional(init.as_ref(), ExprCtx::default());
                let condition = self.optional(condition.as_ref(), ExprCtx::condition());
                let step = self.optional(step.as_ref(), ExprCtx::default());
                self.emit(&format!("for ({}; {}; {}) {{", init, condition, step));
                self.body(body);
                self.emit("}");
            }
            Stmt::Break => self.emit("break;"),
            Stmt::Continue => self.emit("continue;"),
            Stmt::Return(None) => self.emit("return;"),
            Stmt::Return(Some(value)) => {
                let value = self.expression(value, ExprCtx::default());
                self.emit(&format!("return {};", value));
            }
            Stmt::Command { name, args } => {
                let text = self.call(name, args, ExprCtx::default());
                self.emit_terminated(&text);
            }
            Stmt::Function { name, body } => {
                self.emit(&format!("function {}() {{", name));
                self.body(body);
                self.emit("}");
            }
            Stmt::Expr(expr) => {
                let text = self.expression(expr, ExprCtx::default());
                self.emit_terminated(&text);
            }
            Stmt::Empty => {}
        }
    }

    /// Translate statements in order
    pub fn statements(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.statement(stmt);
        }
    }

    /// Translate the contents of a block, or a single statement, one level
    /// deeper
    pub fn body(&mut self, stmt: &Stmt) {
        self.indented(|g| g.body_contents(stmt));
    }

    /// Translate the contents of a block, or a single statement, at the
    /// current depth
    pub fn body_contents(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => self.statements(statements),
            other => self.statement(other),
        }
    }

    fn if_statement(&mut self, stmt: &Stmt) {
        let mut current = stmt;
        let mut keyword = "if";

        loop {
            let Stmt::If { condition, then_branch, else_branch } = current else {
                return;
            };

            let condition = self.expression(condition, ExprCtx::condition());
            let opener = format!("{} ({}) {{", keyword, condition);
            if keyword == "if" {
                self.emit(&opener);
            } else {
                self.emit(&format!("}} {}", opener));
            }
            self.body(then_branch);

            match else_branch.as_deref() {
                Some(next @ Stmt::If { .. }) => {
                    current = next;
                    keyword = "else if";
                }
                Some(other) => {
                    self.emit("} else {");
                    self.body(other);
                    self.emit("}");
                    return;
                }
                None => {
                    self.emit("}");
                    return;
                }
            }
        }
    }

    fn optional(&mut self, expr: Option<&Expr>, ctx: ExprCtx) -> String {
        expr.map(|e| self.expression(e, ctx)).unwrap_or_default()
    }

    /// Emit a statement, adding `;` unless it ends in a block
    fn emit_terminated(&mut self, text: &str) {
        if text.ends_with('}') {
            self.emit(text);
        } else {
            self.emit(&format!("{};", text));
        }
    }
}
