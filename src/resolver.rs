use std::collections::HashMap;
use std::mem;

use crate::error::{ResolveError, Session, Warning};
use crate::expr::{Expr, FunctionExpr};
use crate::interpreter::Interpreter;
use crate::stmt::Stmt;
use crate::token::{Kind, Token};

#[derive(Clone, Copy, PartialEq)]
enum FunctionKind {
    None,
    Function,
    Method,
    Initializer,
}

#[derive(Clone, Copy, PartialEq)]
enum ClassKind {
    None,
    Class,
    Subclass,
}

struct Binding {
    initialized: bool,
    occurrences: usize,
}

/// Static pass that annotates `Variable`/`Assign`/`This`/`Super` nodes with
/// a scope distance and diagnoses misuse the parser can't catch alone.
pub struct Resolver<'a, 'b> {
    interpreter: &'a mut Interpreter,
    session: &'a mut Session<'b>,
    scopes: Vec<HashMap<Token, Binding>>,
    current_function: FunctionKind,
    current_class: ClassKind,
    /// True while still on the leading chain of statements that would
    /// execute first in the innermost function/method body — descending
    /// into a nested `{ ... }` block's own first statement keeps this
    /// true, but resolving any statement that isn't itself that chain's
    /// next link clears it, at whatever nesting depth that happens.
    /// Used to enforce that a bare `super(...)` chain call appears only
    /// as the true first statement of an initializer: `resolve_function`
    /// sets it once per body and `resolve` (which every nested block
    /// re-enters) is what actually threads and clears it.
    at_body_start: bool,
}

impl<'a, 'b> Resolver<'a, 'b> {
    pub fn new(interpreter: &'a mut Interpreter, session: &'a mut Session<'b>) -> Self {
        Resolver {
            interpreter,
            session,
            scopes: Vec::new(),
            current_function: FunctionKind::None,
            current_class: ClassKind::None,
            at_body_start: false,
        }
    }

    pub fn resolve(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
            // A nested block propagates the leading-chain position into
            // its own first statement (handled by this same function,
            // recursively, from the `Stmt::Block` arm below) — anything
            // else, once resolved, has consumed that position.
            if !matches!(statement, Stmt::Block(_)) {
                self.at_body_start = false;
            }
        }
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        if let Some(scope) = self.scopes.pop() {
            if self.session.repl {
                return;
            }
            for (token, binding) in scope {
                if binding.occurrences == 1 && token.lexeme != "this" && token.lexeme != "super" {
                    self.session.report(&Warning::new(
                        token.clone(),
                        format!("Unused variable '{}' in the current scope.", token.lexeme),
                    ));
                }
            }
        }
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };
        if scope.keys().any(|k| k == name) {
            self.session.report(&ResolveError::new(
                name.clone(),
                format!("Already a variable with name '{}' in this scope.", name.lexeme),
            ));
        }
        scope.insert(name.clone(), Binding { initialized: false, occurrences: 1 });
    }

    fn define(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };
        if let Some(binding) = scope.get_mut(name) {
            binding.initialized = true;
        }
    }

    fn resolve_local(&mut self, node_id: u64, name: &Token) {
        for (depth, scope) in self.scopes.iter_mut().rev().enumerate() {
            if let Some(binding) = scope.get_mut(name) {
                binding.occurrences += 1;
                self.interpreter.resolve(node_id, depth);
                return;
            }
        }
        // Not found in any scope: treated as a global at run time.
    }

    fn resolve_function(&mut self, func: &FunctionExpr, kind: FunctionKind) {
        let enclosing_function = mem::replace(&mut self.current_function, kind);
        let enclosing_body_start = self.at_body_start;

        self.begin_scope();
        for param in &func.params {
            self.declare(param);
            self.define(param);
        }
        self.at_body_start = true;
        self.resolve(&func.body);
        self.end_scope();

        self.current_function = enclosing_function;
        self.at_body_start = enclosing_body_start;
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(expr) => self.resolve_expr(expr),
            Stmt::Var(decl) => {
                self.declare(&decl.name);
                if let Some(initializer) = &decl.initializer {
                    self.resolve_expr(initializer);
                }
                self.define(&decl.name);
            }
            Stmt::MultiVar(decls) => {
                for decl in decls {
                    self.declare(&decl.name);
                    if let Some(initializer) = &decl.initializer {
                        self.resolve_expr(initializer);
                    }
                    self.define(&decl.name);
                }
            }
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve(statements);
                self.end_scope();
            }
            Stmt::If(condition, then_branch, else_branch) => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While(condition, body) => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }
            Stmt::For(init, condition, increment, body) => {
                self.begin_scope();
                if let Some(init) = init {
                    self.resolve_stmt(init);
                }
                if let Some(condition) = condition {
                    self.resolve_expr(condition);
                }
                self.resolve_stmt(body);
                if let Some(increment) = increment {
                    self.resolve_expr(increment);
                }
                self.end_scope();
            }
            Stmt::Break(_) | Stmt::Continue(_) => {}
            Stmt::Return(keyword, value) => {
                if self.current_function == FunctionKind::None {
                    self.session.report(&ResolveError::new(
                        keyword.clone(),
                        "Can't return from top-level code.".to_string(),
                    ));
                }
                if let Some(value) = value {
                    if self.current_function == FunctionKind::Initializer {
                        self.session.report(&ResolveError::new(
                            keyword.clone(),
                            "Can't return a value from an initializer.".to_string(),
                        ));
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Function(name, func) => {
                self.declare(name);
                self.define(name);
                self.resolve_function(func, FunctionKind::Function);
            }
            Stmt::Class(class_decl) => self.resolve_class(class_decl),
        }
    }

    fn resolve_class(&mut self, class_decl: &crate::stmt::ClassDecl) {
        let enclosing_class = mem::replace(&mut self.current_class, ClassKind::Class);

        self.declare(&class_decl.name);
        self.define(&class_decl.name);

        if let Some(superclass) = &class_decl.superclass {
            let Expr::Variable(_, super_name) = superclass else { unreachable!("parser only emits Variable for superclass") };
            if super_name.lexeme == class_decl.name.lexeme {
                self.session.report(&ResolveError::new(
                    super_name.clone(),
                    "A class cannot inherit from itself.".to_string(),
                ));
            }

            self.current_class = ClassKind::Subclass;
            self.resolve_expr(superclass);

            self.begin_scope();
            let super_token = Token::synthetic(Kind::Super, "super");
            self.scopes
                .last_mut()
                .expect("scope just pushed")
                .insert(super_token, Binding { initialized: true, occurrences: 2 });
        }

        self.begin_scope();
        let this_token = Token::synthetic(Kind::This, "this");
        self.scopes
            .last_mut()
            .expect("scope just pushed")
            .insert(this_token, Binding { initialized: true, occurrences: 2 });

        for (method_name, method) in &class_decl.methods {
            let kind =
                if method_name.lexeme == class_decl.name.lexeme { FunctionKind::Initializer } else { FunctionKind::Method };
            self.resolve_function(method, kind);
        }

        self.end_scope();

        if class_decl.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}
            Expr::Grouping(inner) => self.resolve_expr(inner),
            Expr::Unary(_, operand) => self.resolve_expr(operand),
            Expr::Binary(left, _, right) | Expr::Logical(left, _, right) | Expr::Comma(left, _, right) => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Ternary(cond, then_branch, else_branch) => {
                self.resolve_expr(cond);
                self.resolve_expr(then_branch);
                self.resolve_expr(else_branch);
            }
            Expr::Variable(node_id, name) => {
                if let Some(scope) = self.scopes.last() {
                    if let Some(binding) = scope.get(name) {
                        if !binding.initialized {
                            self.session.report(&ResolveError::new(
                                name.clone(),
                                "Can't read local variable in its own initializer.".to_string(),
                            ));
                        }
                    }
                }
                self.resolve_local(*node_id, name);
            }
            Expr::Assign(node_id, name, value) => {
                self.resolve_expr(value);
                self.resolve_local(*node_id, name);
            }
            Expr::Call(callee, _, arguments) => {
                self.resolve_expr(callee);
                for argument in arguments {
                    self.resolve_expr(argument);
                }

                if let Expr::Super(_, keyword, None) = callee.as_ref() {
                    if self.current_function != FunctionKind::Initializer || !self.at_body_start {
                        self.session.report(&ResolveError::new(
                            keyword.clone(),
                            "A chain-constructor 'super' call may appear only as the first statement of an initializer.".to_string(),
                        ));
                    }
                }
            }
            Expr::Get(object, _) => self.resolve_expr(object),
            Expr::Set(object, _, value) => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }
            Expr::This(node_id, keyword) => {
                if self.current_class == ClassKind::None {
                    self.session.report(&ResolveError::new(
                        keyword.clone(),
                        "Can't use 'this' outside of a class.".to_string(),
                    ));
                    return;
                }
                self.resolve_local(*node_id, keyword);
            }
            Expr::Super(node_id, keyword, _) => {
                match self.current_class {
                    ClassKind::Subclass => {}
                    ClassKind::None => {
                        self.session.report(&ResolveError::new(
                            keyword.clone(),
                            "Can't use 'super' outside of a class.".to_string(),
                        ));
                    }
                    ClassKind::Class => {
                        self.session.report(&ResolveError::new(
                            keyword.clone(),
                            "Can't use 'super' in a class with no superclass.".to_string(),
                        ));
                    }
                }
                self.resolve_local(*node_id, keyword);
            }
            Expr::FunctionExpr(func) => self.resolve_function(func, FunctionKind::Function),
        }
    }
}
