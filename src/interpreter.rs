use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::rc::Rc;

use crate::class::{Class, Instance};
use crate::environment::Environment;
use crate::error::{RuntimeError, Session};
use crate::expr::{Expr, NodeId};
use crate::function::{self, Function};
use crate::stmt::Stmt;
use crate::token::{Kind, Token};
use crate::value::{Callable, Literal, Value};

/// The three non-local transfers a statement can produce. Carried as a
/// typed result rather than unwound through a host exception mechanism:
/// `execute`/`execute_block` propagate it up to the nearest loop or call
/// that knows how to absorb it.
pub enum Signal {
    Return(Value),
    Break,
    Continue,
}

/// Tree-walking evaluator. Holds the environment chain rooted at
/// `globals` and the resolver's node-id-to-scope-distance table; output
/// goes through the `Session` passed into each top-level `interpret`
/// call, not through a writer stored on `self`, so one `Interpreter` can
/// serve an entire REPL session across many freshly reset `Session`s.
pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<NodeId, usize>,
    /// Interns string *literals* by text so that two `Literal::String`
    /// nodes with equal content share one `Rc<str>` — `Value::String`
    /// compares by reference (`Rc::ptr_eq`), so without this, `"a" ==
    /// "a"` would be `false` even though both sides are the same text.
    /// Strings built at run time (concatenation) are not interned: each
    /// stays its own distinct reference, matching reference semantics.
    string_literals: HashSet<Rc<str>>,
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Environment::new();
        for native in function::globals() {
            globals.borrow_mut().define(native.name, Value::NativeFunction(Rc::new(native)));
        }
        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            string_literals: HashSet::new(),
        }
    }

    /// Called by the resolver for each `Variable`/`Assign`/`This`/`Super`
    /// node it resolves to a local binding.
    pub fn resolve(&mut self, node_id: NodeId, depth: usize) {
        self.locals.insert(node_id, depth);
    }

    fn intern(&mut self, text: &str) -> Rc<str> {
        if let Some(existing) = self.string_literals.get(text) {
            return Rc::clone(existing);
        }
        let interned: Rc<str> = Rc::from(text);
        self.string_literals.insert(Rc::clone(&interned));
        interned
    }

    pub fn interpret(&mut self, statements: &[Stmt], session: &mut Session<'_>) {
        for statement in statements {
            if session.repl {
                if let Stmt::Expression(expr) = statement {
                    match self.evaluate(expr, session) {
                        Ok(value) => {
                            if !is_bare_print_call(expr) {
                                let _ = writeln!(session.out, "{}", echo(&value));
                            }
                        }
                        Err(err) => {
                            session.report(&err);
                            return;
                        }
                    }
                    continue;
                }
            }

            match self.execute(statement, session) {
                Ok(_) => {}
                Err(err) => {
                    session.report(&err);
                    return;
                }
            }
        }
    }

    fn execute(&mut self, stmt: &Stmt, session: &mut Session<'_>) -> Result<Option<Signal>, RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr, session)?;
                Ok(None)
            }
            Stmt::Var(decl) => {
                self.environment.borrow_mut().declare(&decl.name.lexeme);
                if let Some(initializer) = &decl.initializer {
                    let value = self.evaluate(initializer, session)?;
                    self.environment.borrow_mut().define(&decl.name.lexeme, value);
                }
                Ok(None)
            }
            Stmt::MultiVar(decls) => {
                for decl in decls {
                    self.environment.borrow_mut().declare(&decl.name.lexeme);
                    if let Some(initializer) = &decl.initializer {
                        let value = self.evaluate(initializer, session)?;
                        self.environment.borrow_mut().define(&decl.name.lexeme, value);
                    }
                }
                Ok(None)
            }
            Stmt::Block(statements) => {
                let environment = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, environment, session)
            }
            Stmt::If(condition, then_branch, else_branch) => {
                if self.evaluate(condition, session)?.is_truthy() {
                    self.execute(then_branch, session)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch, session)
                } else {
                    Ok(None)
                }
            }
            Stmt::While(condition, body) => {
                while self.evaluate(condition, session)?.is_truthy() {
                    match self.execute(body, session)? {
                        Some(Signal::Break) => break,
                        Some(Signal::Continue) | None => {}
                        signal @ Some(Signal::Return(_)) => return Ok(signal),
                    }
                }
                Ok(None)
            }
            Stmt::For(init, condition, increment, body) => {
                if let Some(init) = init {
                    if let Some(signal) = self.execute(init, session)? {
                        return Ok(Some(signal));
                    }
                }
                loop {
                    let should_continue = match condition {
                        Some(condition) => self.evaluate(condition, session)?.is_truthy(),
                        None => true,
                    };
                    if !should_continue {
                        break;
                    }

                    match self.execute(body, session)? {
                        Some(Signal::Break) => break,
                        Some(Signal::Continue) | None => {}
                        signal @ Some(Signal::Return(_)) => return Ok(signal),
                    }

                    if let Some(increment) = increment {
                        self.evaluate(increment, session)?;
                    }
                }
                Ok(None)
            }
            Stmt::Break(_) => Ok(Some(Signal::Break)),
            Stmt::Continue(_) => Ok(Some(Signal::Continue)),
            Stmt::Return(_, value) => {
                let value = match value {
                    Some(expr) => self.evaluate(expr, session)?,
                    None => Value::Nil,
                };
                Ok(Some(Signal::Return(value)))
            }
            Stmt::Function(name, func) => {
                let function = Function::new(Some(name.lexeme.clone()), Rc::clone(func), Rc::clone(&self.environment), false);
                self.environment.borrow_mut().define(&name.lexeme, Value::Function(Rc::new(function)));
                Ok(None)
            }
            Stmt::Class(decl) => self.execute_class(decl, session),
        }
    }

    fn execute_class(&mut self, decl: &crate::stmt::ClassDecl, session: &mut Session<'_>) -> Result<Option<Signal>, RuntimeError> {
        self.environment.borrow_mut().define(&decl.name.lexeme, Value::Nil);

        let superclass = match &decl.superclass {
            Some(expr) => match self.evaluate(expr, session)? {
                Value::Class(class) => Some(class),
                _ => {
                    let token = expr.anchor_token().cloned().unwrap_or_else(|| decl.name.clone());
                    return Err(RuntimeError::new(token, "Superclass must be a class.".to_string()));
                }
            },
            None => None,
        };

        let previous_environment = Rc::clone(&self.environment);
        if let Some(superclass) = &superclass {
            self.environment = Environment::with_enclosing(Rc::clone(&self.environment));
            self.environment.borrow_mut().define("super", Value::Class(Rc::clone(superclass)));
        }

        let mut methods = HashMap::new();
        for (method_name, method_expr) in &decl.methods {
            let is_initializer = method_name.lexeme == decl.name.lexeme;
            let function =
                Function::new(Some(method_name.lexeme.clone()), Rc::clone(method_expr), Rc::clone(&self.environment), is_initializer);
            methods.insert(method_name.lexeme.clone(), Rc::new(function));
        }

        self.environment = previous_environment;

        let class = Class::new(decl.name.lexeme.clone(), superclass, methods);
        Environment::assign(&self.environment, &decl.name, Value::Class(Rc::new(RefCell::new(class))))?;

        Ok(None)
    }

    /// Runs `statements` against `environment`, restoring the caller's
    /// environment afterward regardless of how execution ends.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
        session: &mut Session<'_>,
    ) -> Result<Option<Signal>, RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let mut result = Ok(None);
        for statement in statements {
            match self.execute(statement, session) {
                Ok(None) => continue,
                other => {
                    result = other;
                    break;
                }
            }
        }
        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expr: &Expr, session: &mut Session<'_>) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(Literal::String(s)) => Ok(Value::String(self.intern(s))),
            Expr::Literal(literal) => Ok(Value::from_literal(literal)),
            Expr::Grouping(inner) => self.evaluate(inner, session),
            Expr::Unary(op, operand) => self.evaluate_unary(op, operand, session),
            Expr::Binary(left, op, right) => self.evaluate_binary(left, op, right, session),
            Expr::Logical(left, op, right) => {
                let left_value = self.evaluate(left, session)?;
                let short_circuits = match op.kind {
                    Kind::PipePipe => left_value.is_truthy(),
                    Kind::AmpAmp => !left_value.is_truthy(),
                    _ => unreachable!("logical token is always && or ||"),
                };
                if short_circuits {
                    Ok(left_value)
                } else {
                    self.evaluate(right, session)
                }
            }
            Expr::Ternary(cond, then_branch, else_branch) => {
                if self.evaluate(cond, session)?.is_truthy() {
                    self.evaluate(then_branch, session)
                } else {
                    self.evaluate(else_branch, session)
                }
            }
            Expr::Comma(left, _, right) => {
                self.evaluate(left, session)?;
                self.evaluate(right, session)
            }
            Expr::Variable(node_id, name) => self.lookup_variable(*node_id, name),
            Expr::Assign(node_id, name, value) => {
                let value = self.evaluate(value, session)?;
                match self.locals.get(node_id) {
                    Some(&distance) => Environment::assign_at(&self.environment, distance, name, value.clone())?,
                    None => Environment::assign(&self.globals, name, value.clone())?,
                }
                Ok(value)
            }
            Expr::Call(callee, paren, arguments) => self.evaluate_call(callee, paren, arguments, session),
            Expr::Get(object, name) => {
                let object = self.evaluate(object, session)?;
                match object {
                    Value::Instance(instance) => Instance::get(&instance, name),
                    _ => Err(RuntimeError::new(name.clone(), "Only instances have properties.".to_string())),
                }
            }
            Expr::Set(object, name, value) => {
                let object = self.evaluate(object, session)?;
                match object {
                    Value::Instance(instance) => {
                        let value = self.evaluate(value, session)?;
                        Instance::set(&instance, name, value.clone());
                        Ok(value)
                    }
                    _ => Err(RuntimeError::new(name.clone(), "Only instances have fields.".to_string())),
                }
            }
            Expr::This(node_id, keyword) => self.lookup_variable(*node_id, keyword),
            Expr::Super(node_id, keyword, method) => self.evaluate_super(*node_id, keyword, method),
            Expr::FunctionExpr(func) => {
                let function = Function::new(None, Rc::clone(func), Rc::clone(&self.environment), false);
                Ok(Value::Function(Rc::new(function)))
            }
        }
    }

    fn lookup_variable(&self, node_id: NodeId, name: &Token) -> Result<Value, RuntimeError> {
        match self.locals.get(&node_id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => Environment::get(&self.globals, name),
        }
    }

    fn evaluate_super(&mut self, node_id: NodeId, keyword: &Token, method: &Option<Token>) -> Result<Value, RuntimeError> {
        let distance = *self.locals.get(&node_id).expect("resolver always resolves 'super'");
        let superclass = Environment::get_at(&self.environment, distance, keyword)?;
        let Value::Class(superclass) = superclass else { unreachable!("'super' always resolves to a class") };

        let this_token = Token::synthetic(Kind::This, "this");
        let this = Environment::get_at(&self.environment, distance - 1, &this_token)?;

        let name = match method {
            Some(method) => method.lexeme.clone(),
            None => superclass.borrow().name.clone(),
        };

        let found = superclass
            .borrow()
            .find_method(&name)
            .ok_or_else(|| RuntimeError::new(keyword.clone(), format!("Undefined property '{name}'.")))?;

        Ok(Value::Function(Rc::new(found.bind(this))))
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr], session: &mut Session<'_>) -> Result<Value, RuntimeError> {
        let callee_value = self.evaluate(callee, session)?;

        let mut argument_values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            argument_values.push(self.evaluate(argument, session)?);
        }

        if let Value::Class(class) = &callee_value {
            let arity = class.borrow().arity();
            if argument_values.len() != arity {
                return Err(RuntimeError::new(
                    paren.clone(),
                    format!("Expected {} arguments but got {}.", arity, argument_values.len()),
                ));
            }

            let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(class))));
            let initializer_name = class.borrow().name.clone();
            let initializer = class.borrow().find_method(&initializer_name);
            if let Some(initializer) = initializer {
                initializer.bind(Value::Instance(Rc::clone(&instance))).call(self, session, argument_values)?;
            }
            return Ok(Value::Instance(instance));
        }

        let Some(callable) = callee_value.as_callable() else {
            return Err(RuntimeError::new(paren.clone(), "Can only call functions and classes.".to_string()));
        };

        if argument_values.len() != callable.arity() {
            return Err(RuntimeError::new(
                paren.clone(),
                format!("Expected {} arguments but got {}.", callable.arity(), argument_values.len()),
            ));
        }

        match &callee_value {
            Value::Function(f) => f.call(self, session, argument_values),
            Value::NativeFunction(f) => f.call(self, session, argument_values),
            _ => unreachable!("as_callable only returns Some for Function/NativeFunction"),
        }
    }

    fn evaluate_unary(&mut self, op: &Token, operand: &Expr, session: &mut Session<'_>) -> Result<Value, RuntimeError> {
        match op.kind {
            Kind::Bang => Ok(Value::Bool(!self.evaluate(operand, session)?.is_truthy())),
            Kind::Minus => Ok(Value::Number(-number(op, &self.evaluate(operand, session)?)?)),
            Kind::Plus => Ok(Value::Number(number(op, &self.evaluate(operand, session)?)?)),
            Kind::Tilde => Ok(Value::Number(!(number(op, &self.evaluate(operand, session)?)? as i64) as f64)),
            Kind::PlusPlus | Kind::MinusMinus => self.evaluate_increment(op, operand, session),
            _ => unreachable!("parser never produces this token kind in unary position"),
        }
    }

    fn evaluate_increment(&mut self, op: &Token, operand: &Expr, session: &mut Session<'_>) -> Result<Value, RuntimeError> {
        let step = if op.kind == Kind::PlusPlus { 1.0 } else { -1.0 };

        match operand {
            Expr::Variable(node_id, name) => {
                let current = self.lookup_variable(*node_id, name).map_err(|err| {
                    if err.message.contains("before initialization") {
                        RuntimeError::new(op.clone(), "Cannot assign to uninitialized variable.".to_string())
                    } else {
                        err
                    }
                })?;
                let updated = Value::Number(number(op, &current)? + step);
                match self.locals.get(node_id) {
                    Some(&distance) => Environment::assign_at(&self.environment, distance, name, updated.clone())?,
                    None => Environment::assign(&self.globals, name, updated.clone())?,
                }
                Ok(updated)
            }
            Expr::Get(object, name) => {
                let object_value = self.evaluate(object, session)?;
                let Value::Instance(instance) = object_value else {
                    return Err(RuntimeError::new(op.clone(), "Only instances have properties.".to_string()));
                };
                let current = Instance::get(&instance, name)?;
                let updated = Value::Number(number(op, &current)? + step);
                Instance::set(&instance, name, updated.clone());
                Ok(updated)
            }
            _ => Err(RuntimeError::new(op.clone(), "Cannot assign to literal.".to_string())),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, op: &Token, right: &Expr, session: &mut Session<'_>) -> Result<Value, RuntimeError> {
        let left_value = self.evaluate(left, session)?;
        let right_value = self.evaluate(right, session)?;

        match op.kind {
            Kind::Plus => match (&left_value, &right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(Rc::from(format!("{a}{b}")))),
                _ => Err(RuntimeError::new(op.clone(), "Operands must be two numbers or two strings.".to_string())),
            },
            Kind::Minus => {
                let (a, b) = numbers(op, &left_value, &right_value)?;
                Ok(Value::Number(a - b))
            }
            Kind::Star => {
                let (a, b) = numbers(op, &left_value, &right_value)?;
                Ok(Value::Number(a * b))
            }
            Kind::Slash => {
                let (a, b) = numbers(op, &left_value, &right_value)?;
                if b == 0.0 {
                    return Err(RuntimeError::new(op.clone(), "Division by zero.".to_string()));
                }
                Ok(Value::Number(a / b))
            }
            Kind::Percent => {
                let (a, b) = numbers(op, &left_value, &right_value)?;
                if b == 0.0 {
                    return Err(RuntimeError::new(op.clone(), "Division by zero.".to_string()));
                }
                Ok(Value::Number(a % b))
            }
            Kind::StarStar => {
                let (a, b) = numbers(op, &left_value, &right_value)?;
                Ok(Value::Number(a.powf(b)))
            }
            Kind::Ampersand => Ok(Value::Number(int_binary(op, &left_value, &right_value, |a, b| a & b)?)),
            Kind::Pipe => Ok(Value::Number(int_binary(op, &left_value, &right_value, |a, b| a | b)?)),
            Kind::Caret => Ok(Value::Number(int_binary(op, &left_value, &right_value, |a, b| a ^ b)?)),
            Kind::LessLess => Ok(Value::Number(int_binary(op, &left_value, &right_value, |a, b| a << b)?)),
            Kind::GreaterGreater => Ok(Value::Number(int_binary(op, &left_value, &right_value, |a, b| a >> b)?)),
            Kind::Greater => compare(op, &left_value, &right_value, |o| o.is_gt()),
            Kind::GreaterEqual => compare(op, &left_value, &right_value, |o| o.is_ge()),
            Kind::Less => compare(op, &left_value, &right_value, |o| o.is_lt()),
            Kind::LessEqual => compare(op, &left_value, &right_value, |o| o.is_le()),
            Kind::EqualEqual => Ok(Value::Bool(left_value == right_value)),
            Kind::BangEqual => Ok(Value::Bool(left_value != right_value)),
            _ => unreachable!("parser never produces this token kind in binary position"),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn number(op: &Token, value: &Value) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => Err(RuntimeError::new(op.clone(), "Operand must be a number.".to_string())),
    }
}

fn numbers(op: &Token, left: &Value, right: &Value) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(RuntimeError::new(op.clone(), "Operands must be numbers.".to_string())),
    }
}

fn int_binary(op: &Token, left: &Value, right: &Value, f: impl Fn(i64, i64) -> i64) -> Result<f64, RuntimeError> {
    let (a, b) = numbers(op, left, right)?;
    Ok(f(a as i64, b as i64) as f64)
}

fn compare(op: &Token, left: &Value, right: &Value, accept: impl Fn(std::cmp::Ordering) -> bool) -> Result<Value, RuntimeError> {
    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.as_ref().cmp(b.as_ref())),
        _ => None,
    };
    match ordering {
        Some(ordering) => Ok(Value::Bool(accept(ordering))),
        None => Err(RuntimeError::new(op.clone(), "Operands must be two numbers or two strings.".to_string())),
    }
}

/// `print(...)` already writes its own line; a bare top-level call to it
/// must not also be echoed by the REPL.
fn is_bare_print_call(expr: &Expr) -> bool {
    matches!(expr, Expr::Call(callee, _, _) if matches!(callee.as_ref(), Expr::Variable(_, name) if name.lexeme == "print"))
}

/// REPL echo quotes strings; `print` does not.
fn echo(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}
