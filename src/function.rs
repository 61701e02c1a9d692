use std::cell::RefCell;
use std::fmt::{self, Display};
use std::io::Write;
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::{RuntimeError, Session};
use crate::expr::FunctionExpr;
use crate::interpreter::Interpreter;
use crate::token::{Kind, Token};
use crate::value::{Callable, Value};

/// A user-defined closure: a function expression bound to the environment
/// active at its creation site, optionally carrying its declared name and
/// whether it is a class initializer (which always returns the bound
/// `this`, regardless of its own `return`).
pub struct Function {
    pub name: Option<String>,
    declaration: Rc<FunctionExpr>,
    closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
}

impl Function {
    pub fn new(
        name: Option<String>,
        declaration: Rc<FunctionExpr>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Function {
        Function { name, declaration, closure, is_initializer }
    }

    /// Produces a new function whose closure defines `this` over a fresh
    /// environment parented by the method's original closure.
    pub fn bind(&self, instance: Value) -> Function {
        let environment = Environment::with_enclosing(Rc::clone(&self.closure));
        environment.borrow_mut().define("this", instance);
        Function {
            name: self.name.clone(),
            declaration: Rc::clone(&self.declaration),
            closure: environment,
            is_initializer: self.is_initializer,
        }
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter, session: &mut Session<'_>, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        let environment = Environment::with_enclosing(Rc::clone(&self.closure));
        for (param, arg) in self.declaration.params.iter().zip(arguments) {
            environment.borrow_mut().define(&param.lexeme, arg);
        }

        let signal = interpreter.execute_block(&self.declaration.body, environment, session)?;

        if self.is_initializer {
            // Bare `return;` short-circuits to `this`; any other return
            // value is itself a resolver-enforced impossibility.
            return Environment::get_at(&self.closure, 0, &Token::synthetic(Kind::This, "this"));
        }

        match signal {
            Some(crate::interpreter::Signal::Return(value)) => Ok(value),
            _ => Ok(Value::Nil),
        }
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "<fn {name}>"),
            None => write!(f, "<fn>"),
        }
    }
}

/// A built-in callable implemented in the host language.
pub struct NativeFunction {
    pub name: &'static str,
    arity: usize,
    func: fn(&mut Interpreter, &mut Session<'_>, Vec<Value>) -> Result<Value, RuntimeError>,
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter, session: &mut Session<'_>, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        (self.func)(interpreter, session, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

/// The language's entire standard library: `clock` and `print`.
pub fn globals() -> Vec<NativeFunction> {
    vec![
        NativeFunction {
            name: "clock",
            arity: 0,
            func: |_, _, _| {
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .expect("system clock is after the Unix epoch")
                    .as_secs();
                Ok(Value::Number(now as f64))
            },
        },
        NativeFunction {
            name: "print",
            arity: 1,
            func: |_, session, mut arguments| {
                let value = arguments.pop().expect("arity checked by the caller");
                let _ = writeln!(session.out, "{value}");
                Ok(Value::Nil)
            },
        },
    ]
}
