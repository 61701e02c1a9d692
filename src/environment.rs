use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;

/// What a name is bound to: either a real value, or the marker left behind
/// by `var x;` until an initializer (if any) runs.
#[derive(Clone)]
enum Slot {
    Uninitialized,
    Value(Value),
}

/// A lexical scope: a name-to-value mapping plus an optional enclosing
/// environment. Closures capture the `Rc<RefCell<Environment>>` by
/// sharing, so later mutation through one handle is visible through all.
pub struct Environment {
    values: HashMap<String, Slot>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment { values: HashMap::new(), enclosing: None }))
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment { values: HashMap::new(), enclosing: Some(enclosing) }))
    }

    /// `var x;` — binds `x` to the uninitialized sentinel.
    pub fn declare(&mut self, name: &str) {
        self.values.insert(name.to_string(), Slot::Uninitialized);
    }

    /// `var x = expr;`, function/class declarations, parameter binding.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), Slot::Value(value));
    }

    fn ancestor(this: &Rc<RefCell<Environment>>, distance: usize) -> Rc<RefCell<Environment>> {
        let mut env = Rc::clone(this);
        for _ in 0..distance {
            let next = match &env.borrow().enclosing {
                Some(enclosing) => Rc::clone(enclosing),
                None => break,
            };
            env = next;
        }
        env
    }

    pub fn get(this: &Rc<RefCell<Environment>>, name: &Token) -> Result<Value, RuntimeError> {
        let next = {
            let env = this.borrow();
            if let Some(slot) = env.values.get(&name.lexeme) {
                return match slot {
                    Slot::Value(value) => Ok(value.clone()),
                    Slot::Uninitialized => Err(RuntimeError::new(
                        name.clone(),
                        format!("Cannot access '{}' before initialization.", name.lexeme),
                    )),
                };
            }
            env.enclosing.clone()
        };
        match next {
            Some(enclosing) => Environment::get(&enclosing, name),
            None => Err(RuntimeError::new(
                name.clone(),
                format!("Undefined variable '{}'.", name.lexeme),
            )),
        }
    }

    pub fn get_at(this: &Rc<RefCell<Environment>>, distance: usize, name: &Token) -> Result<Value, RuntimeError> {
        let ancestor = Environment::ancestor(this, distance);
        let slot = {
            let env = ancestor.borrow();
            env.values.get(&name.lexeme).cloned()
        };
        match slot {
            Some(Slot::Value(value)) => Ok(value),
            Some(Slot::Uninitialized) => Err(RuntimeError::new(
                name.clone(),
                format!("Cannot access '{}' before initialization.", name.lexeme),
            )),
            None => Err(RuntimeError::new(
                name.clone(),
                format!("Undefined variable '{}'.", name.lexeme),
            )),
        }
    }

    pub fn assign(this: &Rc<RefCell<Environment>>, name: &Token, value: Value) -> Result<(), RuntimeError> {
        let enclosing = {
            let mut env = this.borrow_mut();
            if env.values.contains_key(&name.lexeme) {
                env.values.insert(name.lexeme.clone(), Slot::Value(value));
                return Ok(());
            }
            env.enclosing.clone()
        };
        match enclosing {
            Some(enclosing) => Environment::assign(&enclosing, name, value),
            None => Err(RuntimeError::new(
                name.clone(),
                format!("Undefined variable '{}'.", name.lexeme),
            )),
        }
    }

    pub fn assign_at(
        this: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<(), RuntimeError> {
        let ancestor = Environment::ancestor(this, distance);
        ancestor.borrow_mut().values.insert(name.lexeme.clone(), Slot::Value(value));
        Ok(())
    }
}
