use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::function::Function;
use crate::token::Token;
use crate::value::Value;

/// `{name, superclass?, methods}` — method lookup walks the superclass
/// chain, so a subclass need not repeat an inherited method.
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<RefCell<Class>>>,
    pub methods: HashMap<String, Rc<Function>>,
}

impl Class {
    pub fn new(name: String, superclass: Option<Rc<RefCell<Class>>>, methods: HashMap<String, Rc<Function>>) -> Self {
        Class { name, superclass, methods }
    }

    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }
        self.superclass.as_ref().and_then(|superclass| superclass.borrow().find_method(name))
    }

    /// A class's arity is its initializer's, or zero if it declares none.
    pub fn arity(&self) -> usize {
        self.find_method(&self.name).map(|init| init.arity()).unwrap_or(0)
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

/// `{class, fields}` — a property read first probes `fields`, then walks
/// the class's method chain and binds the result to this instance.
pub struct Instance {
    pub class: Rc<RefCell<Class>>,
    pub fields: HashMap<String, Value>,
}

impl Instance {
    pub fn new(class: Rc<RefCell<Class>>) -> Self {
        Instance { class, fields: HashMap::new() }
    }

    pub fn get(this: &Rc<RefCell<Instance>>, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = this.borrow().fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        let method = this.borrow().class.borrow().find_method(&name.lexeme);
        match method {
            Some(method) => Ok(Value::Function(Rc::new(method.bind(Value::Instance(Rc::clone(this)))))),
            None => Err(RuntimeError::new(name.clone(), format!("Undefined property '{}'.", name.lexeme))),
        }
    }

    pub fn set(this: &Rc<RefCell<Instance>>, name: &Token, value: Value) {
        this.borrow_mut().fields.insert(name.lexeme.clone(), value);
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<instance {}>", self.class.borrow().name)
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<instance {}>", self.class.borrow().name)
    }
}
