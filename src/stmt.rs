use crate::expr::{Expr, FunctionExpr};
use crate::token::Token;

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: Token,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: Token,
    pub superclass: Option<Expr>, // always Expr::Variable
    pub methods: Vec<(Token, std::rc::Rc<FunctionExpr>)>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expression(Expr),
    Var(VarDecl),
    MultiVar(Vec<VarDecl>),
    Block(Vec<Stmt>),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    While(Expr, Box<Stmt>),
    For(Option<Box<Stmt>>, Option<Expr>, Option<Expr>, Box<Stmt>),
    Break(Token),
    Continue(Token),
    Return(Token, Option<Expr>),
    Function(Token, std::rc::Rc<FunctionExpr>),
    Class(ClassDecl),
}
