use std::rc::Rc;

use crate::error::{ParseError, Session};
use crate::expr::{Expr, FunctionExpr, NodeId};
use crate::stmt::{ClassDecl, Stmt, VarDecl};
use crate::token::{Kind, Token};

const MAX_ARGS: usize = 255;

/// Recursive-descent parser with panic-mode recovery. Precedence, lowest
/// to highest: comma, assignment, ternary, or, and, equality, comparison,
/// term, factor, unary, exponent, call, primary.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    loop_depth: usize,
    next_node_id: NodeId,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Parser {
        Parser { tokens, current: 0, loop_depth: 0, next_node_id: 0 }
    }

    pub fn parse(&mut self, session: &mut Session) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration(session) {
                statements.push(stmt);
            }
        }
        statements
    }

    fn node_id(&mut self) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        id
    }

    // --- token stream helpers -------------------------------------------------

    fn is_at_end(&self) -> bool {
        self.peek().kind == Kind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn check(&self, kind: Kind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn matches(&mut self, kinds: &[Kind]) -> bool {
        for kind in kinds {
            if self.check(*kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(&mut self, kind: Kind, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(self.peek().clone(), message))
        }
    }

    fn error(&self, token: Token, message: &str) -> ParseError {
        ParseError::new(token, message.to_string())
    }

    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == Kind::Semicolon {
                return;
            }
            match self.peek().kind {
                Kind::Class | Kind::Fn | Kind::Var | Kind::For | Kind::If | Kind::While | Kind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn is_function_decl_ahead(&self) -> bool {
        self.check(Kind::Fn) && matches!(self.tokens.get(self.current + 1), Some(t) if t.kind == Kind::Identifier)
    }

    // --- declarations ----------------------------------------------------------

    fn declaration(&mut self, session: &mut Session) -> Option<Stmt> {
        let result = if self.matches(&[Kind::Class]) {
            self.class_declaration()
        } else if self.is_function_decl_ahead() {
            self.advance();
            self.function_declaration("function")
        } else if self.matches(&[Kind::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(err) => {
                session.report(&err);
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(Kind::Identifier, "Expect class name.")?;

        let superclass = if self.matches(&[Kind::Less]) {
            let super_name = self.consume(Kind::Identifier, "Expect superclass name.")?;
            Some(Expr::Variable(self.node_id(), super_name))
        } else {
            None
        };

        self.consume(Kind::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        while !self.check(Kind::RightBrace) && !self.is_at_end() {
            let method_name = self.consume(Kind::Identifier, "Expect method name.")?;
            let func = self.function_body("method")?;
            methods.push((method_name, Rc::new(func)));
        }

        self.consume(Kind::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class(ClassDecl { name, superclass, methods }))
    }

    fn function_declaration(&mut self, kind: &str) -> Result<Stmt, ParseError> {
        let name = self.consume(Kind::Identifier, &format!("Expect {kind} name."))?;
        let func = self.function_body(kind)?;
        Ok(Stmt::Function(name, Rc::new(func)))
    }

    fn function_body(&mut self, kind: &str) -> Result<FunctionExpr, ParseError> {
        self.consume(Kind::LeftParen, &format!("Expect '(' after {kind} name."))?;
        let mut params = Vec::new();
        if !self.check(Kind::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    return Err(self.error(self.peek().clone(), "Can't have more than 255 parameters."));
                }
                params.push(self.consume(Kind::Identifier, "Expect parameter name.")?);
                if !self.matches(&[Kind::Comma]) {
                    break;
                }
            }
        }
        self.consume(Kind::RightParen, "Expect ')' after parameters.")?;
        self.consume(Kind::LeftBrace, &format!("Expect '{{' before {kind} body."))?;
        let body = self.block()?;
        Ok(FunctionExpr { params, body })
    }

    fn var_declaration(&mut self) -> Result<Stmt, ParseError> {
        let mut decls = vec![self.single_var_declaration()?];
        while self.matches(&[Kind::Comma]) {
            decls.push(self.single_var_declaration()?);
        }
        self.consume(Kind::Semicolon, "Expect ';' after variable declaration.")?;

        if decls.len() == 1 {
            Ok(Stmt::Var(decls.into_iter().next().unwrap()))
        } else {
            Ok(Stmt::MultiVar(decls))
        }
    }

    fn single_var_declaration(&mut self) -> Result<VarDecl, ParseError> {
        let name = self.consume(Kind::Identifier, "Expect variable name.")?;
        // Stop at `assignment`, not `expression` (`comma`): a comma here
        // separates declarations, not operands of the comma operator, so
        // `var a = 1, b = 2;` must not let `a`'s initializer swallow `, b = 2`.
        let initializer = if self.matches(&[Kind::Equal]) { Some(self.assignment()?) } else { None };
        Ok(VarDecl { name, initializer })
    }

    // --- statements --------------------------------------------------------------

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.matches(&[Kind::For]) {
            return self.for_statement();
        }
        if self.matches(&[Kind::If]) {
            return self.if_statement();
        }
        if self.matches(&[Kind::While]) {
            return self.while_statement();
        }
        if self.matches(&[Kind::Break]) {
            return self.break_statement();
        }
        if self.matches(&[Kind::Continue]) {
            return self.continue_statement();
        }
        if self.matches(&[Kind::Return]) {
            return self.return_statement();
        }
        if self.matches(&[Kind::LeftBrace]) {
            return Ok(Stmt::Block(self.block()?));
        }
        self.expression_statement()
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        while !self.check(Kind::RightBrace) && !self.is_at_end() {
            // A parse error inside a block must propagate rather than
            // synchronize mid-block (that would desync past the closing
            // brace this call is responsible for consuming).
            let stmt = if self.matches(&[Kind::Class]) {
                self.class_declaration()?
            } else if self.is_function_decl_ahead() {
                self.advance();
                self.function_declaration("function")?
            } else if self.matches(&[Kind::Var]) {
                self.var_declaration()?
            } else {
                self.statement()?
            };
            statements.push(stmt);
        }
        self.consume(Kind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(Kind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(Kind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[Kind::Else]) { Some(Box::new(self.statement()?)) } else { None };

        Ok(Stmt::If(condition, then_branch, else_branch))
    }

    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(Kind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(Kind::RightParen, "Expect ')' after condition.")?;

        self.loop_depth += 1;
        let body = self.statement();
        self.loop_depth -= 1;

        Ok(Stmt::While(condition, Box::new(body?)))
    }

    fn for_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(Kind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(&[Kind::Semicolon]) {
            None
        } else if self.matches(&[Kind::Var]) {
            Some(Box::new(self.var_declaration()?))
        } else {
            Some(Box::new(self.expression_statement()?))
        };

        let condition = if !self.check(Kind::Semicolon) { Some(self.expression()?) } else { None };
        self.consume(Kind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(Kind::RightParen) { Some(self.expression()?) } else { None };
        self.consume(Kind::RightParen, "Expect ')' after for clauses.")?;

        self.loop_depth += 1;
        let body = self.statement();
        self.loop_depth -= 1;

        let for_stmt = Stmt::For(initializer, condition, increment, Box::new(body?));
        // Wrapped in an outer block so `init`'s bindings scope to the loop alone.
        Ok(Stmt::Block(vec![for_stmt]))
    }

    fn break_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.previous().clone();
        if self.loop_depth == 0 {
            return Err(self.error(keyword, "Cannot break outside of a loop."));
        }
        self.consume(Kind::Semicolon, "Expect ';' after 'break'.")?;
        Ok(Stmt::Break(keyword))
    }

    fn continue_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.previous().clone();
        if self.loop_depth == 0 {
            return Err(self.error(keyword, "Cannot continue outside of a loop."));
        }
        self.consume(Kind::Semicolon, "Expect ';' after 'continue'.")?;
        Ok(Stmt::Continue(keyword))
    }

    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.previous().clone();
        let value = if !self.check(Kind::Semicolon) { Some(self.expression()?) } else { None };
        self.consume(Kind::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return(keyword, value))
    }

    fn expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression()?;
        self.consume(Kind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    // --- expressions, lowest to highest precedence --------------------------------

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.comma()
    }

    fn comma(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.assignment()?;
        while self.matches(&[Kind::Comma]) {
            let op = self.previous().clone();
            let right = self.assignment()?;
            expr = Expr::Comma(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.ternary()?;

        if self.matches(&[Kind::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable(_, name) => Ok(Expr::Assign(self.node_id(), name, Box::new(value))),
                Expr::Get(obj, name) => Ok(Expr::Set(obj, name, Box::new(value))),
                _ => Err(self.error(equals, "Invalid assignment target.")),
            };
        }

        if self.check_reserved_compound_assign() {
            let token = self.advance();
            return Err(self.error(token, "Expected expression."));
        }

        Ok(expr)
    }

    fn check_reserved_compound_assign(&self) -> bool {
        matches!(
            self.peek().kind,
            Kind::PlusEqual
                | Kind::MinusEqual
                | Kind::StarEqual
                | Kind::SlashEqual
                | Kind::PercentEqual
                | Kind::StarStarEqual
                | Kind::AmpEqual
                | Kind::PipeEqual
                | Kind::CaretEqual
                | Kind::LessLessEqual
                | Kind::GreaterGreaterEqual
        )
    }

    fn ternary(&mut self) -> Result<Expr, ParseError> {
        let cond = self.or()?;
        if self.matches(&[Kind::Question]) {
            let then_branch = self.ternary()?;
            self.consume(Kind::Colon, "Expect ':' after ternary then-branch.")?;
            let else_branch = self.ternary()?;
            return Ok(Expr::Ternary(Box::new(cond), Box::new(then_branch), Box::new(else_branch)));
        }
        Ok(cond)
    }

    fn or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.and()?;
        while self.matches(&[Kind::PipePipe]) {
            let op = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.equality()?;
        while self.matches(&[Kind::AmpAmp]) {
            let op = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.comparison()?;
        while self.matches(&[Kind::BangEqual, Kind::EqualEqual]) {
            let op = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.term()?;
        while self.matches(&[Kind::Greater, Kind::GreaterEqual, Kind::Less, Kind::LessEqual]) {
            let op = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.factor()?;
        while self.matches(&[Kind::Plus, Kind::Minus]) {
            let op = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;
        while self.matches(&[
            Kind::Star,
            Kind::Slash,
            Kind::Percent,
            Kind::Ampersand,
            Kind::Pipe,
            Kind::Caret,
            Kind::LessLess,
            Kind::GreaterGreater,
        ]) {
            let op = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.matches(&[Kind::Bang, Kind::Minus, Kind::Plus, Kind::PlusPlus, Kind::MinusMinus, Kind::Tilde]) {
            let op = self.previous().clone();
            let operand = self.unary()?;
            return Ok(Expr::Unary(op, Box::new(operand)));
        }
        self.exponent()
    }

    fn exponent(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.call()?;
        while self.matches(&[Kind::StarStar]) {
            let op = self.previous().clone();
            let right = self.call()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;

        loop {
            if self.matches(&[Kind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.matches(&[Kind::Dot]) {
                let name = self.consume(Kind::Identifier, "Expect property name after '.'.")?;
                expr = Expr::Get(Box::new(expr), name);
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let mut arguments = Vec::new();
        if !self.check(Kind::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    return Err(self.error(self.peek().clone(), "Can't have more than 255 arguments."));
                }
                arguments.push(self.assignment()?);
                if !self.matches(&[Kind::Comma]) {
                    break;
                }
            }
        }
        let paren = self.consume(Kind::RightParen, "Expect ')' after arguments.")?;
        Ok(Expr::Call(Box::new(callee), paren, arguments))
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        if self.matches(&[Kind::False]) {
            return Ok(Expr::Literal(crate::value::Literal::Bool(false)));
        }
        if self.matches(&[Kind::True]) {
            return Ok(Expr::Literal(crate::value::Literal::Bool(true)));
        }
        if self.matches(&[Kind::Nil]) {
            return Ok(Expr::Literal(crate::value::Literal::Nil));
        }
        if self.matches(&[Kind::Number, Kind::String]) {
            let literal = self.previous().literal.clone().expect("scanner always attaches a literal");
            return Ok(Expr::Literal(literal));
        }
        if self.matches(&[Kind::Super]) {
            let keyword = self.previous().clone();
            // `super.method` names a method; bare `super` is the
            // chain-constructor form and is left for `call()` to wrap in a
            // `Call` when it is immediately followed by `(args)`.
            let method = if self.matches(&[Kind::Dot]) {
                Some(self.consume(Kind::Identifier, "Expect superclass method name.")?)
            } else {
                None
            };
            return Ok(Expr::Super(self.node_id(), keyword, method));
        }
        if self.matches(&[Kind::This]) {
            return Ok(Expr::This(self.node_id(), self.previous().clone()));
        }
        if self.matches(&[Kind::Identifier]) {
            return Ok(Expr::Variable(self.node_id(), self.previous().clone()));
        }
        if self.matches(&[Kind::LeftParen]) {
            let expr = self.expression()?;
            self.consume(Kind::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }
        if self.matches(&[Kind::Fn]) {
            let func = self.function_body("function")?;
            return Ok(Expr::FunctionExpr(Rc::new(func)));
        }

        Err(self.error(self.peek().clone(), "Expect expression."))
    }
}
