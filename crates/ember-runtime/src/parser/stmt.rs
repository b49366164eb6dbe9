//! Statement parsing

use crate::ast::*;
use crate::parser::Parser;
use crate::span::Span;
use crate::token::TokenKind;

impl Parser {
    /// Parse a statement
    pub(super) fn parse_statement(&mut self) -> Result<Stmt, ()> {
        match self.peek().kind {
            TokenKind::Let | TokenKind::Var => self.parse_var_decl(),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Break => self.parse_break_stmt(),
            TokenKind::Continue => self.parse_continue_stmt(),
            TokenKind::LeftBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Fn => Ok(Stmt::FunctionDecl(self.parse_function()?)),
            _ => self.parse_assign_or_expr_stmt(),
        }
    }

    /// Parse a variable declaration
    pub(super) fn parse_var_decl(&mut self) -> Result<Stmt, ()> {
        let keyword_span = self.peek().span;
        let mutable = self.advance().kind == TokenKind::Var;

        let name_token = self.consume_identifier("a variable name")?;
        let name = Identifier {
            name: name_token.lexeme.clone(),
            span: name_token.span,
        };

        self.consume(TokenKind::Equal, "Expected '=' in variable declaration")?;
        let init = self.parse_expression()?;
        let end_span = self.consume_terminator("Expected ';' after variable declaration")?;

        Ok(Stmt::VarDecl(VarDecl {
            mutable,
            name,
            init,
            span: keyword_span.merge(end_span),
        }))
    }

    /// Parse assignment or expression statement
    pub(super) fn parse_assign_or_expr_stmt(&mut self) -> Result<Stmt, ()> {
        let expr = self.parse_expression()?;
        let stmt = self.parse_statement_tail(expr)?;
        let end_span =
            self.consume_terminator(&format!("Expected ';' after {}", describe(&stmt)))?;

        Ok(with_span(stmt, end_span))
    }

    /// Finish an assignment-like statement once its leading expression is parsed
    ///
    /// Shared by statement position and the step clause of a `for` loop; the
    /// caller consumes any terminator.
    fn parse_statement_tail(&mut self, expr: Expr) -> Result<Stmt, ()> {
        let start_span = expr.span();

        match self.peek().kind {
            TokenKind::Equal => {
                self.advance();
                let target = self.expr_to_assign_target(expr)?;
                let value = self.parse_expression()?;
                Ok(Stmt::Assign(Assign {
                    target,
                    span: start_span.merge(value.span()),
                    value,
                }))
            }
            TokenKind::PlusEqual
            | TokenKind::MinusEqual
            | TokenKind::StarEqual
            | TokenKind::SlashEqual
            | TokenKind::PercentEqual => {
                let op = match self.advance().kind {
                    TokenKind::PlusEqual => CompoundOp::AddAssign,
                    TokenKind::MinusEqual => CompoundOp::SubAssign,
                    TokenKind::StarEqual => CompoundOp::MulAssign,
                    TokenKind::SlashEqual => CompoundOp::DivAssign,
                    _ => CompoundOp::ModAssign,
                };
                let target = self.expr_to_assign_target(expr)?;
                let value = self.parse_expression()?;
                Ok(Stmt::CompoundAssign(CompoundAssign {
                    target,
                    op,
                    span: start_span.merge(value.span()),
                    value,
                }))
            }
            TokenKind::PlusPlus => {
                let end = self.advance().span;
                let target = self.expr_to_assign_target(expr)?;
                Ok(Stmt::Increment(IncrementStmt {
                    target,
                    span: start_span.merge(end),
                }))
            }
            TokenKind::MinusMinus => {
                let end = self.advance().span;
                let target = self.expr_to_assign_target(expr)?;
                Ok(Stmt::Decrement(DecrementStmt {
                    target,
                    span: start_span.merge(end),
                }))
            }
            _ => Ok(Stmt::Expr(ExprStmt {
                expr,
                span: start_span,
            })),
        }
    }

    /// Convert an expression to an assignment target
    pub(super) fn expr_to_assign_target(&mut self, expr: Expr) -> Result<AssignTarget, ()> {
        match expr {
            Expr::Identifier(ident) => Ok(AssignTarget::Name(ident)),
            Expr::Index(idx) => Ok(AssignTarget::Index {
                target: idx.target,
                index: idx.index,
                span: idx.span,
            }),
            other => {
                self.error_at("Invalid assignment target", other.span());
                Err(())
            }
        }
    }

    /// Parse if statement; `else if` nests as a single-statement else block
    pub(super) fn parse_if_stmt(&mut self) -> Result<Stmt, ()> {
        let if_span = self.consume(TokenKind::If, "Expected 'if'")?.span;

        self.consume(TokenKind::LeftParen, "Expected '(' after 'if'")?;
        let cond = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after if condition")?;

        let then_block = self.parse_block()?;
        let then_span = then_block.span;

        let else_block = if self.match_token(TokenKind::Else) {
            if self.check(TokenKind::If) {
                let nested = self.parse_if_stmt()?;
                let span = nested.span();
                Some(Block {
                    statements: vec![nested],
                    span,
                })
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        let end_span = else_block.as_ref().map_or(then_span, |b| b.span);

        Ok(Stmt::If(IfStmt {
            cond,
            then_block,
            else_block,
            span: if_span.merge(end_span),
        }))
    }

    /// Parse while statement
    pub(super) fn parse_while_stmt(&mut self) -> Result<Stmt, ()> {
        let while_span = self.consume(TokenKind::While, "Expected 'while'")?.span;

        self.consume(TokenKind::LeftParen, "Expected '(' after 'while'")?;
        let cond = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after while condition")?;

        let body = self.parse_block()?;
        let body_span = body.span;

        Ok(Stmt::While(WhileStmt {
            cond,
            body,
            span: while_span.merge(body_span),
        }))
    }

    /// Parse `for (init; cond; step) { }` or `for name in iterable { }`
    pub(super) fn parse_for_stmt(&mut self) -> Result<Stmt, ()> {
        let for_span = self.consume(TokenKind::For, "Expected 'for'")?.span;

        if self.check(TokenKind::Identifier) {
            return self.parse_for_in_rest(for_span);
        }

        self.consume(TokenKind::LeftParen, "Expected '(' after 'for'")?;

        let init = if self.check(TokenKind::Let) || self.check(TokenKind::Var) {
            Box::new(self.parse_var_decl()?)
        } else if self.check(TokenKind::Semicolon) {
            self.advance();
            Box::new(empty_stmt())
        } else {
            Box::new(self.parse_assign_or_expr_stmt()?)
        };

        let cond = if !self.check(TokenKind::Semicolon) {
            self.parse_expression()?
        } else {
            Expr::Literal(Literal::Bool(true), Span::dummy())
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after for condition")?;

        let step = if !self.check(TokenKind::RightParen) {
            let expr = self.parse_expression()?;
            Box::new(self.parse_statement_tail(expr)?)
        } else {
            Box::new(empty_stmt())
        };
        self.consume(TokenKind::RightParen, "Expected ')' after for clauses")?;

        let body = self.parse_block()?;
        let body_span = body.span;

        Ok(Stmt::For(ForStmt {
            init,
            cond,
            step,
            body,
            span: for_span.merge(body_span),
        }))
    }

    fn parse_for_in_rest(&mut self, for_span: Span) -> Result<Stmt, ()> {
        let var_token = self.consume_identifier("a loop variable name")?;
        let variable = Identifier {
            name: var_token.lexeme.clone(),
            span: var_token.span,
        };

        self.consume(TokenKind::In, "Expected 'in' after loop variable")?;
        let iterable = self.parse_expression()?;

        let body = self.parse_block()?;
        let body_span = body.span;

        Ok(Stmt::ForIn(ForInStmt {
            variable,
            iterable: Box::new(iterable),
            body,
            span: for_span.merge(body_span),
        }))
    }

    /// Parse return statement
    pub(super) fn parse_return_stmt(&mut self) -> Result<Stmt, ()> {
        let return_span = self.consume(TokenKind::Return, "Expected 'return'")?.span;

        let value = if !self.check(TokenKind::Semicolon) && !self.is_at_end() {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let end_span = self.consume_terminator("Expected ';' after return")?;

        Ok(Stmt::Return(ReturnStmt {
            value,
            span: return_span.merge(end_span),
        }))
    }

    /// Parse break statement
    pub(super) fn parse_break_stmt(&mut self) -> Result<Stmt, ()> {
        let break_span = self.consume(TokenKind::Break, "Expected 'break'")?.span;
        let end_span = self.consume_terminator("Expected ';' after break")?;
        Ok(Stmt::Break(break_span.merge(end_span)))
    }

    /// Parse continue statement
    pub(super) fn parse_continue_stmt(&mut self) -> Result<Stmt, ()> {
        let continue_span = self
            .consume(TokenKind::Continue, "Expected 'continue'")?
            .span;
        let end_span = self.consume_terminator("Expected ';' after continue")?;
        Ok(Stmt::Continue(continue_span.merge(end_span)))
    }

    /// Parse a block
    pub(super) fn parse_block(&mut self) -> Result<Block, ()> {
        let start_span = self.consume(TokenKind::LeftBrace, "Expected '{'")?.span;
        let mut statements = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(_) => self.synchronize(),
            }
        }

        let end_span = self.consume(TokenKind::RightBrace, "Expected '}'")?.span;

        Ok(Block {
            statements,
            span: start_span.merge(end_span),
        })
    }
}

fn empty_stmt() -> Stmt {
    Stmt::Expr(ExprStmt {
        expr: Expr::Literal(Literal::Null, Span::dummy()),
        span: Span::dummy(),
    })
}

fn describe(stmt: &Stmt) -> &'static str {
    match stmt {
        Stmt::Assign(_) => "assignment",
        Stmt::CompoundAssign(_) => "compound assignment",
        Stmt::Increment(_) => "increment",
        Stmt::Decrement(_) => "decrement",
        _ => "expression",
    }
}

/// Extend a statement's span to cover its terminator
fn with_span(stmt: Stmt, end: Span) -> Stmt {
    match stmt {
        Stmt::Assign(mut s) => {
            s.span = s.span.merge(end);
            Stmt::Assign(s)
        }
        Stmt::CompoundAssign(mut s) => {
            s.span = s.span.merge(end);
            Stmt::CompoundAssign(s)
        }
        Stmt::Increment(mut s) => {
            s.span = s.span.merge(end);
            Stmt::Increment(s)
        }
        Stmt::Decrement(mut s) => {
            s.span = s.span.merge(end);
            Stmt::Decrement(s)
        }
        Stmt::Expr(mut s) => {
            s.span = s.span.merge(end);
            Stmt::Expr(s)
        }
        other => other,
    }
}
