// ABOUTME: Hand-written recursive-descent parser over the lexer's token stream

use crate::ast::{CmpOp, ConstructKind, Ctx, Expr, IncDecOp, Operator, Stmt};
use crate::error::{syntax_error, CocktailError};
use crate::token::{Token, TokenKind};
use crate::value::{Arg, Arguments, BuiltinKind, Value};

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

/// Parses a complete token stream (as produced by `lexer::tokenize`,
/// terminated by `Eof`) into a module's statement list.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Stmt>, CocktailError> {
    let mut parser = Parser { tokens, pos: 0 };
    let mut stmts = Vec::new();
    while !parser.check(TokenKind::Eof) {
        stmts.push(parser.parse_statement()?);
    }
    Ok(stmts)
}

fn builtin_kind(name: &str) -> Option<BuiltinKind> {
    match name {
        "print" => Some(BuiltinKind::Print),
        "input" => Some(BuiltinKind::Input),
        "length" => Some(BuiltinKind::Length),
        "match" => Some(BuiltinKind::Match),
        "repr" => Some(BuiltinKind::Repr),
        "exit" | "quit" => Some(BuiltinKind::Exit),
        _ => None,
    }
}

fn construct_kind(name: &str) -> Option<ConstructKind> {
    match name {
        "Boolean" => Some(ConstructKind::Boolean),
        "Number" => Some(ConstructKind::Number),
        "String" => Some(ConstructKind::String),
        "Tuple" => Some(ConstructKind::Tuple),
        "List" => Some(ConstructKind::List),
        _ => None,
    }
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn match_tok(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, CocktailError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.syntax_error_here())
        }
    }

    fn syntax_error_here(&self) -> CocktailError {
        let token = self.peek().clone();
        syntax_error(token.info.clone(), Some(token), "invalid syntax")
    }

    fn expect_name(&mut self) -> Result<String, CocktailError> {
        if self.check(TokenKind::Name) {
            Ok(self.advance().lexeme)
        } else {
            Err(self.syntax_error_here())
        }
    }

    // ----- Statements ----- //

    fn parse_statement(&mut self) -> Result<Stmt, CocktailError> {
        match self.peek().kind {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Func => self.parse_function_def(),
            TokenKind::Break => {
                let token = self.advance();
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Break(token))
            }
            TokenKind::Continue => {
                let token = self.advance();
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Continue(token))
            }
            TokenKind::Return => {
                let token = self.advance();
                let value = if self.check(TokenKind::Semi) { None } else { Some(self.parse_expr()?) };
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Return(value, token))
            }
            TokenKind::Global => {
                let token = self.advance();
                let names = self.parse_name_list()?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Global(names, token))
            }
            TokenKind::Nonlocal => {
                let token = self.advance();
                let names = self.parse_name_list()?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Nonlocal(names, token))
            }
            _ => {
                let stmt = self.parse_bare_simple_stmt()?;
                self.expect(TokenKind::Semi)?;
                Ok(stmt)
            }
        }
    }

    fn parse_name_list(&mut self) -> Result<Vec<String>, CocktailError> {
        let mut names = vec![self.expect_name()?];
        while self.match_tok(TokenKind::Comma) {
            names.push(self.expect_name()?);
        }
        Ok(names)
    }

    fn parse_paren_expr(&mut self) -> Result<Expr, CocktailError> {
        self.expect(TokenKind::LPar)?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::RPar)?;
        Ok(expr)
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, CocktailError> {
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) {
            stmts.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_if(&mut self) -> Result<Stmt, CocktailError> {
        let token = self.advance();
        let mut branches = Vec::new();
        let cond = self.parse_paren_expr()?;
        let body = self.parse_block()?;
        branches.push((cond, body));
        while self.check(TokenKind::Elif) {
            self.advance();
            let cond = self.parse_paren_expr()?;
            let body = self.parse_block()?;
            branches.push((cond, body));
        }
        let orelse = if self.match_tok(TokenKind::Else) { self.parse_block()? } else { Vec::new() };
        Ok(Stmt::If { branches, orelse, token })
    }

    fn parse_while(&mut self) -> Result<Stmt, CocktailError> {
        let token = self.advance();
        let cond = self.parse_paren_expr()?;
        let body = self.parse_block()?;
        let orelse = if self.match_tok(TokenKind::Else) { self.parse_block()? } else { Vec::new() };
        Ok(Stmt::While { cond, body, orelse, token })
    }

    fn parse_for(&mut self) -> Result<Stmt, CocktailError> {
        let token = self.advance();
        self.expect(TokenKind::LPar)?;

        if self.check(TokenKind::Name) && self.peek_at(1).kind == TokenKind::Of {
            let target = self.expect_name()?;
            self.expect(TokenKind::Of)?;
            let iter = self.parse_expr()?;
            self.expect(TokenKind::RPar)?;
            let body = self.parse_block()?;
            let orelse = if self.match_tok(TokenKind::Else) { self.parse_block()? } else { Vec::new() };
            return Ok(Stmt::ForOf { target, iter, body, orelse, token });
        }

        let init = if self.check(TokenKind::Semi) { None } else { Some(Box::new(self.parse_bare_simple_stmt()?)) };
        self.expect(TokenKind::Semi)?;
        let cond = if self.check(TokenKind::Semi) { None } else { Some(self.parse_expr()?) };
        self.expect(TokenKind::Semi)?;
        let step = if self.check(TokenKind::RPar) { None } else { Some(Box::new(self.parse_bare_simple_stmt()?)) };
        self.expect(TokenKind::RPar)?;
        let body = self.parse_block()?;
        let orelse = if self.match_tok(TokenKind::Else) { self.parse_block()? } else { Vec::new() };
        Ok(Stmt::For { init, cond, step, body, orelse, token })
    }

    fn parse_function_def(&mut self) -> Result<Stmt, CocktailError> {
        let token = self.advance();
        let name = self.expect_name()?;
        self.expect(TokenKind::LPar)?;
        let args = self.parse_params(&token)?;
        self.expect(TokenKind::RPar)?;
        let body = self.parse_block()?;
        Ok(Stmt::FunctionDef { name, args, body, token })
    }

    /// Position-only (before `/`), positional, `*`-marked keyword-only
    /// section, `*name` vararg, `**name` kwarg, each optionally
    /// defaulted. Rejects duplicate parameter names per §3's
    /// invariant.
    fn parse_params(&mut self, def_token: &Token) -> Result<Arguments, CocktailError> {
        let mut posonly = Vec::new();
        let mut args = Vec::new();
        let mut kwonly = Vec::new();
        let mut vararg = None;
        let mut kwarg = None;
        let mut in_kwonly = false;

        while !self.check(TokenKind::RPar) {
            if self.check(TokenKind::Slash) {
                self.advance();
                posonly.append(&mut args);
                if !self.match_tok(TokenKind::Comma) {
                    break;
                }
                continue;
            }
            if self.check(TokenKind::DoubleStar) {
                self.advance();
                let name = self.expect_name()?;
                kwarg = Some(Arg::new(name));
                self.match_tok(TokenKind::Comma);
                break;
            }
            if self.check(TokenKind::Star) {
                self.advance();
                if self.check(TokenKind::Name) {
                    let name = self.expect_name()?;
                    vararg = Some(Arg::new(name));
                }
                in_kwonly = true;
                if !self.match_tok(TokenKind::Comma) {
                    break;
                }
                continue;
            }

            let name = self.expect_name()?;
            let default = if self.match_tok(TokenKind::Equal) { Some(self.parse_expr()?) } else { None };
            if in_kwonly || vararg.is_some() {
                kwonly.push((Arg::new(name), default));
            } else {
                args.push((Arg::new(name), default));
            }
            if !self.match_tok(TokenKind::Comma) {
                break;
            }
        }

        let result = Arguments { posonly, args, vararg, kwonly, kwarg };
        let mut seen: Vec<&str> = Vec::new();
        for name in result.all_names() {
            if seen.contains(&name) {
                return Err(syntax_error(
                    def_token.info.clone(),
                    Some(def_token.clone()),
                    format!("duplicate argument '{}' in function definition", name),
                ));
            }
            seen.push(name);
        }
        Ok(result)
    }

    /// An assignment target, augmented-assignment target, or plain
    /// expression, without consuming a trailing `;` — shared by
    /// top-level expression statements and `for (init; cond; step)`
    /// clauses.
    fn parse_bare_simple_stmt(&mut self) -> Result<Stmt, CocktailError> {
        let token = self.peek().clone();
        let expr = self.parse_expr()?;

        if self.match_tok(TokenKind::Equal) {
            let value = self.parse_expr()?;
            let target = self.require_assignable(expr)?;
            return Ok(Stmt::Assign { target, value, token });
        }

        if let Some(op) = self.aug_assign_op() {
            self.advance();
            let value = self.parse_expr()?;
            let target = self.require_assignable(expr)?;
            return Ok(Stmt::AugAssign { target, op, value, token });
        }

        Ok(Stmt::ExprStmt(expr))
    }

    fn aug_assign_op(&self) -> Option<Operator> {
        match self.peek().kind {
            TokenKind::PlusEqual => Some(Operator::Add),
            TokenKind::MinusEqual => Some(Operator::Sub),
            TokenKind::StarEqual => Some(Operator::Mult),
            TokenKind::SlashEqual => Some(Operator::Div),
            TokenKind::DoubleSlashEqual => Some(Operator::FloorDiv),
            TokenKind::PercentEqual => Some(Operator::Mod),
            TokenKind::DoubleStarEqual => Some(Operator::Pow),
            TokenKind::LeftShiftEqual => Some(Operator::LShift),
            TokenKind::RightShiftEqual => Some(Operator::RShift),
            TokenKind::AmperEqual => Some(Operator::BitAnd),
            TokenKind::CircumflexEqual => Some(Operator::BitXor),
            TokenKind::VbarEqual => Some(Operator::BitOr),
            _ => None,
        }
    }

    /// Only a bare name is assignable. `true`/`false`/`none` parse as
    /// `Constant`, never `Name`, so this single check realizes the
    /// reserved-constant guard from §4.2 for free.
    fn require_assignable(&self, expr: Expr) -> Result<Expr, CocktailError> {
        match expr {
            Expr::Name { id, token, .. } => Ok(Expr::Name { id, ctx: Ctx::Store, token }),
            Expr::Constant(Value::Bool(_), token) | Expr::Constant(Value::None, token) => Err(syntax_error(
                token.info.clone(),
                Some(token.clone()),
                format!("cannot assign to reserved constant '{}'", token.lexeme),
            )),
            other => Err(syntax_error(other.token().info.clone(), Some(other.token().clone()), "cannot assign to this expression")),
        }
    }

    // ----- Expressions (precedence climbing, §4.2's table) ----- //

    fn parse_expr(&mut self) -> Result<Expr, CocktailError> {
        self.parse_not()
    }

    fn parse_not(&mut self) -> Result<Expr, CocktailError> {
        if self.check(TokenKind::Not) {
            let token = self.advance();
            let operand = self.parse_not()?;
            return Ok(Expr::UnaryOp { op: crate::ast::UnaryOperator::Not, operand: Box::new(operand), token });
        }
        self.parse_comparison()
    }

    fn try_consume_cmp_op(&mut self) -> Option<CmpOp> {
        match self.peek().kind {
            TokenKind::Less => {
                self.advance();
                Some(CmpOp::Lt)
            }
            TokenKind::LessEqual => {
                self.advance();
                Some(CmpOp::LtE)
            }
            TokenKind::EqEqual => {
                self.advance();
                Some(CmpOp::Eq)
            }
            TokenKind::NotEqual => {
                self.advance();
                Some(CmpOp::NotEq)
            }
            TokenKind::Greater => {
                self.advance();
                Some(CmpOp::Gt)
            }
            TokenKind::GreaterEqual => {
                self.advance();
                Some(CmpOp::GtE)
            }
            TokenKind::EqEqEqual => {
                self.advance();
                Some(CmpOp::Is)
            }
            TokenKind::NotEqEqEqual => {
                self.advance();
                Some(CmpOp::IsNot)
            }
            TokenKind::In => {
                self.advance();
                Some(CmpOp::In)
            }
            TokenKind::Not if self.peek_at(1).kind == TokenKind::In => {
                self.advance();
                self.advance();
                Some(CmpOp::NotIn)
            }
            _ => None,
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, CocktailError> {
        let left = self.parse_bitor()?;
        let token = left.token().clone();
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        while let Some(op) = self.try_consume_cmp_op() {
            ops.push(op);
            comparators.push(self.parse_bitor()?);
        }
        if ops.is_empty() {
            Ok(left)
        } else {
            Ok(Expr::Compare { left: Box::new(left), ops, comparators, token })
        }
    }

    fn parse_bitor(&mut self) -> Result<Expr, CocktailError> {
        let mut left = self.parse_bitxor()?;
        while self.check(TokenKind::Vbar) {
            let token = self.advance();
            let right = self.parse_bitxor()?;
            left = Expr::BinOp { left: Box::new(left), op: Operator::BitOr, right: Box::new(right), token };
        }
        Ok(left)
    }

    fn parse_bitxor(&mut self) -> Result<Expr, CocktailError> {
        let mut left = self.parse_bitand()?;
        while self.check(TokenKind::Circumflex) {
            let token = self.advance();
            let right = self.parse_bitand()?;
            left = Expr::BinOp { left: Box::new(left), op: Operator::BitXor, right: Box::new(right), token };
        }
        Ok(left)
    }

    fn parse_bitand(&mut self) -> Result<Expr, CocktailError> {
        let mut left = self.parse_addsub()?;
        while self.check(TokenKind::Amper) {
            let token = self.advance();
            let right = self.parse_addsub()?;
            left = Expr::BinOp { left: Box::new(left), op: Operator::BitAnd, right: Box::new(right), token };
        }
        Ok(left)
    }

    fn parse_addsub(&mut self) -> Result<Expr, CocktailError> {
        let mut left = self.parse_shift()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => Operator::Add,
                TokenKind::Minus => Operator::Sub,
                _ => break,
            };
            let token = self.advance();
            let right = self.parse_shift()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), token };
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> Result<Expr, CocktailError> {
        let mut left = self.parse_muldiv()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::LeftShift => Operator::LShift,
                TokenKind::RightShift => Operator::RShift,
                _ => break,
            };
            let token = self.advance();
            let right = self.parse_muldiv()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), token };
        }
        Ok(left)
    }

    fn parse_muldiv(&mut self) -> Result<Expr, CocktailError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => Operator::Mult,
                TokenKind::Slash => Operator::Div,
                TokenKind::DoubleSlash => Operator::FloorDiv,
                TokenKind::Percent => Operator::Mod,
                _ => break,
            };
            let token = self.advance();
            let right = self.parse_unary()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), token };
        }
        Ok(left)
    }

    /// Prefix `~ + -` (lower precedence than `**`, so `-2 ** 2` is
    /// `-(2 ** 2)`) and prefix `++`/`--`, which — like their postfix
    /// counterparts — are only ever defined for a bare name target.
    fn parse_unary(&mut self) -> Result<Expr, CocktailError> {
        let op = match self.peek().kind {
            TokenKind::Tilde => Some(crate::ast::UnaryOperator::Invert),
            TokenKind::Plus => Some(crate::ast::UnaryOperator::UAdd),
            TokenKind::Minus => Some(crate::ast::UnaryOperator::USub),
            _ => None,
        };
        if let Some(op) = op {
            let token = self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::UnaryOp { op, operand: Box::new(operand), token });
        }

        if self.check(TokenKind::PlusPlus) || self.check(TokenKind::MinusMinus) {
            let is_inc = self.check(TokenKind::PlusPlus);
            let token = self.advance();
            let target = self.expect_inc_dec_target(&token)?;
            let op = if is_inc { IncDecOp::PreIncrement } else { IncDecOp::PreDecrement };
            return Ok(Expr::InplaceUnaryOp { op, target, token });
        }

        self.parse_power()
    }

    fn expect_inc_dec_target(&mut self, op_token: &Token) -> Result<String, CocktailError> {
        match self.peek().kind {
            TokenKind::Name => Ok(self.advance().lexeme),
            TokenKind::True | TokenKind::False | TokenKind::None_ => {
                let bad = self.advance();
                Err(syntax_error(
                    bad.info.clone(),
                    Some(bad.clone()),
                    format!("cannot increment or decrement reserved constant '{}'", bad.lexeme),
                ))
            }
            _ => Err(syntax_error(op_token.info.clone(), Some(op_token.clone()), "invalid syntax")),
        }
    }

    /// `**`, left-associative per the reference grammar's
    /// `('left', ['DOUBLESTAR'])` precedence declaration: `2 ** 3 ** 2`
    /// parses as `(2 ** 3) ** 2`, not Python's right-associative nesting.
    fn parse_power(&mut self) -> Result<Expr, CocktailError> {
        let mut left = self.parse_postfix()?;
        while self.check(TokenKind::DoubleStar) {
            let token = self.advance();
            let right = self.parse_power_rhs()?;
            left = Expr::BinOp { left: Box::new(left), op: Operator::Pow, right: Box::new(right), token };
        }
        Ok(left)
    }

    /// The right operand of `**`: allows a unary prefix so `2 ** -1`
    /// still parses, without recursing back into `parse_power` itself —
    /// that chaining is already handled by the enclosing `while` loop,
    /// which is what keeps `**` left-associative.
    fn parse_power_rhs(&mut self) -> Result<Expr, CocktailError> {
        let op = match self.peek().kind {
            TokenKind::Tilde => Some(crate::ast::UnaryOperator::Invert),
            TokenKind::Plus => Some(crate::ast::UnaryOperator::UAdd),
            TokenKind::Minus => Some(crate::ast::UnaryOperator::USub),
            _ => None,
        };
        if let Some(op) = op {
            let token = self.advance();
            let operand = self.parse_power_rhs()?;
            return Ok(Expr::UnaryOp { op, operand: Box::new(operand), token });
        }

        if self.check(TokenKind::PlusPlus) || self.check(TokenKind::MinusMinus) {
            let is_inc = self.check(TokenKind::PlusPlus);
            let token = self.advance();
            let target = self.expect_inc_dec_target(&token)?;
            let op = if is_inc { IncDecOp::PreIncrement } else { IncDecOp::PreDecrement };
            return Ok(Expr::InplaceUnaryOp { op, target, token });
        }

        self.parse_postfix()
    }

    /// Trailing `[index]` / `[a:b:c]`, call parens (recognizing
    /// built-in/constructor names), and postfix `++`/`--`.
    fn parse_postfix(&mut self) -> Result<Expr, CocktailError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.check(TokenKind::LSqb) {
                expr = self.parse_subscript(expr)?;
            } else if self.check(TokenKind::LPar) {
                expr = self.parse_call(expr)?;
            } else if self.check(TokenKind::PlusPlus) || self.check(TokenKind::MinusMinus) {
                let is_inc = self.check(TokenKind::PlusPlus);
                let token = self.advance();
                let target = match &expr {
                    Expr::Name { id, .. } => id.clone(),
                    Expr::Constant(Value::Bool(_), tok) | Expr::Constant(Value::None, tok) => {
                        return Err(syntax_error(
                            tok.info.clone(),
                            Some(tok.clone()),
                            format!("cannot increment or decrement reserved constant '{}'", tok.lexeme),
                        ))
                    }
                    other => return Err(syntax_error(other.token().info.clone(), Some(other.token().clone()), "invalid syntax")),
                };
                let op = if is_inc { IncDecOp::PostIncrement } else { IncDecOp::PostDecrement };
                expr = Expr::InplaceUnaryOp { op, target, token };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_subscript(&mut self, value: Expr) -> Result<Expr, CocktailError> {
        let token = self.advance();
        let start = if self.check(TokenKind::Colon) { None } else { Some(Box::new(self.parse_expr()?)) };

        if self.match_tok(TokenKind::Colon) {
            let stop = if self.check(TokenKind::Colon) || self.check(TokenKind::RSqb) {
                None
            } else {
                Some(Box::new(self.parse_expr()?))
            };
            let step = if self.match_tok(TokenKind::Colon) {
                if self.check(TokenKind::RSqb) { None } else { Some(Box::new(self.parse_expr()?)) }
            } else {
                None
            };
            self.expect(TokenKind::RSqb)?;
            let slice = Expr::SliceExpr { start, stop, step, token: token.clone() };
            Ok(Expr::GetItem { value: Box::new(value), index: Box::new(slice), token })
        } else {
            self.expect(TokenKind::RSqb)?;
            let index = start.ok_or_else(|| syntax_error(token.info.clone(), Some(token.clone()), "invalid syntax"))?;
            Ok(Expr::GetItem { value: Box::new(value), index, token })
        }
    }

    fn parse_call(&mut self, callee: Expr) -> Result<Expr, CocktailError> {
        let token = self.advance();
        let mut args = Vec::new();
        if !self.check(TokenKind::RPar) {
            args.push(self.parse_expr()?);
            while self.match_tok(TokenKind::Comma) {
                if self.check(TokenKind::RPar) {
                    break;
                }
                args.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RPar)?;

        if let Expr::Name { id, .. } = &callee {
            if let Some(kind) = builtin_kind(id) {
                return Ok(Expr::BuiltinCall { kind, args, token });
            }
            if let Some(kind) = construct_kind(id) {
                if args.len() > 1 {
                    return Err(syntax_error(token.info.clone(), Some(token.clone()), format!("{}() takes at most 1 argument", id)));
                }
                let arg = args.into_iter().next().map(Box::new);
                return Ok(Expr::Construct { kind, arg, token });
            }
        }

        Ok(Expr::Call { func: Box::new(callee), args, token })
    }

    fn parse_primary(&mut self) -> Result<Expr, CocktailError> {
        match self.peek().kind {
            TokenKind::Number => {
                let token = self.advance();
                let n: f64 = token
                    .lexeme
                    .parse()
                    .map_err(|_| syntax_error(token.info.clone(), Some(token.clone()), "invalid syntax"))?;
                let mut expr = Expr::Constant(Value::Num(n), token.clone());
                // `NUMBER NAME` / `NUMBER (expr)` sugar for implicit multiplication.
                while self.check(TokenKind::Name) || self.check(TokenKind::LPar) {
                    let rhs = self.parse_postfix()?;
                    expr = Expr::BinOp { left: Box::new(expr), op: Operator::Mult, right: Box::new(rhs), token: token.clone() };
                }
                Ok(expr)
            }
            TokenKind::String => {
                let token = self.advance();
                let value = string_literal_value(&token.lexeme);
                Ok(Expr::Constant(Value::Str(value), token))
            }
            TokenKind::True => {
                let token = self.advance();
                Ok(Expr::Constant(Value::Bool(true), token))
            }
            TokenKind::False => {
                let token = self.advance();
                Ok(Expr::Constant(Value::Bool(false), token))
            }
            TokenKind::None_ => {
                let token = self.advance();
                Ok(Expr::Constant(Value::None, token))
            }
            TokenKind::Name => {
                let token = self.advance();
                Ok(Expr::Name { id: token.lexeme.clone(), ctx: Ctx::Load, token })
            }
            TokenKind::LPar => self.parse_paren_or_tuple(),
            TokenKind::LSqb => self.parse_list_literal(),
            _ => Err(self.syntax_error_here()),
        }
    }

    fn parse_paren_or_tuple(&mut self) -> Result<Expr, CocktailError> {
        let token = self.advance();
        if self.match_tok(TokenKind::RPar) {
            return Ok(Expr::TupleLit(Vec::new(), token));
        }
        let first = self.parse_expr()?;
        if self.check(TokenKind::Comma) {
            let mut items = vec![first];
            while self.match_tok(TokenKind::Comma) {
                if self.check(TokenKind::RPar) {
                    break;
                }
                items.push(self.parse_expr()?);
            }
            self.expect(TokenKind::RPar)?;
            Ok(Expr::TupleLit(items, token))
        } else {
            self.expect(TokenKind::RPar)?;
            Ok(first)
        }
    }

    fn parse_list_literal(&mut self) -> Result<Expr, CocktailError> {
        let token = self.advance();
        let mut items = Vec::new();
        if !self.check(TokenKind::RSqb) {
            items.push(self.parse_expr()?);
            while self.match_tok(TokenKind::Comma) {
                if self.check(TokenKind::RSqb) {
                    break;
                }
                items.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RSqb)?;
        Ok(Expr::ListLit(items, token))
    }
}

/// A leading `R`/`r` marks a raw string per §4.1: the quoted body is
/// taken verbatim, with no backslash-escape processing at all.
fn string_literal_value(lexeme: &str) -> String {
    match lexeme.as_bytes().first() {
        Some(b'R') | Some(b'r') => lexeme[2..lexeme.len() - 1].to_string(),
        _ => unescape_string(lexeme),
    }
}

/// Processes the backslash escapes the lexer's STRING pattern allows
/// through unexamined (`\.` inside the quoted body). Unrecognized
/// escapes keep their backslash, matching a permissive host language.
fn unescape_string(lexeme: &str) -> String {
    let inner = &lexeme[1..lexeme.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;
    use crate::module_info::ModuleInfo;

    fn parse_src(src: &str) -> Result<Vec<Stmt>, CocktailError> {
        let info = ModuleInfo::unknown(src);
        let tokens = lexer::tokenize(info)?;
        parse(tokens)
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let stmts = parse_src("x = 1 + 2 * 3;").unwrap();
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Stmt::Assign { value: Expr::BinOp { op: Operator::Add, right, .. }, .. } => {
                assert!(matches!(**right, Expr::BinOp { op: Operator::Mult, .. }));
            }
            other => panic!("unexpected stmt: {:?}", other),
        }
    }

    #[test]
    fn power_binds_tighter_than_unary_minus() {
        let stmts = parse_src("x = -2 ** 2;").unwrap();
        match &stmts[0] {
            Stmt::Assign { value: Expr::UnaryOp { operand, .. }, .. } => {
                assert!(matches!(**operand, Expr::BinOp { op: Operator::Pow, .. }));
            }
            other => panic!("unexpected stmt: {:?}", other),
        }
    }

    #[test]
    fn power_is_left_associative() {
        let stmts = parse_src("x = 2 ** 3 ** 2;").unwrap();
        match &stmts[0] {
            Stmt::Assign { value: Expr::BinOp { op: Operator::Pow, left, right, .. }, .. } => {
                assert!(matches!(**right, Expr::Constant(Value::Num(n), _) if n == 2.0));
                assert!(matches!(**left, Expr::BinOp { op: Operator::Pow, .. }));
            }
            other => panic!("unexpected stmt: {:?}", other),
        }
    }

    #[test]
    fn power_right_operand_allows_unary_minus() {
        let stmts = parse_src("x = 2 ** -1;").unwrap();
        match &stmts[0] {
            Stmt::Assign { value: Expr::BinOp { op: Operator::Pow, right, .. }, .. } => {
                assert!(matches!(**right, Expr::UnaryOp { op: crate::ast::UnaryOperator::USub, .. }));
            }
            other => panic!("unexpected stmt: {:?}", other),
        }
    }

    #[test]
    fn reserved_constant_assignment_is_syntax_error() {
        assert!(parse_src("true = 1;").is_err());
        assert!(parse_src("none += 1;").is_err());
        assert!(parse_src("++false;").is_err());
    }

    #[test]
    fn duplicate_parameter_name_is_rejected() {
        assert!(parse_src("func f(a, a) { return a; }").is_err());
    }

    #[test]
    fn builtin_call_recognized_in_expression_position() {
        let stmts = parse_src("x = length([1, 2, 3]) + 1;").unwrap();
        match &stmts[0] {
            Stmt::Assign { value: Expr::BinOp { left, .. }, .. } => {
                assert!(matches!(**left, Expr::BuiltinCall { .. }));
            }
            other => panic!("unexpected stmt: {:?}", other),
        }
    }

    #[test]
    fn slice_with_elided_components_parses() {
        let stmts = parse_src("x = xs[:5];").unwrap();
        match &stmts[0] {
            Stmt::Assign { value: Expr::GetItem { index, .. }, .. } => {
                assert!(matches!(**index, Expr::SliceExpr { .. }));
            }
            other => panic!("unexpected stmt: {:?}", other),
        }
    }

    #[test]
    fn chained_comparison_single_node() {
        let stmts = parse_src("x = 1 < 2 < 3;").unwrap();
        match &stmts[0] {
            Stmt::Assign { value: Expr::Compare { ops, comparators, .. }, .. } => {
                assert_eq!(ops.len(), 2);
                assert_eq!(comparators.len(), 2);
            }
            other => panic!("unexpected stmt: {:?}", other),
        }
    }

    #[test]
    fn for_of_loop_parses() {
        let stmts = parse_src("for (x of xs) { print(x); }").unwrap();
        assert!(matches!(stmts[0], Stmt::ForOf { .. }));
    }

    #[test]
    fn c_style_for_loop_parses() {
        let stmts = parse_src("for (i = 0; i < 10; i++) { print(i); }").unwrap();
        assert!(matches!(stmts[0], Stmt::For { .. }));
    }

    #[test]
    fn raw_string_prefix_disables_escape_processing() {
        let stmts = parse_src(r#"x = r"a\nb";"#).unwrap();
        match &stmts[0] {
            Stmt::Assign { value: Expr::Constant(Value::Str(s), _), .. } => assert_eq!(s, r"a\nb"),
            other => panic!("unexpected stmt: {:?}", other),
        }
    }

    #[test]
    fn non_raw_string_still_processes_escapes() {
        let stmts = parse_src(r#"x = "a\nb";"#).unwrap();
        match &stmts[0] {
            Stmt::Assign { value: Expr::Constant(Value::Str(s), _), .. } => assert_eq!(s, "a\nb"),
            other => panic!("unexpected stmt: {:?}", other),
        }
    }

    #[test]
    fn implicit_multiplication_sugar() {
        let stmts = parse_src("x = 2y;").unwrap();
        match &stmts[0] {
            Stmt::Assign { value: Expr::BinOp { op: Operator::Mult, .. }, .. } => {}
            other => panic!("unexpected stmt: {:?}", other),
        }
    }
}
