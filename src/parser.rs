//! Recursive-descent parser with precedence climbing.
//!
//! Errors are collected as a single [`CompileError`]; the parser then
//! attempts recovery by skipping to the next `;` so scanning can continue
//! far enough to keep token positions sane, but a program with any recorded
//! error yields no AST — only the first error is surfaced.

use crate::ast::*;
use crate::consts::{MAX_CALL_ARGS, MAX_CASE_BRANCHES, MAX_VARIABLES};
use crate::error::CompileError;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};
use crate::value::{DataType, Value};

/// Parses `source` into a [`Program`], or the first [`CompileError`]
/// encountered.
pub fn parse(source: &str) -> Result<Program, CompileError> {
    let mut parser = Parser::new(source);
    let program = parser.parse_program();
    match parser.error {
        Some(err) => Err(err),
        None => Ok(program),
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    cur: Token,
    next: Token,
    error: Option<CompileError>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let cur = lexer.next_token();
        let next = lexer.next_token();
        Parser { lexer, cur, next, error: None }
    }

    fn advance(&mut self) {
        let new_next = self.lexer.next_token();
        self.cur = std::mem::replace(&mut self.next, new_next);
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    fn record_error(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(CompileError::new(message, self.cur.line));
        }
    }

    fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Consumes `kind` if present, else records an error. Returns whether it
    /// matched.
    fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            self.record_error(format!("expected {what}, found '{}'", self.cur.lexeme));
            false
        }
    }

    fn skip_optional_semicolon(&mut self) {
        if self.at(TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// Error recovery: skip tokens up to and including the next `;`.
    fn recover_to_semicolon(&mut self) {
        while !self.at(TokenKind::Semicolon) && !self.at(TokenKind::Eof) {
            self.advance();
        }
        if self.at(TokenKind::Semicolon) {
            self.advance();
        }
    }

    // ---------------------------------------------------------------
    // Program
    // ---------------------------------------------------------------

    fn parse_program(&mut self) -> Program {
        let mut name = String::new();

        if self.at(TokenKind::Program) {
            self.advance();
            if self.at(TokenKind::Ident) {
                name = self.cur.lexeme.clone();
                self.advance();
            }
            self.skip_optional_semicolon();
        }

        let mut variables = Vec::new();
        while matches!(self.cur.kind, TokenKind::Var | TokenKind::VarInput | TokenKind::VarOutput) {
            self.parse_var_block(&mut variables);
            if self.has_error() {
                return Program { name, variables, body: Vec::new() };
            }
        }

        if self.at(TokenKind::Begin) {
            self.advance();
        }

        let body = self.parse_statements(&[TokenKind::End, TokenKind::EndProgram]);

        if self.at(TokenKind::End) || self.at(TokenKind::EndProgram) {
            self.advance();
            self.skip_optional_semicolon();
        }

        Program { name, variables, body }
    }

    fn parse_var_block(&mut self, variables: &mut Vec<VarDecl>) {
        let (is_input, is_output) = match self.cur.kind {
            TokenKind::VarInput => (true, false),
            TokenKind::VarOutput => (false, true),
            _ => (false, false),
        };
        self.advance(); // VAR / VAR_INPUT / VAR_OUTPUT

        while self.at(TokenKind::Ident) {
            let line = self.cur.line;
            let name = self.cur.lexeme.clone();
            self.advance();

            if !self.expect(TokenKind::Colon, "':'") {
                return;
            }

            let Some(data_type) = self.parse_data_type() else {
                return;
            };

            let initial_value = if self.at(TokenKind::Assign) {
                self.advance();
                match self.parse_literal_value(data_type) {
                    Some(v) => Some(v),
                    None => return,
                }
            } else {
                None
            };

            if !self.expect(TokenKind::Semicolon, "';'") {
                return;
            }

            if variables.len() >= MAX_VARIABLES {
                self.record_error_at("Too many variables", line);
                return;
            }
            if variables.iter().any(|v: &VarDecl| v.name == name) {
                self.record_error_at(format!("Duplicate variable name: {name}"), line);
                return;
            }

            variables.push(VarDecl { name, data_type, initial_value, is_input, is_output });
        }

        self.expect(TokenKind::EndVar, "'END_VAR'");
    }

    fn record_error_at(&mut self, message: impl Into<String>, line: u32) {
        if self.error.is_none() {
            self.error = Some(CompileError::new(message, line));
        }
    }

    fn parse_data_type(&mut self) -> Option<DataType> {
        let ty = match self.cur.kind {
            TokenKind::Bool => DataType::Bool,
            TokenKind::Int => DataType::Int,
            TokenKind::Dint => DataType::Dint,
            TokenKind::Dword => DataType::Dword,
            TokenKind::Real => DataType::Real,
            _ => {
                self.record_error(format!("expected a type, found '{}'", self.cur.lexeme));
                return None;
            }
        };
        self.advance();
        Some(ty)
    }

    /// A restricted literal expression for `VAR` initial values: an
    /// optional unary minus followed by a literal matching `data_type`.
    fn parse_literal_value(&mut self, data_type: DataType) -> Option<Value> {
        let negate = if self.at(TokenKind::Minus) {
            self.advance();
            true
        } else {
            false
        };

        let value = match (self.cur.kind, data_type) {
            (TokenKind::True, DataType::Bool) => {
                self.advance();
                Value::Bool(true)
            }
            (TokenKind::False, DataType::Bool) => {
                self.advance();
                Value::Bool(false)
            }
            (TokenKind::IntLiteral, _) => {
                let n = self.parse_int_literal()?;
                self.advance();
                let n = if negate { -n } else { n };
                coerce_int_literal(n, data_type, self)?
            }
            (TokenKind::RealLiteral, DataType::Real) => {
                let lexeme = self.cur.lexeme.clone();
                self.advance();
                let f: f32 = lexeme.parse().unwrap_or(0.0);
                Value::Real(if negate { -f } else { f })
            }
            _ => {
                self.record_error(format!("invalid initial value for this type: '{}'", self.cur.lexeme));
                return None;
            }
        };
        Some(value)
    }

    fn parse_int_literal(&mut self) -> Option<i64> {
        let lexeme = &self.cur.lexeme;
        let parsed = if let Some(hex) = lexeme.strip_prefix("0x").or_else(|| lexeme.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16).ok()
        } else if let Some(bin) = lexeme.strip_prefix("2#") {
            i64::from_str_radix(bin, 2).ok()
        } else {
            lexeme.parse::<i64>().ok()
        };
        match parsed {
            Some(v) => Some(v),
            None => {
                self.record_error(format!("invalid integer literal: '{lexeme}'"));
                None
            }
        }
    }

    // ---------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------

    fn parse_statements(&mut self, terminators: &[TokenKind]) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while !terminators.contains(&self.cur.kind) && !self.at(TokenKind::Eof) && !self.has_error() {
            if let Some(stmt) = self.parse_statement() {
                stmts.push(stmt);
            } else {
                self.recover_to_semicolon();
                break;
            }
        }
        stmts
    }

    /// Like [`Self::parse_statements`] but also stops before a new `CASE`
    /// branch label: an integer literal immediately followed by `:` (spec
    /// §4.2 "a case branch ... detected by a one-token lookahead").
    fn parse_case_body(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        loop {
            if self.has_error() || self.at(TokenKind::Eof) {
                break;
            }
            if self.at(TokenKind::EndCase) || self.at(TokenKind::Else) {
                break;
            }
            if self.at(TokenKind::IntLiteral) && self.next.kind == TokenKind::Colon {
                break;
            }
            if let Some(stmt) = self.parse_statement() {
                stmts.push(stmt);
            } else {
                self.recover_to_semicolon();
                break;
            }
        }
        stmts
    }

    fn parse_statement(&mut self) -> Option<Stmt> {
        let line = self.cur.line;
        let kind = match self.cur.kind {
            TokenKind::Ident => self.parse_assignment_or_call()?,
            TokenKind::If => self.parse_if()?,
            TokenKind::Case => self.parse_case()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::Repeat => self.parse_repeat()?,
            TokenKind::Exit => {
                self.advance();
                self.expect(TokenKind::Semicolon, "';'");
                StmtKind::Exit
            }
            _ => {
                self.record_error(format!("unexpected token '{}' in statement", self.cur.lexeme));
                return None;
            }
        };
        Some(Stmt { line, kind })
    }

    fn parse_assignment_or_call(&mut self) -> Option<StmtKind> {
        let name = self.cur.lexeme.clone();
        self.advance();

        if self.at(TokenKind::Assign) {
            self.advance();
            let expr = self.parse_expr()?;
            self.expect(TokenKind::Semicolon, "';'");
            return Some(StmtKind::Assign { name, expr });
        }

        if self.at(TokenKind::LParen) {
            let args = self.parse_call_args(&name)?;
            if args.len() != 2 {
                self.record_error(format!(
                    "remote write '{name}(...)' expects 2 arguments (slave_id, address), got {}",
                    args.len()
                ));
                return None;
            }
            if !self.expect(TokenKind::Assign, "':=' after remote write target") {
                return None;
            }
            let value = self.parse_expr()?;
            self.expect(TokenKind::Semicolon, "';'");
            let mut args = args.into_iter();
            let slave_id = args.next().expect("checked len == 2");
            let address = args.next().expect("checked len == 2");
            return Some(StmtKind::RemoteWrite { func_name: name, slave_id, address, value });
        }

        self.record_error(format!("expected ':=' or '(' after identifier '{name}'"));
        None
    }

    fn parse_if(&mut self) -> Option<StmtKind> {
        self.advance(); // IF
        let cond = self.parse_expr()?;
        if !self.expect(TokenKind::Then, "'THEN'") {
            return None;
        }
        let then_body = self.parse_statements(&[TokenKind::Elsif, TokenKind::Else, TokenKind::EndIf]);

        let else_body = if self.at(TokenKind::Elsif) {
            let line = self.cur.line;
            let elsif = self.parse_elsif()?;
            vec![Stmt { line, kind: elsif }]
        } else if self.at(TokenKind::Else) {
            self.advance();
            self.parse_statements(&[TokenKind::EndIf])
        } else {
            Vec::new()
        };

        if self.at(TokenKind::EndIf) {
            self.advance();
            self.skip_optional_semicolon();
        } else {
            self.expect(TokenKind::EndIf, "'END_IF'");
        }

        Some(StmtKind::If { cond, then_body, else_body })
    }

    /// An `ELSIF` desugars into a nested `IF` occupying the else-body slot,
    /// so later phases only handle binary if/else.
    fn parse_elsif(&mut self) -> Option<StmtKind> {
        self.advance(); // ELSIF
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Then, "'THEN'");
        let then_body = self.parse_statements(&[TokenKind::Elsif, TokenKind::Else, TokenKind::EndIf]);

        let else_body = if self.at(TokenKind::Elsif) {
            let line = self.cur.line;
            let elsif = self.parse_elsif()?;
            vec![Stmt { line, kind: elsif }]
        } else if self.at(TokenKind::Else) {
            self.advance();
            self.parse_statements(&[TokenKind::EndIf])
        } else {
            Vec::new()
        };

        // The outer IF consumes END_IF; an ELSIF chain shares it.
        Some(StmtKind::If { cond, then_body, else_body })
    }

    fn parse_case(&mut self) -> Option<StmtKind> {
        self.advance(); // CASE
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Of, "'OF'");

        let mut branches = Vec::new();
        while self.at(TokenKind::IntLiteral) && self.next.kind == TokenKind::Colon {
            let line = self.cur.line;
            let value = self.parse_int_literal()? as i32;
            self.advance(); // int literal
            self.advance(); // ':'
            let body = self.parse_case_body();
            if branches.len() >= MAX_CASE_BRANCHES {
                self.record_error_at("Too many case branches (max 16)", line);
                return None;
            }
            branches.push(CaseBranch { value, body });
        }

        let else_body = if self.at(TokenKind::Else) {
            self.advance();
            self.expect(TokenKind::Colon, "':'");
            self.parse_case_body()
        } else {
            Vec::new()
        };

        self.expect(TokenKind::EndCase, "'END_CASE'");
        self.skip_optional_semicolon();

        Some(StmtKind::Case { expr, branches, else_body })
    }

    fn parse_for(&mut self) -> Option<StmtKind> {
        self.advance(); // FOR
        if !self.at(TokenKind::Ident) {
            self.record_error("expected loop variable name after 'FOR'");
            return None;
        }
        let var = self.cur.lexeme.clone();
        self.advance();
        self.expect(TokenKind::Assign, "':='");
        let start = self.parse_expr()?;
        self.expect(TokenKind::To, "'TO'");
        let end = self.parse_expr()?;
        let step = if self.at(TokenKind::By) {
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Do, "'DO'");
        let body = self.parse_statements(&[TokenKind::EndFor]);
        self.expect(TokenKind::EndFor, "'END_FOR'");
        self.skip_optional_semicolon();
        Some(StmtKind::For { var, start, end, step, body })
    }

    fn parse_while(&mut self) -> Option<StmtKind> {
        self.advance(); // WHILE
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Do, "'DO'");
        let body = self.parse_statements(&[TokenKind::EndWhile]);
        self.expect(TokenKind::EndWhile, "'END_WHILE'");
        self.skip_optional_semicolon();
        Some(StmtKind::While { cond, body })
    }

    fn parse_repeat(&mut self) -> Option<StmtKind> {
        self.advance(); // REPEAT
        let body = self.parse_statements(&[TokenKind::Until]);
        self.expect(TokenKind::Until, "'UNTIL'");
        let until = self.parse_expr()?;
        self.expect(TokenKind::EndRepeat, "'END_REPEAT'");
        self.skip_optional_semicolon();
        Some(StmtKind::Repeat { body, until })
    }

    // ---------------------------------------------------------------
    // Expressions (precedence climbing)
    // ---------------------------------------------------------------

    fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_or_xor()
    }

    fn parse_or_xor(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_and()?;
        loop {
            let op = match self.cur.kind {
                TokenKind::Or => BinaryOp::Or,
                TokenKind::Xor => BinaryOp::Xor,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Some(lhs)
    }

    fn parse_and(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_compare()?;
        while self.at(TokenKind::And) {
            self.advance();
            let rhs = self.parse_compare()?;
            lhs = Expr::Binary { op: BinaryOp::And, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Some(lhs)
    }

    fn parse_compare(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.cur.kind {
                TokenKind::Eq => BinaryOp::Eq,
                TokenKind::Ne => BinaryOp::Ne,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Ge => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Some(lhs)
    }

    fn parse_additive(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.cur.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_term()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Some(lhs)
    }

    fn parse_term(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.cur.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Mod => BinaryOp::Mod,
                TokenKind::Shl => BinaryOp::Shl,
                TokenKind::Shr => BinaryOp::Shr,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Some(lhs)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let op = match self.cur.kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Not => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Some(Expr::Unary { op, operand: Box::new(operand) });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        match self.cur.kind {
            TokenKind::True => {
                self.advance();
                Some(Expr::Literal(Value::Bool(true)))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::Literal(Value::Bool(false)))
            }
            TokenKind::IntLiteral => {
                let n = self.parse_int_literal()?;
                self.advance();
                let value = if (i16::MIN as i64..=i16::MAX as i64).contains(&n) {
                    Value::Int(n as i16)
                } else if (i32::MIN as i64..=i32::MAX as i64).contains(&n) {
                    Value::Dint(n as i32)
                } else {
                    self.record_error("integer literal out of range");
                    return None;
                };
                Some(Expr::Literal(value))
            }
            TokenKind::RealLiteral => {
                let lexeme = self.cur.lexeme.clone();
                self.advance();
                let f: f32 = lexeme.parse().unwrap_or(0.0);
                Some(Expr::Literal(Value::Real(f)))
            }
            TokenKind::StringLiteral => {
                self.record_error("string literals are not supported");
                None
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'");
                Some(expr)
            }
            TokenKind::Ident => {
                let name = self.cur.lexeme.clone();
                self.advance();
                if self.at(TokenKind::LParen) {
                    let args = self.parse_call_args(&name)?;
                    Some(Expr::Call { name, args })
                } else {
                    Some(Expr::Variable(name))
                }
            }
            _ => {
                self.record_error(format!("unexpected token '{}' in expression", self.cur.lexeme));
                None
            }
        }
    }

    /// `SCALE(in, in_min, in_max, out_min, out_max)` is the one built-in
    /// whose arity spec.md itself fixes at 5 (§4.5), one past the general
    /// `MAX_CALL_ARGS` cap every other call obeys (§3); it gets its own
    /// limit here rather than raising the cap for every call in the
    /// language.
    fn max_args_for(name: &str) -> usize {
        if name.eq_ignore_ascii_case("SCALE") {
            MAX_CALL_ARGS + 1
        } else {
            MAX_CALL_ARGS
        }
    }

    fn parse_call_args(&mut self, name: &str) -> Option<Vec<Expr>> {
        self.advance(); // '('
        let max_args = Self::max_args_for(name);
        let mut args = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                let arg = self.parse_expr()?;
                args.push(arg);
                if args.len() > max_args {
                    self.record_error(format!("Too many arguments (max {max_args})"));
                    return None;
                }
                if self.at(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'");
        Some(args)
    }
}

/// Coerces a parsed integer into the requested declared type for a `VAR`
/// initial value, rejecting out-of-range values rather than wrapping.
fn coerce_int_literal(n: i64, ty: DataType, parser: &mut Parser) -> Option<Value> {
    match ty {
        DataType::Int => {
            if (i16::MIN as i64..=i16::MAX as i64).contains(&n) {
                Some(Value::Int(n as i16))
            } else {
                parser.record_error("initial value out of range for INT");
                None
            }
        }
        DataType::Dint => {
            if (i32::MIN as i64..=i32::MAX as i64).contains(&n) {
                Some(Value::Dint(n as i32))
            } else {
                parser.record_error("initial value out of range for DINT");
                None
            }
        }
        DataType::Dword => {
            if (0..=u32::MAX as i64).contains(&n) {
                Some(Value::Dword(n as u32))
            } else {
                parser.record_error("initial value out of range for DWORD");
                None
            }
        }
        DataType::Real => Some(Value::Real(n as f32)),
        DataType::Bool => {
            parser.record_error("integer literal is not a valid BOOL initial value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Program {
        parse(src).unwrap_or_else(|e| panic!("unexpected parse error: {e}"))
    }

    #[test]
    fn minimal_program_with_assignment() {
        let prog = parse_ok("VAR x: INT; END_VAR x := 1;");
        assert_eq!(prog.variables.len(), 1);
        assert_eq!(prog.body.len(), 1);
    }

    #[test]
    fn if_else_nested_compare() {
        let prog = parse_ok(
            "VAR x: INT; result: INT; END_VAR
             x := 15;
             IF x > 10 THEN
               IF x > 20 THEN result := 2; ELSE result := 1; END_IF;
             ELSE
               result := 0;
             END_IF;",
        );
        assert_eq!(prog.body.len(), 2);
    }

    #[test]
    fn elsif_chain_desugars_to_nested_if() {
        let prog = parse_ok(
            "VAR x: INT; y: INT; END_VAR
             IF x = 1 THEN y := 1; ELSIF x = 2 THEN y := 2; ELSE y := 3; END_IF;",
        );
        let StmtKind::If { else_body, .. } = &prog.body[0].kind else {
            panic!("expected if");
        };
        assert_eq!(else_body.len(), 1);
        assert!(matches!(else_body[0].kind, StmtKind::If { .. }));
    }

    #[test]
    fn case_statement_with_else() {
        let prog = parse_ok(
            "VAR x: INT; y: INT; END_VAR
             CASE x OF
               1: y := 10;
               2: y := 20;
               ELSE: y := 0;
             END_CASE;",
        );
        let StmtKind::Case { branches, else_body, .. } = &prog.body[0].kind else {
            panic!("expected case");
        };
        assert_eq!(branches.len(), 2);
        assert_eq!(else_body.len(), 1);
    }

    #[test]
    fn too_many_variables_is_a_parse_error() {
        let mut src = String::new();
        src.push_str("VAR ");
        for i in 0..33 {
            src.push_str(&format!("v{i}: INT; "));
        }
        src.push_str("END_VAR");
        let err = parse(&src).unwrap_err();
        assert!(err.message.contains("Too many variables"));
    }

    #[test]
    fn too_many_call_args_is_a_parse_error() {
        let err = parse("VAR x: INT; END_VAR x := SUM(1,2,3,4,5);").unwrap_err();
        assert!(err.message.contains("Too many arguments"));
    }

    #[test]
    fn scale_accepts_its_five_spec_arguments() {
        let prog = parse_ok("VAR x: REAL; END_VAR x := SCALE(5, 0, 10, 0, 100);");
        assert!(matches!(prog.body[0].kind, StmtKind::Assign { .. }));
    }

    #[test]
    fn scale_with_six_arguments_is_a_parse_error() {
        let err = parse("VAR x: REAL; END_VAR x := SCALE(5, 0, 10, 0, 100, 1);").unwrap_err();
        assert!(err.message.contains("Too many arguments"));
    }

    #[test]
    fn unknown_token_in_statement_is_an_error() {
        let err = parse("VAR x: INT; END_VAR END_VAR y := 1;").unwrap_err();
        assert!(!err.message.is_empty());
    }

    #[test]
    fn remote_write_statement_parses_distinct_from_assignment() {
        let prog = parse_ok("MB_WRITE_HOLDING(1, 100) := 42;");
        let StmtKind::RemoteWrite { func_name, .. } = &prog.body[0].kind else {
            panic!("expected a remote write statement");
        };
        assert_eq!(func_name, "MB_WRITE_HOLDING");
    }

    #[test]
    fn for_loop_with_by_clause() {
        let prog = parse_ok(
            "VAR i: INT; END_VAR
             FOR i := 10 TO 0 BY -1 DO
             END_FOR;",
        );
        assert!(matches!(prog.body[0].kind, StmtKind::For { .. }));
    }
}
