//! Recursive-descent parser for the Quill language.
//!
//! Consumes the tokenizer's output and builds a [`Node<()>`] rooted at a
//! block representing the whole file. One token of lookahead, plus a
//! single `code` flag that decides whether a parenthesised group is a
//! statement sequence (code) or a comma/semicolon expression list
//! (data).
//!
//! The parser does not resynchronise: the first syntax error is
//! reported with its location and aborts the pipeline.
//!
//! # Usage
//!
//! ```
//! use quill_lexer::tokenize;
//! use quill_parser::parse;
//!
//! let ast = parse(&tokenize("x = y + 2").unwrap()).unwrap();
//! assert_eq!(ast.to_sexp(), "(assign (ident x) (bin_op + (ident y) (int 2)))");
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::too_many_lines, clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod error;

pub use error::{ParseError, ParseResult};

use quill_ast::{CaptureParam, Field, FnExpr, IfExpr, Node, Tree, VarDef};
use quill_lexer::LexOutput;
use quill_token::{Location, SourceToken, Token, TokenKind};
use tracing::debug;

/// Parse a token stream into a tree with unit attributes.
pub fn parse(input: &LexOutput) -> ParseResult<Node<()>> {
    debug!(tokens = input.tokens.len(), "parsing token stream");
    let mut parser = Parser { tokens: &input.tokens, pos: 0, code: true };
    let root = parser.top_level()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.error(format!(
            "expected end of input, got {}",
            parser.describe_next()
        )));
    }
    Ok(root)
}

struct Parser<'a> {
    tokens: &'a [SourceToken],
    pos: usize,
    /// true = statement-list interpretation of `(...)`, false = data-list
    code: bool,
}

impl<'a> Parser<'a> {
    // ----- cursor helpers -------------------------------------------------

    fn peek(&self) -> Option<&SourceToken> {
        self.tokens.get(self.pos)
    }

    /// Kind of the next basic token; `Eoi` past the end, `None` for
    /// identifier and literal tokens.
    fn peek_basic(&self) -> Option<TokenKind> {
        match self.peek() {
            Some(t) => t.token.kind(),
            None => Some(TokenKind::Eoi),
        }
    }

    fn loc_first(&self) -> Location {
        self.peek().map(|t| t.location).unwrap_or_else(|| self.loc_last())
    }

    fn loc_last(&self) -> Location {
        match self.pos {
            0 => Location::default(),
            p => self.tokens.get(p - 1).map(|t| t.location).unwrap_or_default(),
        }
    }

    fn describe_next(&self) -> String {
        match self.peek() {
            Some(t) => format!("{}", t.token),
            None => "end of input".to_string(),
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.loc_first())
    }

    fn eat(&mut self) -> ParseResult<SourceToken> {
        let token = self.peek().cloned().ok_or_else(|| self.error("end of input"))?;
        self.pos += 1;
        Ok(token)
    }

    fn eat_if(&mut self, kind: TokenKind) -> bool {
        if self.peek().is_some_and(|t| t.token.is_kind(kind)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_if_any(&mut self, kinds: &[TokenKind]) -> Option<TokenKind> {
        let next = self.peek()?.token.kind()?;
        if kinds.contains(&next) {
            self.pos += 1;
            Some(next)
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Location> {
        if self.peek().is_some_and(|t| t.token.is_kind(kind)) {
            let loc = self.loc_first();
            self.pos += 1;
            Ok(loc)
        } else {
            Err(self.error(format!(
                "expected a \"{}\" but got {}",
                kind.symbol(),
                self.describe_next()
            )))
        }
    }

    fn eat_ident(&mut self) -> Option<String> {
        match self.peek().map(|t| &t.token) {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Some(name)
            }
            _ => None,
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        self.eat_ident()
            .ok_or_else(|| self.error(format!("expected an identifier but got {}", self.describe_next())))
    }

    /// Node spanning from `from` to the last consumed token.
    fn node(&self, kind: Tree<()>, from: Location) -> Node<()> {
        Node::plain(kind, from.span_to(self.loc_last()))
    }

    // ----- blocks and statements -----------------------------------------

    fn top_level(&mut self) -> ParseResult<Node<()>> {
        self.block()
    }

    /// Statement sequence; collapses to the child when it has exactly
    /// one statement.
    fn block(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let mut stmts = Vec::new();
        loop {
            self.parse_block_line(&mut stmts)?;
            if !self.eat_if(TokenKind::LineEnd) {
                break;
            }
        }
        if stmts.len() == 1 {
            return Ok(stmts.remove(0));
        }
        Ok(self.node(Tree::Block(stmts), from))
    }

    /// One `;`-separated run of statements, folding `elif`/`else` into
    /// the preceding `if`.
    fn parse_block_line(&mut self, block: &mut Vec<Node<()>>) -> ParseResult<()> {
        loop {
            let stmt = self.statement()?;
            match stmt.kind() {
                Tree::Elif { test, body } => {
                    let updated = match block.last().map(Node::kind) {
                        Some(Tree::If(if_expr)) => {
                            let mut folded = if_expr.clone();
                            folded.elif_tests.push(test.clone());
                            folded.elif_branches.push(body.clone());
                            folded
                        }
                        _ => {
                            return Err(ParseError::new(
                                "dangling \"elif\" block (prior statement is not \"if\" or \"elif\")",
                                stmt.location(),
                            ))
                        }
                    };
                    replace_last(block, Tree::If(updated), stmt.location());
                }
                Tree::Else { body } => {
                    let updated = match block.last().map(Node::kind) {
                        Some(Tree::If(if_expr)) => {
                            let mut folded = if_expr.clone();
                            folded.else_branch = Some(body.clone());
                            folded
                        }
                        _ => {
                            return Err(ParseError::new(
                                "dangling \"else\" block (prior statement is not \"if\" or \"elif\")",
                                stmt.location(),
                            ))
                        }
                    };
                    replace_last(block, Tree::If(updated), stmt.location());
                }
                _ => block.push(stmt),
            }
            if !self.eat_if(TokenKind::Semicolon) {
                return Ok(());
            }
        }
    }

    fn statement(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        match self.peek_basic() {
            Some(TokenKind::Type) => {
                self.pos += 1;
                self.type_decl(from)
            }
            Some(TokenKind::Alias) => {
                self.pos += 1;
                let name = self.expect_ident()?;
                self.expect(TokenKind::Assign)?;
                let body = self.type_annotation()?;
                Ok(self.node(Tree::LetType { name, body }, from))
            }
            Some(TokenKind::Var) => {
                self.pos += 1;
                self.var_decl(from)
            }
            Some(TokenKind::Def) => {
                self.pos += 1;
                self.fn_decl(from)
            }
            Some(TokenKind::If) => {
                self.pos += 1;
                let mut if_expr = IfExpr::default();
                if_expr.elif_tests.push(self.delimited_code()?);
                let old_code = self.code;
                self.code = true;
                if_expr.elif_branches.push(self.expression()?);
                self.code = old_code;
                if self.eat_if(TokenKind::Else) {
                    let old_code = self.code;
                    self.code = true;
                    if_expr.else_branch = Some(self.expression()?);
                    self.code = old_code;
                }
                Ok(self.node(Tree::If(if_expr), from))
            }
            Some(TokenKind::While) => {
                self.pos += 1;
                let test = self.delimited_code()?;
                let old_code = self.code;
                self.code = true;
                let body = self.expression()?;
                self.code = old_code;
                Ok(self.node(Tree::While { test, body }, from))
            }
            Some(TokenKind::For) => {
                self.pos += 1;
                let old_code = self.code;
                self.code = true;
                self.expect(TokenKind::Oparen)?;
                let var = self.expect_ident()?;
                self.expect(TokenKind::Colon)?;
                let iterable = self.expression()?;
                self.expect(TokenKind::Cparen)?;
                let body = self.expression()?;
                self.code = old_code;
                Ok(self.node(Tree::For { var, iterable, body }, from))
            }
            Some(TokenKind::Elif) => {
                self.pos += 1;
                let test = self.delimited_code()?;
                let old_code = self.code;
                self.code = true;
                let body = self.expression()?;
                self.code = old_code;
                Ok(self.node(Tree::Elif { test, body }, from))
            }
            Some(TokenKind::Else) => {
                self.pos += 1;
                let old_code = self.code;
                self.code = true;
                let body = self.expression()?;
                self.code = old_code;
                Ok(self.node(Tree::Else { body }, from))
            }
            _ => self.assignment_stmt(),
        }
    }

    /// `type Name = T`, `type Name(fields)`, or anonymous `type (fields)`.
    fn type_decl(&mut self, from: Location) -> ParseResult<Node<()>> {
        let name = self.eat_ident();

        if name.is_some() && self.eat_if(TokenKind::Assign) {
            let inner = self.atom_expr()?;
            let body = self.node(Tree::TypeExpr(inner), from);
            let name = name.unwrap_or_default();
            return Ok(self.node(Tree::DefType { name, body }, from));
        }

        let mut fields = Vec::new();
        if self.eat_if(TokenKind::Oparen) && !self.eat_if(TokenKind::Cparen) {
            let (names, types) = self.fn_def_args()?;
            self.expect(TokenKind::Cparen)?;
            fields = names
                .into_iter()
                .zip(types)
                .map(|(name, ty)| Field { name, ty })
                .collect();
        }

        let strct = self.node(Tree::Struct(fields), from);
        match name {
            Some(name) => {
                let body = self.node(Tree::TypeExpr(strct), from);
                Ok(self.node(Tree::DefType { name, body }, from))
            }
            None => Ok(strct),
        }
    }

    /// `var name [: type] [= rhs]`
    fn var_decl(&mut self, from: Location) -> ParseResult<Node<()>> {
        let name = self.expect_ident()?;

        let declared_type = if self.eat_if(TokenKind::Colon) {
            Some(self.type_annotation()?)
        } else {
            None
        };

        let rhs = if self.eat_if(TokenKind::Assign) {
            let old_code = self.code;
            self.code = false;
            let rhs = self.assignment_stmt()?;
            self.code = old_code;
            Some(rhs)
        } else {
            None
        };

        Ok(self.node(Tree::VarDef(VarDef { name, declared_type, rhs }), from))
    }

    /// `def name(args)[: result] = body` sugar for a function-valued
    /// variable definition.
    fn fn_decl(&mut self, from: Location) -> ParseResult<Node<()>> {
        let name = self.expect_ident()?;

        let mut arg_names = Vec::new();
        let mut arg_types = Vec::new();
        if self.eat_if(TokenKind::Oparen) && !self.eat_if(TokenKind::Cparen) {
            let (names, types) = self.fn_def_args()?;
            self.expect(TokenKind::Cparen)?;
            arg_names = names;
            arg_types = types;
        }

        let result_type = if self.eat_if(TokenKind::Colon) {
            let ty_from = self.loc_first();
            let inner = self.expression()?;
            Some(self.node(Tree::TypeExpr(inner), ty_from))
        } else {
            None
        };

        self.expect(TokenKind::Assign)?;
        let body = self.expression()?;

        let fn_expr = self.node(
            Tree::FnExpr(FnExpr { arg_names, arg_types, result_type, body, captures: Vec::new() }),
            from,
        );
        Ok(self.node(
            Tree::VarDef(VarDef { name, declared_type: None, rhs: Some(fn_expr) }),
            from,
        ))
    }

    /// A `: type` annotation site — the type lives in a single atom
    /// expression wrapped as being in type context.
    fn type_annotation(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let inner = self.atom_expr()?;
        Ok(self.node(Tree::TypeExpr(inner), from))
    }

    /// Parameter lists: runs of names, each run optionally annotated
    /// with `: T`, which then applies to every name of the run.
    fn fn_def_args(&mut self) -> ParseResult<(Vec<String>, Vec<Node<()>>)> {
        let mut names = Vec::new();
        let mut types = Vec::new();
        loop {
            self.fn_def_args_comma(&mut names, &mut types)?;
            if !self.eat_if(TokenKind::LineEnd) {
                break;
            }
        }
        Ok((names, types))
    }

    fn fn_def_args_comma(
        &mut self,
        names: &mut Vec<String>,
        types: &mut Vec<Node<()>>,
    ) -> ParseResult<()> {
        loop {
            loop {
                names.push(self.expect_ident()?);
                if !self.eat_if(TokenKind::Comma) {
                    break;
                }
            }

            if self.eat_if(TokenKind::Colon) {
                let from = self.loc_first();
                let inner = self.expression()?;
                types.push(self.node(Tree::TypeExpr(inner), from));
                while !types.is_empty() && types.len() < names.len() {
                    let again = types[types.len() - 1].clone();
                    types.push(again);
                }
            } else {
                while types.len() < names.len() {
                    types.push(Node::plain(Tree::Unit, self.loc_last()));
                }
            }

            if !self.eat_if(TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    /// A parenthesised statement group, always yielding a block.
    fn delimited_code(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let old_code = self.code;
        self.code = false;
        self.expect(TokenKind::Oparen)?;
        let inner = self.block()?;
        self.expect(TokenKind::Cparen)?;
        self.code = old_code;

        let location = from.span_to(self.loc_last());
        match inner.kind() {
            Tree::Block(_) => Ok(inner),
            _ => Ok(Node::plain(Tree::Block(vec![inner]), location)),
        }
    }

    /// A parenthesised data group.
    fn delimited_data(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let old_code = self.code;
        self.code = false;
        self.expect(TokenKind::Oparen)?;
        let items = self.data_items()?;
        self.expect(TokenKind::Cparen)?;
        self.code = old_code;
        Ok(self.node(Tree::Data(items), from))
    }

    // ----- expressions ----------------------------------------------------

    fn assignment_stmt(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let lhs = self.expression()?;
        if self.eat_if(TokenKind::Assign) {
            let rhs = self.assignment_stmt()?;
            return Ok(self.node(Tree::Assign { lhs, rhs }, from));
        }
        Ok(lhs)
    }

    fn expression(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        match self.peek_basic() {
            Some(TokenKind::If) => {
                self.pos += 1;
                let old_code = self.code;
                self.code = true;
                let mut if_expr = IfExpr::default();
                if_expr.elif_tests.push(self.delimited_code()?);
                if_expr.elif_branches.push(self.expression()?);
                if self.eat_if(TokenKind::Else) {
                    if_expr.else_branch = Some(self.expression()?);
                }
                self.code = old_code;
                Ok(self.node(Tree::If(if_expr), from))
            }
            Some(TokenKind::Fn) => {
                self.pos += 1;
                self.fn_expr(from)
            }
            Some(TokenKind::Break) => {
                self.pos += 1;
                Ok(self.node(Tree::Break, from))
            }
            Some(TokenKind::Continue) => {
                self.pos += 1;
                Ok(self.node(Tree::Continue, from))
            }
            Some(TokenKind::Return) => {
                self.pos += 1;
                let value = if self.at_value_terminator() {
                    None
                } else {
                    Some(self.expression()?)
                };
                Ok(self.node(Tree::Return(value), from))
            }
            Some(TokenKind::Yield) => {
                self.pos += 1;
                let value = if self.at_value_terminator() {
                    None
                } else {
                    Some(self.expression()?)
                };
                Ok(self.node(Tree::Yield(value), from))
            }
            _ => self.or_test(),
        }
    }

    /// True before tokens that end an optional `return`/`yield` value.
    fn at_value_terminator(&self) -> bool {
        matches!(
            self.peek_basic(),
            Some(
                TokenKind::LineEnd
                    | TokenKind::Semicolon
                    | TokenKind::Comma
                    | TokenKind::Cparen
                    | TokenKind::Eoi
            )
        )
    }

    /// `fn (args)[: result] = body [with captures]`
    fn fn_expr(&mut self, from: Location) -> ParseResult<Node<()>> {
        let mut arg_names = Vec::new();
        let mut arg_types = Vec::new();
        if self.eat_if(TokenKind::Oparen) && !self.eat_if(TokenKind::Cparen) {
            let (names, types) = self.fn_def_args()?;
            self.expect(TokenKind::Cparen)?;
            arg_names = names;
            arg_types = types;
        }

        let result_type = if self.eat_if(TokenKind::Colon) {
            let ty_from = self.loc_first();
            let inner = self.expression()?;
            Some(self.node(Tree::TypeExpr(inner), ty_from))
        } else {
            None
        };

        self.expect(TokenKind::Assign)?;
        let body = self.expression()?;

        let mut captures = Vec::new();
        if self.eat_if(TokenKind::With) {
            let parenthesised = self.eat_if(TokenKind::Oparen);
            captures = self.capture_expressions()?;
            if parenthesised {
                self.expect(TokenKind::Cparen)?;
            }
        }

        Ok(self.node(
            Tree::FnExpr(FnExpr { arg_names, arg_types, result_type, body, captures }),
            from,
        ))
    }

    fn capture_expressions(&mut self) -> ParseResult<Vec<CaptureParam<()>>> {
        let mut captures = Vec::new();
        loop {
            loop {
                loop {
                    captures.push(self.capture_expression()?);
                    if !self.eat_if(TokenKind::Comma) {
                        break;
                    }
                }
                if !self.eat_if(TokenKind::Semicolon) {
                    break;
                }
            }
            if !self.eat_if(TokenKind::LineEnd) {
                return Ok(captures);
            }
        }
    }

    fn capture_expression(&mut self) -> ParseResult<CaptureParam<()>> {
        let by_var = self.eat_if(TokenKind::Var);
        let name = self.eat_ident();
        let init = if self.eat_if(TokenKind::Assign) {
            Some(self.expression()?)
        } else {
            None
        };

        if !by_var && name.is_none() && init.is_none() {
            return Err(self.error("bad capture expression"));
        }

        Ok(CaptureParam { by_var, name, init })
    }

    fn or_test(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let mut result = self.and_test()?;
        while self.eat_if(TokenKind::Or) {
            let rhs = self.and_test()?;
            result = self.node(Tree::BinOp { op: TokenKind::Or, lhs: result, rhs }, from);
        }
        Ok(result)
    }

    fn and_test(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let mut result = self.not_test()?;
        while self.eat_if(TokenKind::And) {
            let rhs = self.not_test()?;
            result = self.node(Tree::BinOp { op: TokenKind::And, lhs: result, rhs }, from);
        }
        Ok(result)
    }

    fn not_test(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        if self.eat_if(TokenKind::Not) {
            let operand = self.not_test()?;
            return Ok(self.node(Tree::UnaryOp { op: TokenKind::Not, operand }, from));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> ParseResult<Node<()>> {
        use TokenKind::{Equal, Geq, Gt, In, Is, Leq, Lt, Not, NotEqual};

        let from = self.loc_first();
        let result = self.bit_or_expr()?;

        let Some(cmp) = self.eat_if_any(&[Leq, Geq, Lt, Gt, Equal, NotEqual, In, Is, Not]) else {
            return Ok(result);
        };

        if cmp == Not {
            // `x not in xs`
            self.expect(In)?;
            let rhs = self.atom_expr()?;
            let inner = self.node(Tree::BinOp { op: In, lhs: result, rhs }, from);
            return Ok(self.node(Tree::UnaryOp { op: Not, operand: inner }, from));
        }

        if cmp == Is && self.eat_if(Not) {
            // `x is not y`
            let rhs = self.atom_expr()?;
            let inner = self.node(Tree::BinOp { op: Is, lhs: result, rhs }, from);
            return Ok(self.node(Tree::UnaryOp { op: Not, operand: inner }, from));
        }

        let rhs = self.atom_expr()?;
        Ok(self.node(Tree::BinOp { op: cmp, lhs: result, rhs }, from))
    }

    fn bit_or_expr(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let mut result = self.bit_xor_expr()?;
        while self.eat_if(TokenKind::Bar) {
            let rhs = self.bit_xor_expr()?;
            result = self.node(Tree::BinOp { op: TokenKind::Bar, lhs: result, rhs }, from);
        }
        Ok(result)
    }

    fn bit_xor_expr(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let mut result = self.bit_and_expr()?;
        while self.eat_if(TokenKind::Hat) {
            let rhs = self.bit_and_expr()?;
            result = self.node(Tree::BinOp { op: TokenKind::Hat, lhs: result, rhs }, from);
        }
        Ok(result)
    }

    fn bit_and_expr(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let mut result = self.bit_shift_expr()?;
        while self.eat_if(TokenKind::Ampersand) {
            let rhs = self.bit_shift_expr()?;
            result = self.node(Tree::BinOp { op: TokenKind::Ampersand, lhs: result, rhs }, from);
        }
        Ok(result)
    }

    fn bit_shift_expr(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let mut result = self.arithmetic_expr()?;
        while let Some(op) = self.eat_if_any(&[TokenKind::LeftLeft, TokenKind::RightRight]) {
            let rhs = self.arithmetic_expr()?;
            result = self.node(Tree::BinOp { op, lhs: result, rhs }, from);
        }
        Ok(result)
    }

    fn arithmetic_expr(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let mut result = self.term()?;
        while let Some(op) = self.eat_if_any(&[TokenKind::Plus, TokenKind::Minus]) {
            let rhs = self.term()?;
            result = self.node(Tree::BinOp { op, lhs: result, rhs }, from);
        }
        Ok(result)
    }

    fn term(&mut self) -> ParseResult<Node<()>> {
        use TokenKind::{ColonPercent, ColonSlash, ColonStar, Percent, Slash, Star};

        let from = self.loc_first();
        let mut result = self.factor()?;
        while let Some(op) =
            self.eat_if_any(&[Star, Slash, Percent, ColonStar, ColonSlash, ColonPercent])
        {
            let rhs = self.factor()?;
            result = self.node(Tree::BinOp { op, lhs: result, rhs }, from);
        }
        Ok(result)
    }

    fn factor(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        if let Some(op) = self.eat_if_any(&[TokenKind::Plus, TokenKind::Minus, TokenKind::Tilde]) {
            let operand = self.factor()?;
            return Ok(self.node(Tree::UnaryOp { op, operand }, from));
        }
        self.power()
    }

    fn power(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let mut result = self.atom_expr()?;
        // right-associative: the rhs re-enters factor
        if self.eat_if(TokenKind::StarStar) {
            let rhs = self.factor()?;
            result = self.node(Tree::BinOp { op: TokenKind::StarStar, lhs: result, rhs }, from);
        }
        Ok(result)
    }

    // ----- data -----------------------------------------------------------

    /// `LINE_END`-separated data rows, collapsed when a single row is
    /// itself a data list.
    fn data_items(&mut self) -> ParseResult<Vec<Node<()>>> {
        let old_code = self.code;
        self.code = false;
        let mut items = Vec::new();
        loop {
            items.push(self.invoc_args_semicolon()?);
            if !self.eat_if(TokenKind::LineEnd) {
                break;
            }
        }
        self.code = old_code;

        if items.len() == 1 {
            if let Tree::Data(inner) = items[0].kind() {
                return Ok(inner.clone());
            }
        }
        Ok(items)
    }

    fn invoc_args_semicolon(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let mut items = Vec::new();
        loop {
            items.push(self.invoc_args_comma()?);
            if !self.eat_if(TokenKind::Semicolon) {
                break;
            }
        }
        if items.len() == 1 {
            return Ok(items.remove(0));
        }
        Ok(self.node(Tree::Data(items), from))
    }

    fn invoc_args_comma(&mut self) -> ParseResult<Node<()>> {
        if self.peek_basic() == Some(TokenKind::Oparen) {
            return self.delimited_data();
        }
        let from = self.loc_first();
        let mut items = Vec::new();
        loop {
            items.push(self.expression()?);
            if !self.eat_if(TokenKind::Comma) {
                break;
            }
        }
        if items.len() == 1 {
            return Ok(items.remove(0));
        }
        Ok(self.node(Tree::Data(items), from))
    }

    // ----- atoms ----------------------------------------------------------

    fn simple_atom_expr(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let mut result = self.atom()?;
        while self.eat_if(TokenKind::Oparen) {
            let arguments = self.data_items()?;
            self.expect(TokenKind::Cparen)?;
            result = self.node(Tree::Invoc { target: result, arguments }, from);
        }
        Ok(result)
    }

    /// Atoms chained by `.`: the left operand becomes the first
    /// argument of the right (uniform function-call syntax).
    fn atom_expr(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let mut result = self.simple_atom_expr()?;
        while self.eat_if(TokenKind::Dot) {
            let rhs = self.simple_atom_expr()?;
            result = match rhs.kind() {
                Tree::Invoc { target, arguments } => {
                    let mut args = arguments.clone();
                    args.insert(0, result);
                    self.node(Tree::Invoc { target: target.clone(), arguments: args }, from)
                }
                _ => self.node(Tree::Invoc { target: rhs.clone(), arguments: vec![result] }, from),
            };
        }
        Ok(result)
    }

    fn atom(&mut self) -> ParseResult<Node<()>> {
        let from = self.loc_first();
        let token = self.eat()?;
        let kind = match token.token {
            Token::Basic(TokenKind::Oparen) => {
                if self.code {
                    let inner = self.block()?;
                    self.expect(TokenKind::Cparen)?;
                    return Ok(inner);
                }
                let items = self.data_items()?;
                self.expect(TokenKind::Cparen)?;
                Tree::Data(items)
            }
            Token::Basic(TokenKind::Data) => return self.delimited_data(),
            Token::Basic(TokenKind::Do) => return self.delimited_code(),
            Token::Basic(TokenKind::True) => Tree::True,
            Token::Basic(TokenKind::False) => Tree::False,
            // bare `verbatim` reads as a name
            Token::Basic(TokenKind::Verbatim) => Tree::Ident("verbatim".to_string()),
            Token::Basic(kind) if kind.is_type_marker() => Tree::PrimType(kind),
            Token::Ident(name) => Tree::Ident(name),
            Token::Str(value) => Tree::Str(value),
            Token::Int(lit) => Tree::Int(lit),
            Token::Float(lit) => Tree::Float(lit),
            other => {
                return Err(ParseError::new(
                    format!(
                        "expected a group, literal, identifier, or type name, got {other}"
                    ),
                    token.location,
                ))
            }
        };
        Ok(self.node(kind, from))
    }
}

/// Swap the last node of a block for a rebuilt one spanning to `to`.
fn replace_last(block: &mut [Node<()>], kind: Tree<()>, to: Location) {
    if let Some(slot) = block.last_mut() {
        let location = slot.location().span_to(to);
        *slot = Node::plain(kind, location);
    }
}
