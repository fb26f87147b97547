use nova_types::Variance;

use crate::ast::{
    FunctionDecl, FunctionTypeNode, ParamDecl, TypeArgNode, TypeNode, TypeParamDecl,
    TypeReference, WhereClause,
};
use crate::lexer::{lex, Keyword, Token, TokenKind};
use crate::ParseError;

/// Parse the (already unescaped) text of an alternative signature.
///
/// The grammar is the Kotlin function header: optional type parameters, an optional receiver,
/// the name, value parameters (with `vararg`), an optional return type and an optional `where`
/// clause. Anything else, including default values and bodies, is a syntax error.
pub fn parse_alternative_signature(text: &str) -> Result<FunctionDecl, ParseError> {
    let tokens = lex(text)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let decl = parser.parse_function_decl()?;
    parser.expect(TokenKind::Eof, "end of signature")?;
    Ok(decl)
}

/// Deepest type nesting accepted before parsing gives up.
const MAX_TYPE_DEPTH: usize = 128;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn cur(&self) -> &Token {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> &Token {
        // The token stream ends with `Eof`; clamp lookahead to it.
        let idx = (self.pos + n).min(self.tokens.len().saturating_sub(1));
        &self.tokens[idx]
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.cur().kind == kind
    }

    fn bump(&mut self) -> Token {
        let token = self.cur().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.at(&kind) {
            Ok(self.bump())
        } else {
            Err(self.error_here(format!("expected {what}")))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<(String, std::ops::Range<usize>), ParseError> {
        let token = self.cur().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.bump();
                Ok((name, token.start..token.end))
            }
            _ => Err(self.error_here(format!("expected {what}"))),
        }
    }

    fn error_here(&self, message: String) -> ParseError {
        let token = self.cur();
        let found = match &token.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Ident(name) => format!("`{name}`"),
            other => format!("{other:?}"),
        };
        ParseError::new(format!("{message}, found {found}"), token.start..token.end)
    }

    fn parse_function_decl(&mut self) -> Result<FunctionDecl, ParseError> {
        self.expect(TokenKind::Keyword(Keyword::Fun), "`fun`")?;

        let type_params = if self.at(&TokenKind::Lt) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };

        let (receiver, name, name_span) = self.parse_receiver_and_name()?;

        self.expect(TokenKind::LParen, "`(`")?;
        let mut params = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                params.push(self.parse_param()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "`)`")?;

        let return_type = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let mut where_clauses = Vec::new();
        if self.eat(&TokenKind::Keyword(Keyword::Where)) {
            loop {
                let (param, _) = self.expect_ident("type parameter name")?;
                self.expect(TokenKind::Colon, "`:`")?;
                let bound = self.parse_type()?;
                where_clauses.push(WhereClause { param, bound });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }

        Ok(FunctionDecl {
            name,
            name_span,
            receiver,
            type_params,
            params,
            return_type,
            where_clauses,
        })
    }

    fn parse_receiver_and_name(
        &mut self,
    ) -> Result<(Option<TypeNode>, String, std::ops::Range<usize>), ParseError> {
        if matches!(self.cur().kind, TokenKind::Ident(_)) && self.nth(1).kind == TokenKind::LParen
        {
            let (name, span) = self.expect_ident("function name")?;
            return Ok((None, name, span));
        }

        let receiver = self.parse_type()?;
        if self.at(&TokenKind::Dot)
            && matches!(self.nth(1).kind, TokenKind::Ident(_))
            && self.nth(2).kind == TokenKind::LParen
        {
            self.bump();
            let (name, span) = self.expect_ident("function name")?;
            return Ok((Some(receiver), name, span));
        }

        // `fun a.b.name(...)`: the reference parser swallowed the name as its last segment.
        if let TypeNode::Reference(mut reference) = receiver {
            if reference.segments.len() > 1
                && reference.args.is_empty()
                && self.at(&TokenKind::LParen)
            {
                let name = reference.segments.pop().unwrap_or_default();
                let name_start = reference.span.end - name.len();
                let name_span = name_start..reference.span.end;
                reference.span.end = name_start.saturating_sub(1);
                return Ok((Some(TypeNode::Reference(reference)), name, name_span));
            }
        }

        Err(self.error_here("expected function name".to_string()))
    }

    fn parse_type_params(&mut self) -> Result<Vec<TypeParamDecl>, ParseError> {
        self.expect(TokenKind::Lt, "`<`")?;
        let mut params = Vec::new();
        loop {
            if matches!(
                self.cur().kind,
                TokenKind::Keyword(Keyword::In | Keyword::Out)
            ) {
                return Err(self.error_here(
                    "variance is not allowed on function type parameters".to_string(),
                ));
            }
            if matches!(&self.cur().kind, TokenKind::Ident(name) if name == "reified")
                && matches!(self.nth(1).kind, TokenKind::Ident(_))
            {
                self.bump();
            }
            let (name, _) = self.expect_ident("type parameter name")?;
            let bound = if self.eat(&TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            params.push(TypeParamDecl { name, bound });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt, "`>`")?;
        Ok(params)
    }

    fn parse_param(&mut self) -> Result<ParamDecl, ParseError> {
        let is_vararg = self.eat(&TokenKind::Keyword(Keyword::Vararg));
        let (name, _) = self.expect_ident("parameter name")?;
        self.expect(TokenKind::Colon, "`:`")?;
        let ty = self.parse_type()?;
        Ok(ParamDecl {
            name,
            is_vararg,
            ty,
        })
    }

    fn parse_type(&mut self) -> Result<TypeNode, ParseError> {
        if self.depth >= MAX_TYPE_DEPTH {
            let token = self.cur();
            return Err(ParseError::new(
                "type nesting too deep",
                token.start..token.end,
            ));
        }
        self.depth += 1;
        let ty = self.parse_type_unguarded();
        self.depth -= 1;
        ty
    }

    fn parse_type_unguarded(&mut self) -> Result<TypeNode, ParseError> {
        if self.at(&TokenKind::LParen) {
            return self.parse_parenthesized_or_function_type();
        }

        let base = self.parse_simple_type()?;
        let base = self.parse_nullable_suffix(base);

        if self.at(&TokenKind::Dot) && self.nth(1).kind == TokenKind::LParen {
            self.bump();
            self.bump();
            let params = self.parse_function_type_params()?;
            self.expect(TokenKind::RParen, "`)`")?;
            self.expect(TokenKind::Arrow, "`->`")?;
            let return_type = self.parse_type()?;
            return Ok(TypeNode::Function(FunctionTypeNode {
                receiver: Some(Box::new(base)),
                params,
                return_type: Box::new(return_type),
            }));
        }

        Ok(base)
    }

    fn parse_parenthesized_or_function_type(&mut self) -> Result<TypeNode, ParseError> {
        let open = self.expect(TokenKind::LParen, "`(`")?;
        let params = self.parse_function_type_params()?;
        self.expect(TokenKind::RParen, "`)`")?;

        if self.eat(&TokenKind::Arrow) {
            let return_type = self.parse_type()?;
            return Ok(TypeNode::Function(FunctionTypeNode {
                receiver: None,
                params,
                return_type: Box::new(return_type),
            }));
        }

        let mut params = params;
        if params.len() != 1 {
            return Err(ParseError::new(
                "expected `->` after function type parameters",
                open.start..self.cur().start,
            ));
        }
        let inner = params.remove(0);
        Ok(self.parse_nullable_suffix(inner))
    }

    fn parse_function_type_params(&mut self) -> Result<Vec<TypeNode>, ParseError> {
        let mut params = Vec::new();
        if self.at(&TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            if matches!(self.cur().kind, TokenKind::Ident(_)) && self.nth(1).kind == TokenKind::Colon
            {
                self.bump();
                self.bump();
            }
            params.push(self.parse_type()?);
            if !self.eat(&TokenKind::Comma) {
                return Ok(params);
            }
        }
    }

    fn parse_nullable_suffix(&mut self, mut ty: TypeNode) -> TypeNode {
        while self.eat(&TokenKind::Question) {
            ty = TypeNode::Nullable(Box::new(ty));
        }
        ty
    }

    fn parse_simple_type(&mut self) -> Result<TypeNode, ParseError> {
        let start = self.cur().start;
        let (first, _) = self.expect_ident("a type")?;

        if first == "This" && !matches!(self.cur().kind, TokenKind::Dot | TokenKind::Lt) {
            return Ok(TypeNode::SelfType {
                span: start..self.tokens[self.pos.saturating_sub(1)].end,
            });
        }

        let mut segments = vec![first];
        while self.at(&TokenKind::Dot) && matches!(self.nth(1).kind, TokenKind::Ident(_)) {
            self.bump();
            let (segment, _) = self.expect_ident("a name segment")?;
            segments.push(segment);
        }

        let mut args = Vec::new();
        if self.eat(&TokenKind::Lt) {
            loop {
                args.push(self.parse_type_arg()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::Gt, "`>`")?;
        }

        let end = self.tokens[self.pos.saturating_sub(1)].end;
        Ok(TypeNode::Reference(TypeReference {
            segments,
            args,
            span: start..end,
        }))
    }

    fn parse_type_arg(&mut self) -> Result<TypeArgNode, ParseError> {
        if self.eat(&TokenKind::Star) {
            return Ok(TypeArgNode::Star);
        }
        let variance = if self.eat(&TokenKind::Keyword(Keyword::Out)) {
            Variance::Out
        } else if self.eat(&TokenKind::Keyword(Keyword::In)) {
            Variance::In
        } else {
            Variance::Invariant
        };
        let ty = self.parse_type()?;
        Ok(TypeArgNode::Projected { variance, ty })
    }
}
