use crate::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    Fun,
    Vararg,
    In,
    Out,
    Where,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident(String),
    Keyword(Keyword),
    LParen,
    RParen,
    Lt,
    Gt,
    Comma,
    Colon,
    Dot,
    Question,
    Star,
    Arrow,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

/// Tokenize alternative signature text. The token stream always ends with `Eof`.
pub(crate) fn lex(src: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        src,
        input: src.as_bytes(),
        pos: 0,
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    src: &'a str,
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<u8> {
        self.input.get(self.pos + 1).copied()
    }

    fn skip_ws_and_comments(&mut self) -> Result<(), ParseError> {
        loop {
            while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r' | 0x0C)) {
                self.pos += 1;
            }

            if self.peek() == Some(b'/') && self.peek2() == Some(b'/') {
                self.pos += 2;
                while let Some(b) = self.peek() {
                    self.pos += 1;
                    if b == b'\n' {
                        break;
                    }
                }
                continue;
            }

            if self.peek() == Some(b'/') && self.peek2() == Some(b'*') {
                let start = self.pos;
                self.pos += 2;
                loop {
                    match (self.peek(), self.peek2()) {
                        (Some(b'*'), Some(b'/')) => {
                            self.pos += 2;
                            break;
                        }
                        (Some(_), _) => self.pos += 1,
                        (None, _) => {
                            return Err(ParseError::new(
                                "unterminated block comment",
                                start..self.pos,
                            ));
                        }
                    }
                }
                continue;
            }

            return Ok(());
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_ws_and_comments()?;

        let start = self.pos;
        let Some(b) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                start,
                end: start,
            });
        };

        let kind = match b {
            b'(' => self.single(TokenKind::LParen),
            b')' => self.single(TokenKind::RParen),
            b'<' => self.single(TokenKind::Lt),
            b'>' => self.single(TokenKind::Gt),
            b',' => self.single(TokenKind::Comma),
            b':' => self.single(TokenKind::Colon),
            b'.' => self.single(TokenKind::Dot),
            b'?' => self.single(TokenKind::Question),
            b'*' => self.single(TokenKind::Star),
            b'-' if self.peek2() == Some(b'>') => {
                self.pos += 2;
                TokenKind::Arrow
            }
            b'`' => TokenKind::Ident(self.lex_quoted_ident()?),
            b if is_ident_start(b) => {
                let ident = self.lex_ident();
                match ident {
                    "fun" => TokenKind::Keyword(Keyword::Fun),
                    "vararg" => TokenKind::Keyword(Keyword::Vararg),
                    "in" => TokenKind::Keyword(Keyword::In),
                    "out" => TokenKind::Keyword(Keyword::Out),
                    "where" => TokenKind::Keyword(Keyword::Where),
                    _ => TokenKind::Ident(ident.to_string()),
                }
            }
            _ => {
                let ch = self.src[start..].chars().next().unwrap_or('\u{FFFD}');
                return Err(ParseError::new(
                    format!("unexpected character `{ch}`"),
                    start..start + ch.len_utf8(),
                ));
            }
        };

        Ok(Token {
            kind,
            start,
            end: self.pos,
        })
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn lex_ident(&mut self) -> &'a str {
        let start = self.pos;
        self.pos += 1;
        while let Some(b) = self.peek() {
            if is_ident_part(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
        &self.src[start..self.pos]
    }

    /// `` `name` `` escapes keywords used as identifiers.
    fn lex_quoted_ident(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let Some(len) = self.src[self.pos..].find('`') else {
            self.pos = self.input.len();
            return Err(ParseError::new(
                "unterminated quoted identifier",
                start..self.pos,
            ));
        };
        let ident = &self.src[self.pos..self.pos + len];
        self.pos += len + 1;
        if ident.is_empty() || ident.contains(['\n', '\r']) {
            return Err(ParseError::new("invalid quoted identifier", start..self.pos));
        }
        Ok(ident.to_string())
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_part(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}
