//! Single-pass tokeniser.

use crate::consts::MAX_IDENT_LEN;
use crate::token::{keyword_kind, Token, TokenKind};

/// Converts source text into a stream of [`Token`]s with one-token
/// lookahead. Whitespace and `(* … *)` block comments (non-nesting) are
/// skipped transparently.
pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
    peeked: Option<Token>,
    at_eof: bool,
}

impl<'a> Lexer<'a> {
    /// Builds a lexer over `source`. The source is expected to be UTF-8 text;
    /// non-ASCII bytes inside identifiers/strings are treated byte-wise,
    /// which is sufficient for the ASCII-only ST keyword surface.
    pub fn new(source: &'a str) -> Self {
        Lexer {
            src: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            peeked: None,
            at_eof: false,
        }
    }

    /// Returns the next token, consuming it.
    pub fn next_token(&mut self) -> Token {
        if let Some(tok) = self.peeked.take() {
            return tok;
        }
        self.scan_token()
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> &Token {
        if self.peeked.is_none() {
            self.peeked = Some(self.scan_token());
        }
        self.peeked.as_ref().expect("just populated")
    }

    fn byte(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.byte()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.byte() {
                Some(b) if b.is_ascii_whitespace() => {
                    self.advance();
                }
                Some(b'(') if self.byte_at(1) == Some(b'*') => {
                    self.advance();
                    self.advance();
                    loop {
                        match self.byte() {
                            None => break,
                            Some(b'*') if self.byte_at(1) == Some(b')') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            _ => {
                                self.advance();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let line = self.line;
        let column = self.column;

        let Some(b) = self.byte() else {
            self.at_eof = true;
            return Token::new(TokenKind::Eof, "", line, column);
        };

        if b.is_ascii_alphabetic() || b == b'_' {
            return self.scan_ident_or_keyword(line, column);
        }
        if b.is_ascii_digit() {
            return self.scan_number(line, column);
        }
        if b == b'\'' || b == b'"' {
            return self.scan_string(b, line, column);
        }

        self.scan_operator(line, column)
    }

    fn scan_ident_or_keyword(&mut self, line: u32, column: u32) -> Token {
        let start = self.pos;
        while matches!(self.byte(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.advance();
        }
        let raw = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or("");
        let lower = raw.to_ascii_lowercase();
        if let Some(kind) = keyword_kind(&lower) {
            return Token::new(kind, raw, line, column);
        }
        let truncated: String = raw.chars().take(MAX_IDENT_LEN).collect();
        Token::new(TokenKind::Ident, truncated, line, column)
    }

    /// Integer literals: decimal, `0x…` hex, or `2#…` based binary. Real
    /// literals require a fractional part; a bare integer followed by `.`
    /// with no following digit is *not* promoted to real.
    fn scan_number(&mut self, line: u32, column: u32) -> Token {
        let start = self.pos;

        if self.byte() == Some(b'0') && matches!(self.byte_at(1), Some(b'x') | Some(b'X')) {
            self.advance();
            self.advance();
            while matches!(self.byte(), Some(b) if b.is_ascii_hexdigit()) {
                self.advance();
            }
            return self.int_token(start, line, column);
        }

        if self.byte() == Some(b'2') && self.byte_at(1) == Some(b'#') {
            self.advance();
            self.advance();
            while matches!(self.byte(), Some(b'0') | Some(b'1')) {
                self.advance();
            }
            return self.int_token(start, line, column);
        }

        while matches!(self.byte(), Some(b) if b.is_ascii_digit()) {
            self.advance();
        }

        if self.byte() == Some(b'.') && matches!(self.byte_at(1), Some(b) if b.is_ascii_digit()) {
            self.advance(); // '.'
            while matches!(self.byte(), Some(b) if b.is_ascii_digit()) {
                self.advance();
            }
            if matches!(self.byte(), Some(b'e') | Some(b'E')) {
                let save = self.pos;
                self.advance();
                if matches!(self.byte(), Some(b'+') | Some(b'-')) {
                    self.advance();
                }
                if matches!(self.byte(), Some(b) if b.is_ascii_digit()) {
                    while matches!(self.byte(), Some(b) if b.is_ascii_digit()) {
                        self.advance();
                    }
                } else {
                    self.pos = save;
                }
            }
            let lexeme = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or("").to_string();
            return Token::new(TokenKind::RealLiteral, lexeme, line, column);
        }

        self.int_token(start, line, column)
    }

    fn int_token(&mut self, start: usize, line: u32, column: u32) -> Token {
        let lexeme = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or("").to_string();
        Token::new(TokenKind::IntLiteral, lexeme, line, column)
    }

    /// `'…'` or `"…"`; the opening quote is also the terminator, `\<quote>`
    /// escapes the quote character.
    fn scan_string(&mut self, quote: u8, line: u32, column: u32) -> Token {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.byte() {
                None => break,
                Some(b'\\') if self.byte_at(1) == Some(quote) => {
                    self.advance();
                    self.advance();
                    value.push(quote as char);
                }
                Some(b) if b == quote => {
                    self.advance();
                    break;
                }
                Some(b) => {
                    self.advance();
                    value.push(b as char);
                }
            }
        }
        Token::new(TokenKind::StringLiteral, value, line, column)
    }

    fn scan_operator(&mut self, line: u32, column: u32) -> Token {
        use TokenKind::*;
        let two = (self.byte(), self.byte_at(1));
        let two_char = match two {
            (Some(b':'), Some(b'=')) => Some(Assign),
            (Some(b'<'), Some(b'>')) => Some(Ne),
            (Some(b'<'), Some(b'=')) => Some(Le),
            (Some(b'>'), Some(b'=')) => Some(Ge),
            (Some(b'*'), Some(b'*')) => Some(Pow),
            _ => None,
        };
        if let Some(kind) = two_char {
            self.advance();
            self.advance();
            return Token::new(kind, two_char_lexeme(kind), line, column);
        }

        let Some(b) = self.advance() else {
            return Token::new(Eof, "", line, column);
        };
        let kind = match b {
            b'=' => Eq,
            b'<' => Lt,
            b'>' => Gt,
            b'+' => Plus,
            b'-' => Minus,
            b'*' => Star,
            b'/' => Slash,
            b'(' => LParen,
            b')' => RParen,
            b'[' => LBracket,
            b']' => RBracket,
            b';' => Semicolon,
            b',' => Comma,
            b':' => Colon,
            other => {
                return Token::new(Error, (other as char).to_string(), line, column);
            }
        };
        Token::new(kind, (b as char).to_string(), line, column)
    }
}

fn two_char_lexeme(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Assign => ":=",
        TokenKind::Ne => "<>",
        TokenKind::Le => "<=",
        TokenKind::Ge => ">=",
        TokenKind::Pow => "**",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lex = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lex.next_token();
            if tok.kind == TokenKind::Eof {
                break;
            }
            out.push(tok.kind);
        }
        out
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(kinds("iF tHeN"), vec![TokenKind::If, TokenKind::Then]);
    }

    #[test]
    fn comments_do_not_nest() {
        // The inner "(*" is just text; the comment closes at the first "*)".
        let mut lex = Lexer::new("(* outer (* inner *) x");
        let tok = lex.next_token();
        assert_eq!(tok.kind, TokenKind::Ident);
        assert_eq!(tok.lexeme, "x");
    }

    #[test]
    fn bare_integer_followed_by_dot_is_not_a_real() {
        let mut lex = Lexer::new("12.");
        let first = lex.next_token();
        assert_eq!(first.kind, TokenKind::IntLiteral);
        assert_eq!(first.lexeme, "12");
        let second = lex.next_token();
        assert_eq!(second.kind, TokenKind::Colon);
    }

    #[test]
    fn real_literal_with_exponent() {
        let mut lex = Lexer::new("4.56e-10");
        let tok = lex.next_token();
        assert_eq!(tok.kind, TokenKind::RealLiteral);
        assert_eq!(tok.lexeme, "4.56e-10");
    }

    #[test]
    fn hex_and_based_binary_literals() {
        assert_eq!(kinds("0x1A2B"), vec![TokenKind::IntLiteral]);
        assert_eq!(kinds("2#1010"), vec![TokenKind::IntLiteral]);
    }

    #[test]
    fn two_char_operators_win_over_one_char_prefixes() {
        assert_eq!(kinds(":="), vec![TokenKind::Assign]);
        assert_eq!(kinds("<>"), vec![TokenKind::Ne]);
        assert_eq!(kinds("<="), vec![TokenKind::Le]);
    }

    #[test]
    fn unrecognised_character_yields_error_token() {
        let mut lex = Lexer::new("@");
        let tok = lex.next_token();
        assert_eq!(tok.kind, TokenKind::Error);
        assert_eq!(tok.lexeme, "@");
    }

    #[test]
    fn eof_is_sticky() {
        let mut lex = Lexer::new("");
        assert_eq!(lex.next_token().kind, TokenKind::Eof);
        assert_eq!(lex.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn string_literal_escape_of_quote_char() {
        let mut lex = Lexer::new(r#"'it\'s ok'"#);
        let tok = lex.next_token();
        assert_eq!(tok.kind, TokenKind::StringLiteral);
        assert_eq!(tok.lexeme, "it's ok");
    }

    #[test]
    fn identifier_truncated_beyond_63_chars() {
        let long = "a".repeat(100);
        let mut lex = Lexer::new(&long);
        let tok = lex.next_token();
        assert_eq!(tok.lexeme.len(), MAX_IDENT_LEN);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lex = Lexer::new("IF THEN");
        assert_eq!(lex.peek().kind, TokenKind::If);
        assert_eq!(lex.next_token().kind, TokenKind::If);
        assert_eq!(lex.next_token().kind, TokenKind::Then);
    }
}
