//! # Lexer
//!
//! Converts Lyn source text into a token stream. Unlike a table-driven
//! generated scanner, this is a direct hand-written character walk, mirroring
//! the reference implementation's scanner but replacing its hidden global
//! cursor with an explicit, `Copy` [`LexerState`] that both the lexer and the
//! parser can save and restore — the mechanism the parser's lambda lookahead
//! (see [`crate::compiler::parser`]) depends on.

use crate::compiler::error::CompileError;

/// The closed set of token kinds the grammar recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum TokenKind {
    Eof,
    Identifier,
    Number,
    StringLit,

    Assign,
    Plus,
    Minus,
    Asterisk,
    Slash,
    LParen,
    RParen,
    Comma,
    Dot,
    Semicolon,
    Colon,
    LBracket,
    RBracket,

    Arrow,
    FatArrow,

    Gt,
    Lt,
    Gte,
    Lte,
    Eq,
    Neq,

    Func,
    Return,
    Print,
    Class,
    If,
    Else,
    For,
    In,
    End,
    Import,
    Ui,
    Css,
    RegisterEvent,
    Range,
    Int,
    Float,

    Unknown,
}

/// A single scanned token with its source position (the position of its
/// first character).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub col: usize,
}

/// A cheap, `Copy` snapshot of scanner position. Restoring one makes the
/// next `next_token` call byte-identical to the call that would have
/// followed the original `save_state`.
#[derive(Debug, Clone, Copy)]
pub struct LexerState {
    position: usize,
    line: usize,
    col: usize,
}

/// Incremental scanner over a source buffer.
pub struct Lexer<'a> {
    source: &'a [u8],
    position: usize,
    line: usize,
    col: usize,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source: source.as_bytes(),
            position: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn save_state(&self) -> LexerState {
        LexerState {
            position: self.position,
            line: self.line,
            col: self.col,
        }
    }

    pub fn restore_state(&mut self, state: LexerState) {
        self.position = state.position;
        self.line = state.line;
        self.col = state.col;
    }

    fn peek(&self) -> u8 {
        *self.source.get(self.position).unwrap_or(&0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        *self.source.get(self.position + offset).unwrap_or(&0)
    }

    fn advance(&mut self) -> u8 {
        let b = self.peek();
        self.position += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        b
    }

    fn skip_trivia(&mut self) -> Result<(), CompileError> {
        loop {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.advance();
                }
                b'/' if self.peek_at(1) == b'/' => {
                    while self.peek() != b'\n' && self.peek() != 0 {
                        self.advance();
                    }
                }
                b'/' if self.peek_at(1) == b'*' => {
                    let (start_line, start_col) = (self.line, self.col);
                    self.advance();
                    self.advance();
                    loop {
                        if self.peek() == 0 {
                            return Err(CompileError::lex(
                                start_line,
                                start_col,
                                "unterminated block comment",
                            ));
                        }
                        if self.peek() == b'*' && self.peek_at(1) == b'/' {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Produces the next token, advancing the scanner.
    pub fn next_token(&mut self) -> Result<Token, CompileError> {
        self.skip_trivia()?;

        let (line, col) = (self.line, self.col);
        if self.peek() == 0 {
            return Ok(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                line,
                col,
            });
        }

        let c = self.peek();

        if is_ident_start(c) {
            let start = self.position;
            while is_ident_continue(self.peek()) {
                self.advance();
            }
            let lexeme = String::from_utf8_lossy(&self.source[start..self.position]).into_owned();
            let kind = keyword_kind(&lexeme).unwrap_or(TokenKind::Identifier);
            return Ok(Token {
                kind,
                lexeme,
                line,
                col,
            });
        }

        if c.is_ascii_digit() || (c == b'.' && self.peek_at(1).is_ascii_digit()) {
            let start = self.position;
            while self.peek().is_ascii_digit() || self.peek() == b'.' {
                self.advance();
            }
            let lexeme = String::from_utf8_lossy(&self.source[start..self.position]).into_owned();
            return Ok(Token {
                kind: TokenKind::Number,
                lexeme,
                line,
                col,
            });
        }

        if c == b'"' {
            self.advance();
            let start = self.position;
            while self.peek() != b'"' && self.peek() != 0 && self.peek() != b'\n' {
                self.advance();
            }
            if self.peek() != b'"' {
                return Err(CompileError::lex(line, col, "unterminated string literal"));
            }
            let lexeme = String::from_utf8_lossy(&self.source[start..self.position]).into_owned();
            self.advance();
            return Ok(Token {
                kind: TokenKind::StringLit,
                lexeme,
                line,
                col,
            });
        }

        macro_rules! one {
            ($kind:expr, $lexeme:expr) => {{
                self.advance();
                Ok(Token {
                    kind: $kind,
                    lexeme: $lexeme.to_string(),
                    line,
                    col,
                })
            }};
        }
        macro_rules! two {
            ($kind:expr, $lexeme:expr) => {{
                self.advance();
                self.advance();
                Ok(Token {
                    kind: $kind,
                    lexeme: $lexeme.to_string(),
                    line,
                    col,
                })
            }};
        }

        match c {
            b'=' if self.peek_at(1) == b'=' => two!(TokenKind::Eq, "=="),
            b'=' if self.peek_at(1) == b'>' => two!(TokenKind::FatArrow, "=>"),
            b'=' => one!(TokenKind::Assign, "="),
            b'+' => one!(TokenKind::Plus, "+"),
            b'-' if self.peek_at(1) == b'>' => two!(TokenKind::Arrow, "->"),
            b'-' => one!(TokenKind::Minus, "-"),
            b'*' => one!(TokenKind::Asterisk, "*"),
            b'/' => one!(TokenKind::Slash, "/"),
            b'(' => one!(TokenKind::LParen, "("),
            b')' => one!(TokenKind::RParen, ")"),
            b',' => one!(TokenKind::Comma, ","),
            b'.' => one!(TokenKind::Dot, "."),
            b';' => one!(TokenKind::Semicolon, ";"),
            b':' => one!(TokenKind::Colon, ":"),
            b'[' => one!(TokenKind::LBracket, "["),
            b']' => one!(TokenKind::RBracket, "]"),
            b'>' if self.peek_at(1) == b'=' => two!(TokenKind::Gte, ">="),
            b'>' => one!(TokenKind::Gt, ">"),
            b'<' if self.peek_at(1) == b'=' => two!(TokenKind::Lte, "<="),
            b'<' => one!(TokenKind::Lt, "<"),
            b'!' if self.peek_at(1) == b'=' => two!(TokenKind::Neq, "!="),
            _ => {
                self.advance();
                Ok(Token {
                    kind: TokenKind::Unknown,
                    lexeme: (c as char).to_string(),
                    line,
                    col,
                })
            }
        }
    }
}

fn keyword_kind(lexeme: &str) -> Option<TokenKind> {
    Some(match lexeme {
        "func" => TokenKind::Func,
        "return" => TokenKind::Return,
        "print" => TokenKind::Print,
        "class" => TokenKind::Class,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "end" => TokenKind::End,
        "import" => TokenKind::Import,
        "ui" => TokenKind::Ui,
        "css" => TokenKind::Css,
        "register_event" => TokenKind::RegisterEvent,
        "range" => TokenKind::Range,
        "int" => TokenKind::Int,
        "float" => TokenKind::Float,
        _ => return None,
    })
}

/// Drives a fresh [`Lexer`] to completion, collecting every token. Used by
/// the CLI's diagnostic `test` subcommand and by tests; the parser itself
/// drives a `Lexer` incrementally rather than consuming this Vec, so it can
/// checkpoint mid-stream for lambda lookahead.
pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_restores_identical_suffix() {
        let mut lexer = Lexer::new("a b c");
        let first = lexer.next_token().unwrap();
        assert_eq!(first.lexeme, "a");
        let checkpoint = lexer.save_state();
        let second = lexer.next_token().unwrap();
        assert_eq!(second.lexeme, "b");
        lexer.restore_state(checkpoint);
        let replay = lexer.next_token().unwrap();
        assert_eq!(replay.lexeme, "b");
        assert_eq!(lexer.next_token().unwrap().lexeme, "c");
    }

    #[test]
    fn skips_line_and_block_comments() {
        let tokens = tokenize("x // comment\n/* block */y").unwrap();
        let idents: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(idents, vec!["x", "y"]);
    }

    #[test]
    fn unterminated_block_comment_is_fatal() {
        assert!(tokenize("/* never closes").is_err());
    }

    #[test]
    fn unterminated_string_is_fatal() {
        assert!(tokenize("\"oops").is_err());
    }

    #[test]
    fn bare_bang_is_unknown_not_error() {
        let tokens = tokenize("!").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Unknown);
    }

    #[test]
    fn disambiguates_multichar_operators() {
        let tokens = tokenize("-> => == != >= <=").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Arrow,
                TokenKind::FatArrow,
                TokenKind::Eq,
                TokenKind::Neq,
                TokenKind::Gte,
                TokenKind::Lte,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn number_preserves_lexeme_verbatim() {
        let tokens = tokenize("3.14").unwrap();
        assert_eq!(tokens[0].lexeme, "3.14");
    }
}
