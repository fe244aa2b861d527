// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::node::{RawProto, ValueType};
use crate::errors::SyntaxError;

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Word(String),
    Quoted(String),
    Colon,
    Open,
    Close,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    line: usize,
    column: usize,
    text: String,
}

impl Token {
    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(message, self.line, self.column, self.text.clone())
    }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
                continue;
            }

            let (line, column) = (self.line, self.column);
            let kind = match c {
                '{' => {
                    self.bump();
                    TokenKind::Open
                }
                '}' => {
                    self.bump();
                    TokenKind::Close
                }
                ':' => {
                    self.bump();
                    TokenKind::Colon
                }
                '"' | '\'' => TokenKind::Quoted(self.quoted(c, line, column)?),
                _ => TokenKind::Word(self.word()),
            };

            let text = match &kind {
                TokenKind::Word(word) => word.clone(),
                TokenKind::Quoted(value) => format!("{c}{value}{c}"),
                TokenKind::Colon => ":".to_string(),
                TokenKind::Open => "{".to_string(),
                TokenKind::Close => "}".to_string(),
            };

            tokens.push(Token {
                kind,
                line,
                column,
                text,
            });
        }

        Ok(tokens)
    }

    fn word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '{' | '}' | ':' | '"') {
                break;
            }
            word.push(c);
            self.bump();
        }
        word
    }

    fn quoted(&mut self, quote: char, line: usize, column: usize) -> Result<String, SyntaxError> {
        self.bump();
        let mut value = String::new();

        loop {
            match self.bump() {
                None => {
                    let snippet: String = std::iter::once(quote).chain(value.chars().take(20)).collect();
                    return Err(SyntaxError::new("unterminated string", line, column, snippet));
                }
                Some(c) if c == quote => return Ok(value),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(other) => value.push(other),
                    None => {
                        return Err(SyntaxError::new("unterminated string", line, column, quote.to_string()));
                    }
                },
                Some(c) => value.push(c),
            }
        }
    }
}

struct Parser {
    tokens: std::vec::IntoIter<Token>,
}

impl Parser {
    fn items(&mut self, open: Option<&Token>) -> Result<Vec<RawProto>, SyntaxError> {
        let mut items = Vec::new();

        loop {
            let Some(token) = self.tokens.next() else {
                return match open {
                    Some(open) => Err(open.error("unterminated block, missing '}'")),
                    None => Ok(items),
                };
            };

            match token.kind {
                TokenKind::Close if open.is_some() => return Ok(items),
                TokenKind::Close => return Err(token.error("unexpected '}' with no open block")),
                TokenKind::Word(ref name) => {
                    let name = name.clone();
                    items.push(self.item(name, &token)?);
                }
                _ => return Err(token.error("expected a field name")),
            }
        }
    }

    fn item(&mut self, name: String, name_token: &Token) -> Result<RawProto, SyntaxError> {
        let Some(token) = self.tokens.next() else {
            return Err(name_token.error(format!("expected ':' or '{{' after '{name}'")));
        };

        match token.kind {
            TokenKind::Open => Ok(RawProto::block(name, self.items(Some(&token))?)),
            TokenKind::Colon => self.value(name, &token),
            TokenKind::Word(_) | TokenKind::Quoted(_) => {
                Err(token.error(format!("missing ':' before the value of '{name}'")))
            }
            TokenKind::Close => Err(token.error(format!("expected ':' or '{{' after '{name}'"))),
        }
    }

    fn value(&mut self, name: String, colon: &Token) -> Result<RawProto, SyntaxError> {
        let Some(token) = self.tokens.next() else {
            return Err(colon.error(format!("':' after '{name}' is not followed by a value")));
        };

        match token.kind {
            TokenKind::Quoted(value) => Ok(RawProto::string(name, value)),
            TokenKind::Word(value) => {
                let value_type = ValueType::classify(&value);
                Ok(RawProto::scalar(name, value, value_type))
            }
            TokenKind::Open => Ok(RawProto::block(name, self.items(Some(&token))?)),
            TokenKind::Colon | TokenKind::Close => {
                Err(token.error(format!("':' after '{name}' is not followed by a value")))
            }
        }
    }
}

/// Parses description text into a tree under an implicit `root` node.
///
/// Grammar: `item := NAME ':' value | NAME ':'? '{' item* '}'`, where a value
/// is either a quoted string or a bare token. Whitespace, including
/// newlines, only separates tokens.
///
/// # Errors
/// Returns a [`SyntaxError`] locating the first malformed token: an
/// unterminated block or string, a stray `}`, a scalar without `:`, or a `:`
/// with nothing after it.
pub fn parse(text: &str) -> Result<RawProto, SyntaxError> {
    let tokens = Lexer::new(text).tokenize()?;
    let mut parser = Parser {
        tokens: tokens.into_iter(),
    };
    let children = parser.items(None)?;
    Ok(RawProto::root(children))
}
