//! Tokenizer and recursive-descent parser
//!
//! Grammar (lowest to highest precedence):
//! - expr    := term (('+' | '-') term)*
//! - term    := unary (('*' | '/') unary)*
//! - unary   := ('+' | '-') unary | power
//! - power   := primary (('^' | '**') unary)?
//! - primary := number | ident | ident '(' expr ')' | '(' expr ')'
//!
//! Power is right-associative and binds tighter than unary minus, so
//! `-x^2` is `-(x^2)` and `2^-1` is `0.5`.
//!
//! Input is bounded by `MAX_TOKENS` and `MAX_NESTING` so recursion stays
//! shallow for anything a player can type.

use thiserror::Error;

use super::{BinOp, Expr, Func};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expression is empty")]
    Empty,
    #[error("unexpected character {ch:?} at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("invalid number {text:?} at offset {pos}")]
    InvalidNumber { text: String, pos: usize },
    #[error("unknown name {name:?} at offset {pos}")]
    UnknownIdentifier { name: String, pos: usize },
    #[error("unexpected {found} at offset {pos}")]
    UnexpectedToken { found: String, pos: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expression nests deeper than {limit} levels at offset {pos}")]
    TooDeep { pos: usize, limit: usize },
    #[error("expression has {len} tokens, more than the {limit} allowed")]
    TooLong { len: usize, limit: usize },
}

/// Deepest run of parentheses, calls and unary signs accepted
pub const MAX_NESTING: usize = 256;
/// Longest token stream accepted; also bounds the depth of operator chains
pub const MAX_TOKENS: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Num(n) => format!("number {n}"),
            Token::Ident(name) => format!("name {name:?}"),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Caret => "'^'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
        }
    }
}

/// Split source text into (token, byte offset) pairs
fn tokenize(src: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if ch.is_ascii_digit() || ch == '.' {
            let start = pos;
            let mut end = pos;
            let mut prev = '\0';
            while let Some(&(i, c)) = chars.peek() {
                // Exponent sign only directly after 'e'/'E'
                let exp_sign = (c == '+' || c == '-') && (prev == 'e' || prev == 'E');
                if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || exp_sign {
                    // "2e" followed by a non-digit is not scientific notation
                    if (c == 'e' || c == 'E') && !exponent_follows(&src[i + 1..]) {
                        break;
                    }
                    end = i + c.len_utf8();
                    prev = c;
                    chars.next();
                } else {
                    break;
                }
            }
            let text = &src[start..end];
            let value = text.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                text: text.to_string(),
                pos: start,
            })?;
            tokens.push((Token::Num(value), start));
            continue;
        }

        if ch.is_alphabetic() || ch == '_' {
            let start = pos;
            let mut end = pos;
            while let Some(&(i, c)) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    end = i + c.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push((Token::Ident(src[start..end].to_string()), start));
            continue;
        }

        let token = match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '*' => {
                chars.next();
                if let Some(&(_, '*')) = chars.peek() {
                    chars.next();
                    tokens.push((Token::Caret, pos));
                } else {
                    tokens.push((Token::Star, pos));
                }
                continue;
            }
            _ => return Err(ParseError::UnexpectedChar { ch, pos }),
        };
        chars.next();
        tokens.push((token, pos));
    }

    Ok(tokens)
}

/// True if `rest` (text after an 'e') starts a valid exponent
fn exponent_follows(rest: &str) -> bool {
    let rest = rest.strip_prefix(['+', '-']).unwrap_or(rest);
    rest.starts_with(|c: char| c.is_ascii_digit())
}

pub struct Parser {
    tokens: Vec<(Token, usize)>,
    cursor: usize,
    depth: usize,
}

impl Parser {
    pub fn new(src: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(src)?;
        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }
        if tokens.len() > MAX_TOKENS {
            return Err(ParseError::TooLong {
                len: tokens.len(),
                limit: MAX_TOKENS,
            });
        }
        Ok(Self {
            tokens,
            cursor: 0,
            depth: 0,
        })
    }

    /// Parse the whole token stream as one expression
    pub fn parse(mut self) -> Result<Expr, ParseError> {
        let expr = self.expr()?;
        match self.tokens.get(self.cursor) {
            None => Ok(expr),
            Some((tok, pos)) => Err(ParseError::UnexpectedToken {
                found: tok.describe(),
                pos: *pos,
            }),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let item = self.tokens.get(self.cursor).cloned();
        if item.is_some() {
            self.cursor += 1;
        }
        item
    }

    fn expect(&mut self, want: Token) -> Result<(), ParseError> {
        match self.advance() {
            Some((tok, _)) if tok == want => Ok(()),
            Some((tok, pos)) => Err(ParseError::UnexpectedToken {
                found: tok.describe(),
                pos,
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    /// Run `f` one nesting level deeper, failing past `MAX_NESTING`
    fn nested<T>(
        &mut self,
        pos: usize,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::TooDeep {
                pos,
                limit: MAX_NESTING,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn pos(&self) -> usize {
        self.tokens.get(self.cursor).map_or(0, |(_, p)| *p)
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.cursor += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.cursor += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.pos();
        match self.peek() {
            Some(Token::Minus) => {
                self.cursor += 1;
                let inner = self.nested(pos, Self::unary)?;
                Ok(Expr::Neg(Box::new(inner)))
            }
            Some(Token::Plus) => {
                self.cursor += 1;
                self.nested(pos, Self::unary)
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.primary()?;
        if let Some(Token::Caret) = self.peek() {
            let pos = self.pos();
            self.cursor += 1;
            let exponent = self.nested(pos, Self::unary)?;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let (tok, pos) = self.advance().ok_or(ParseError::UnexpectedEnd)?;
        match tok {
            Token::Num(n) => Ok(Expr::Num(n)),
            Token::LParen => self.nested(pos, |p| {
                let inner = p.expr()?;
                p.expect(Token::RParen)?;
                Ok(inner)
            }),
            Token::Ident(name) => self.identifier(name, pos),
            other => Err(ParseError::UnexpectedToken {
                found: other.describe(),
                pos,
            }),
        }
    }

    fn identifier(&mut self, name: String, pos: usize) -> Result<Expr, ParseError> {
        match name.as_str() {
            "x" => return Ok(Expr::Var),
            "pi" | "π" => return Ok(Expr::Num(std::f64::consts::PI)),
            "e" | "E" => return Ok(Expr::Num(std::f64::consts::E)),
            _ => {}
        }
        let func = Func::from_name(&name).ok_or(ParseError::UnknownIdentifier {
            name: name.clone(),
            pos,
        })?;
        self.expect(Token::LParen)?;
        let arg = self.nested(pos, |p| {
            let arg = p.expr()?;
            p.expect(Token::RParen)?;
            Ok(arg)
        })?;
        Ok(Expr::Call(func, Box::new(arg)))
    }
}
