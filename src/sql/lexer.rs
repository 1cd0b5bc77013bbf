// Expression lexer - tokenizes WHERE/HAVING expressions and clause bodies

use super::token::Token;
use crate::access::Value;
use crate::error::{QueryError, QueryResult};
use crate::expression::Operator;

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

/// Characters that make up an identifier, keyword or number
pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || ch == '*'
}

/// `digits` or `digits.digits`
fn is_number(word: &str) -> bool {
    let mut parts = word.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let valid = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
    match parts.next() {
        Some(fraction) => valid(whole) && valid(fraction),
        None => valid(whole),
    }
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let input: Vec<char> = input.chars().collect();
        let current_char = input.first().copied();
        Lexer {
            input,
            position: 0,
            current_char,
        }
    }

    /// Get the next token from the input, or `None` at the end
    pub fn next_token(&mut self) -> QueryResult<Option<Token>> {
        self.skip_whitespace();

        let Some(ch) = self.current_char else {
            return Ok(None);
        };

        let token = match ch {
            '(' => {
                self.advance();
                Token::LeftParen
            }
            ')' => {
                self.advance();
                Token::RightParen
            }
            ',' => {
                self.advance();
                Token::Comma
            }
            '>' | '<' | '!' if self.peek() == Some('=') => {
                self.advance();
                self.advance();
                Token::Operator(match ch {
                    '>' => Operator::Ge,
                    '<' => Operator::Le,
                    _ => Operator::Ne,
                })
            }
            '=' => {
                self.advance();
                Token::Operator(Operator::Eq)
            }
            '>' => {
                self.advance();
                Token::Operator(Operator::Gt)
            }
            '<' => {
                self.advance();
                Token::Operator(Operator::Lt)
            }
            '\'' | '"' => self.read_string(ch)?,
            c if is_word_char(c) => self.read_word(),
            _ => return Err(self.unexpected(ch)),
        };

        Ok(Some(token))
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    /// Peek at the next character without advancing
    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn source(&self) -> String {
        self.input.iter().collect()
    }

    fn unexpected(&self, ch: char) -> QueryError {
        QueryError::Lexical {
            ch,
            position: self.position,
            input: self.source(),
        }
    }

    /// Read a keyword operator, number or identifier
    fn read_word(&mut self) -> Token {
        let mut word = String::new();

        while let Some(ch) = self.current_char {
            if is_word_char(ch) {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if let Some(op) = Operator::from_keyword(&word) {
            return Token::Operator(op);
        }

        if is_number(&word) {
            return Token::Literal(Self::parse_number(&word));
        }

        Token::Identifier(word)
    }

    fn parse_number(word: &str) -> Value {
        if !word.contains('.') {
            if let Ok(i) = word.parse::<i64>() {
                return Value::Integer(i);
            }
        }
        // Too large for an integer or has a fraction
        word.parse::<f64>().map(Value::Float).unwrap_or(Value::Null)
    }

    /// Read a string literal delimited by `quote`. A backslash before the
    /// quote character keeps it inside the literal.
    fn read_string(&mut self, quote: char) -> QueryResult<Token> {
        let start = self.position;
        self.advance(); // Skip opening quote
        let mut string = String::new();

        while let Some(ch) = self.current_char {
            if ch == '\\' && self.peek() == Some(quote) {
                string.push(quote);
                self.advance();
                self.advance();
            } else if ch == quote {
                self.advance(); // Skip closing quote
                return Ok(Token::Literal(Value::String(string)));
            } else {
                string.push(ch);
                self.advance();
            }
        }

        Err(QueryError::UnterminatedString {
            position: start,
            input: self.source(),
        })
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> QueryResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}

/// Tokenize a complete expression string
pub fn tokenize(input: &str) -> QueryResult<Vec<Token>> {
    Lexer::new(input).tokenize()
}
