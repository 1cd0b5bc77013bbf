// SQL module - query text parsing: expression lexing, postfix compilation and
// clause extraction for SELECT statements

pub mod lexer;
pub mod parser;
pub mod statement;
pub mod token;

pub use lexer::{tokenize, Lexer};
pub use parser::{CompiledExpression, Parser};
pub use statement::*;
pub use token::Token;
