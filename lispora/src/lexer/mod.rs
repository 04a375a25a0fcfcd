//! Lexer implementation using logos

mod token;

pub use token::{LexError, Token};

use crate::ast::Span;
use crate::error::{LoadError, Result};
use logos::Logos;

/// Tokenize source code
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(LexError::InvalidNumber) => {
                return Err(LoadError::lexer(
                    format!("invalid number: {}", lexer.slice()),
                    span,
                ));
            }
            Err(LexError::UnexpectedChar) => {
                return Err(LoadError::lexer(
                    format!("unexpected character: {:?}", lexer.slice()),
                    span,
                ));
            }
        }
    }

    Ok(tokens)
}
