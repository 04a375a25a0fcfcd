//! Parser implementation using lalrpop

use crate::ast::{Node, Span};
use crate::error::{LoadError, Result};
use crate::lexer::{tokenize, Token};


lalrpop_util::lalrpop_mod!(
    #[allow(clippy::all)]
    grammar
);

/// Parse tokens into the top-level forms of a program
pub fn parse(_filename: &str, source: &str, tokens: Vec<(Token, Span)>) -> Result<Vec<Node>> {
    let token_iter = tokens
        .into_iter()
        .map(|(tok, span)| (span.start, tok, span.end));

    grammar::ProgramParser::new()
        .parse(token_iter)
        .map_err(|e| {
            let span = match &e {
                lalrpop_util::ParseError::InvalidToken { location } => Span::new(*location, *location + 1),
                lalrpop_util::ParseError::UnrecognizedEof { .. } => {
                    Span::new(source.len(), source.len())
                }
                lalrpop_util::ParseError::UnrecognizedToken { token, .. } => {
                    Span::new(token.0, token.2)
                }
                lalrpop_util::ParseError::ExtraToken { token } => Span::new(token.0, token.2),
                lalrpop_util::ParseError::User { .. } => Span::new(0, 0),
            };
            LoadError::parser(format!("{e}"), span)
        })
}

/// Tokenize and parse a whole source text
pub fn parse_source(filename: &str, source: &str) -> Result<Vec<Node>> {
    let tokens = tokenize(source)?;
    parse(filename, source, tokens)
}
