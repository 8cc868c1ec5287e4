//! Module for parsing Gene Protein Reaction strings into GPR associations

use crate::io::gpr_parse::lexer::LexerError;
use crate::io::gpr_parse::parser::ParseError;
use crate::metabolic_model::gene::GprAssociation;
use thiserror::Error;

mod lexer;
pub mod parser;
mod token;

/// Parse a Gene Protein Reaction string into a GPR association
///
/// # Parameters
/// - `input`: &str representing the gene protein reaction rule
///
/// # Returns
/// Parse result which is
/// - `Ok`: `Some` GPR association in disjunctive normal form, or `None` if the rule is blank
///     (no genetic requirement is known for the reaction).
/// - `Err`: Returns the GprParseError describing the issue with the GPR rule which
///     was being parsed.
///
/// Expanding a rule into disjunctive normal form multiplies out every AND of ORs, so rules
/// expanding to more than [`parser::MAX_ALTERNATIVES`] proteins are rejected.
///
/// # Examples
/// ```rust
/// use consortia_core::io::gpr_parse::parse_gpr;
/// let gpr_tree = parse_gpr("Rv0001 and (Rv0002 or Rv0003)").unwrap().unwrap();
/// assert_eq!(gpr_tree.to_string(), "(Rv0001 and Rv0002) or (Rv0001 and Rv0003)");
/// assert!(parse_gpr("").unwrap().is_none());
/// ```
pub fn parse_gpr(input: &str) -> Result<Option<GprAssociation>, GprParseError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    // Convert the GPR string into tokens
    let tokens = lexer::Lexer::new(input).lex()?;

    // Now parse those tokens into a GPR association
    let mut parser = parser::GPRParser::new(tokens);
    let gpr = parser.parse()?;
    Ok(Some(gpr))
}

/// Enum representing possible lex and parse errors
#[derive(Debug, Error, PartialEq, Clone)]
pub enum GprParseError {
    /// Lexing Error
    #[error("Error occurred during lexing (conversion of GPR string to tokens)")]
    LexingError(#[from] LexerError),
    /// Parsing Error
    #[error("Error occurred during parsing (conversion of tokens to GPR association)")]
    ParsingError(#[from] ParseError),
    /// The rule is blank
    #[error("GPR rule is empty")]
    EmptyRule,
}
