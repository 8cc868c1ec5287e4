use indexmap::IndexSet;
use thiserror::Error;

use crate::io::gpr_parse::token::Token;
use crate::metabolic_model::gene::{GprAssociation, Protein};

/*
GPR Grammar:
expression -> conjunction ( "OR" conjunction )* ;
conjunction -> primary ( "AND" primary )* ;
primary -> GENE | "(" expression ")" ;

e.g. ( Gene1 AND Gene2) OR (Gene3 AND Gene4)

Every rule evaluates straight to disjunctive normal form: a list of alternatives, each
alternative being the list of genes that must all be present.
 */

/// Alternatives (OR) of gene sets (AND)
type Dnf = Vec<Vec<String>>;

/// Largest number of proteins a rule may expand to
pub const MAX_ALTERNATIVES: usize = 4096;

/// GPR Parser
pub struct GPRParser {
    /// Vector of tokens from the GPR string
    tokens: Vec<Token>,
    /// Current token being processed
    current: usize,
}

impl GPRParser {
    /// Create a new GPRParser
    pub fn new(tokens: Vec<Token>) -> GPRParser {
        GPRParser { tokens, current: 0 }
    }

    // region Parsing Functions

    /// Parse the token vector into a GPR association
    pub fn parse(&mut self) -> Result<GprAssociation, ParseError> {
        let dnf = self.expression()?;
        if !self.is_at_end() {
            // If entire expression has not been parsed, and error has occured
            return Err(ParseError::EarlyTermination(self.current));
        }
        let proteins = dnf.into_iter().map(Protein::new).collect();
        Ok(GprAssociation::new(proteins))
    }

    fn expression(&mut self) -> Result<Dnf, ParseError> {
        let mut alternatives: IndexSet<Vec<String>> = self.conjunction()?.into_iter().collect();

        while self.match_token(Token::Or) {
            alternatives.extend(self.conjunction()?);
            if alternatives.len() > MAX_ALTERNATIVES {
                return Err(ParseError::TooManyAlternatives(MAX_ALTERNATIVES));
            }
        }
        Ok(alternatives.into_iter().collect())
    }

    fn conjunction(&mut self) -> Result<Dnf, ParseError> {
        let mut alternatives = self.primary()?;

        while self.match_token(Token::And) {
            let right = self.primary()?;
            if alternatives.len().saturating_mul(right.len()) > MAX_ALTERNATIVES {
                return Err(ParseError::TooManyAlternatives(MAX_ALTERNATIVES));
            }
            // AND distributes over OR: (a or b) and c == (a and c) or (b and c)
            let mut product: IndexSet<Vec<String>> =
                IndexSet::with_capacity(alternatives.len() * right.len());
            for left_genes in &alternatives {
                for right_genes in &right {
                    let mut genes: IndexSet<&String> = left_genes.iter().collect();
                    genes.extend(right_genes);
                    product.insert(genes.into_iter().cloned().collect());
                }
            }
            alternatives = product.into_iter().collect();
        }
        Ok(alternatives)
    }

    fn primary(&mut self) -> Result<Dnf, ParseError> {
        if let Some(identifier) = self.match_identifier() {
            return Ok(vec![vec![identifier]]);
        }

        if self.match_token(Token::LeftParen) {
            let expr = self.expression()?;
            self.consume(Token::RightParen, "Expect ')' after expression.")?;
            return Ok(expr);
        }

        if self.check(&Token::Not) {
            return Err(ParseError::Negation);
        }

        Err(ParseError::ExpectedExpression(self.current))
    }

    // endregion Parsing Functions

    // region parsing helper functions

    /// Check whether the token at the current position matches `token`, if it does advance
    /// [`self.current`] and return true, otherwise return false
    fn match_token(&mut self, token: Token) -> bool {
        if self.check(&token) {
            self.advance();
            return true;
        }
        false
    }

    /// Similar to [`match_token`], but for matching an identifier token. If the current
    /// token is an identifier return `Some(GeneId)`, where GeneId is the gene's string identifier,
    /// otherwise return None
    fn match_identifier(&mut self) -> Option<String> {
        if let Token::Identifier(id) = self.peek() {
            let id = id.clone();
            self.advance();
            return Some(id);
        }
        None
    }

    /// Check whether the current token matches the provided `token`
    fn check(&self, token: &Token) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.peek() == token
    }

    /// Advance `self.current` one position unless at end of GPR Vec
    fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    /// Check whether the parser is at the end of the source Vec
    fn is_at_end(&self) -> bool {
        *self.peek() == Token::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    /// Check whether the current token matches an input token, if it matches advance to the
    /// next token, and if it doesn't return an error. Used mainly for matching parenthesis in
    /// source GPR vec.
    fn consume(&mut self, token: Token, msg: &str) -> Result<(), ParseError> {
        if self.check(&token) {
            self.advance();
            return Ok(());
        }

        Err(ParseError::MissingToken(msg.to_string()))
    }

    // endregion parsing helper functions
}

/// Enum representing possible parse errors
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ParseError {
    /// A gene or a parenthesised expression was expected
    #[error("Expected a gene or '(' at token {0}")]
    ExpectedExpression(usize),
    /// A required token (such as a closing parenthesis) is missing
    #[error("{0}")]
    MissingToken(String),
    /// Parsing stopped before consuming every token
    #[error("Unexpected token at position {0}")]
    EarlyTermination(usize),
    /// Negated genes can't be expressed as a list of proteins
    #[error("Negation is not supported in GPR associations")]
    Negation,
    /// Expanding the rule would give more proteins than the limit
    #[error("Rule expands to more than {0} proteins")]
    TooManyAlternatives(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::gpr_parse::lexer::Lexer;

    fn parse(rule: &str) -> Result<Vec<Vec<String>>, ParseError> {
        let tokens = Lexer::new(rule).lex().unwrap();
        let gpr = GPRParser::new(tokens).parse()?;
        Ok(gpr.proteins.into_iter().map(|p| p.genes).collect())
    }

    fn dnf(alternatives: &[&[&str]]) -> Vec<Vec<String>> {
        alternatives
            .iter()
            .map(|genes| genes.iter().map(|g| g.to_string()).collect())
            .collect()
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert_eq!(
            parse("b1 or b2 and b3").unwrap(),
            dnf(&[&["b1"], &["b2", "b3"]])
        );
    }

    #[test]
    fn distributes_and_over_or() {
        assert_eq!(
            parse("b1 and (b2 or b3)").unwrap(),
            dnf(&[&["b1", "b2"], &["b1", "b3"]])
        );
        assert_eq!(
            parse("(b1 or b2) and (b3 or b4)").unwrap(),
            dnf(&[&["b1", "b3"], &["b1", "b4"], &["b2", "b3"], &["b2", "b4"]])
        );
    }

    #[test]
    fn removes_repeated_genes_and_proteins() {
        assert_eq!(parse("b1 and b1").unwrap(), dnf(&[&["b1"]]));
        assert_eq!(parse("(b1 and b2) or (b1 and b2)").unwrap(), dnf(&[&["b1", "b2"]]));
    }

    #[test]
    fn malformed_rules() {
        assert_eq!(parse("b1 and not b2"), Err(ParseError::Negation));
        assert!(matches!(parse("(b1 or b2"), Err(ParseError::MissingToken(_))));
        assert!(matches!(parse("b1 b2"), Err(ParseError::EarlyTermination(1))));
        assert!(matches!(parse("b1 or"), Err(ParseError::ExpectedExpression(2))));
    }

    #[test]
    fn expansion_is_capped() {
        // 2^12 proteins is right at the limit, one more factor goes over it
        let factors = |n: usize| {
            (0..n)
                .map(|i| format!("(a{i} or b{i})"))
                .collect::<Vec<_>>()
                .join(" and ")
        };
        assert_eq!(parse(&factors(12)).unwrap().len(), MAX_ALTERNATIVES);
        assert_eq!(
            parse(&factors(13)),
            Err(ParseError::TooManyAlternatives(MAX_ALTERNATIVES))
        );
        let wide = (0..=MAX_ALTERNATIVES)
            .map(|i| format!("g{i}"))
            .collect::<Vec<_>>()
            .join(" or ");
        assert_eq!(
            parse(&wide),
            Err(ParseError::TooManyAlternatives(MAX_ALTERNATIVES))
        );
    }
}
