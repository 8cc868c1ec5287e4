//! Lex a GPR string into a series of tokens for later parsing

use thiserror::Error;

use crate::io::gpr_parse::token::Token;

pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
        }
    }

    /// Convert the source string into tokens, always terminated by [`Token::Eof`]
    pub fn lex(mut self) -> Result<Vec<Token>, LexerError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.tokens.push(Token::Eof);
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), LexerError> {
        let c: char = self.advance();
        match c {
            // Single Character Tokens
            '(' => self.add_token(Token::LeftParen),
            ')' => self.add_token(Token::RightParen),
            // Identifiers and Operators
            c if Lexer::is_identifier_char(c) => self.read_identifier(),
            // Whitespace
            ' ' | '\r' | '\n' | '\t' => {}
            _ => return Err(LexerError::InvalidToken(c, self.start)),
        };
        Ok(())
    }

    fn advance(&mut self) -> char {
        let char_at_current = self.source[self.current];
        self.current += 1;
        char_at_current
    }

    fn read_identifier(&mut self) {
        while !self.is_at_end() && Lexer::is_identifier_char(self.peek()) {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();

        match text.as_str() {
            "and" | "And" | "AND" => self.add_token(Token::And),
            "or" | "Or" | "OR" => self.add_token(Token::Or),
            "not" | "Not" | "NOT" => self.add_token(Token::Not),
            gene => self.add_token(Token::Identifier(gene.to_string())),
        }
    }

    /// Gene ids are made of alphanumerics plus a few separators (e.g. "b0001", "2597.1",
    /// "G_Rv0001-A")
    fn is_identifier_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | ':')
    }

    fn peek(&self) -> char {
        self.source[self.current]
    }

    fn add_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum LexerError {
    #[error("Invalid character {0:?} at position {1}")]
    InvalidToken(char, usize),
}

#[cfg(test)]
mod tests {
    use crate::io::gpr_parse::lexer::{Lexer, LexerError};
    use crate::io::gpr_parse::token::Token;

    #[test]
    fn test_single_gene() {
        let tokens = Lexer::new("Rv0023").lex().unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], Token::Identifier(String::from("Rv0023")));
    }

    #[test]
    fn test_grouping() {
        let tokens = Lexer::new("(Rv0023 or 2597.1)").lex().unwrap();
        let expected_tokens = vec![
            Token::LeftParen,
            Token::Identifier(String::from("Rv0023")),
            Token::Or,
            Token::Identifier(String::from("2597.1")),
            Token::RightParen,
            Token::Eof,
        ];
        assert_eq!(tokens, expected_tokens);
    }

    #[test]
    fn test_operators_any_case() {
        let tokens = Lexer::new("a AND b Or NOT c").lex().unwrap();
        assert_eq!(tokens[1], Token::And);
        assert_eq!(tokens[3], Token::Or);
        assert_eq!(tokens[4], Token::Not);
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(
            Lexer::new("b1 & b2").lex(),
            Err(LexerError::InvalidToken('&', 3))
        );
    }
}
