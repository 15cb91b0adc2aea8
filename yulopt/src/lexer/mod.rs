//! Lexer implementation using logos

mod token;

pub use token::Token;

use crate::ast::Span;
use crate::error::{CompileError, Result};
use logos::Logos;

/// Tokenize source code
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(_) => {
                return Err(CompileError::lexer(
                    format!("unexpected character: {:?}", lexer.slice()),
                    span,
                ));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_empty() {
        let tokens = tokenize("").unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_tokenize_keywords() {
        let tokens = tokenize("let if switch case default for function").unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            kinds,
            vec![
                Token::Let,
                Token::If,
                Token::Switch,
                Token::Case,
                Token::Default,
                Token::For,
                Token::Function,
            ]
        );
    }

    #[test]
    fn test_tokenize_statement() {
        let tokens = tokenize("let x := mload(0)").unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            kinds,
            vec![
                Token::Let,
                Token::Ident("x".to_string()),
                Token::Assign,
                Token::Ident("mload".to_string()),
                Token::LParen,
                Token::DecimalNumber("0".to_string()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_tokenize_numbers() {
        let tokens = tokenize("42 0xff").unwrap();
        assert!(matches!(&tokens[0].0, Token::DecimalNumber(n) if n == "42"));
        assert!(matches!(&tokens[1].0, Token::HexNumber(n) if n == "0xff"));
    }

    #[test]
    fn test_tokenize_disambiguated_names() {
        let tokens = tokenize("x_1 $tmp a.b").unwrap();
        assert_eq!(tokens.len(), 3);
        assert!(matches!(&tokens[2].0, Token::Ident(n) if n == "a.b"));
    }

    #[test]
    fn test_tokenize_comments() {
        let tokens = tokenize("let x // trailing\n/* block\ncomment */ := 1").unwrap();
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_tokenize_spans() {
        let tokens = tokenize("let x").unwrap();
        assert_eq!(tokens[0].1, Span::new(0, 3));
        assert_eq!(tokens[1].1, Span::new(4, 5));
    }

    #[test]
    fn test_tokenize_error() {
        assert!(tokenize("let x := #").is_err());
    }
}
