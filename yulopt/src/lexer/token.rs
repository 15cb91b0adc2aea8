//! Token definitions

use logos::Logos;

/// Yul token
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
pub enum Token {
    // Keywords
    #[token("let")]
    Let,
    #[token("if")]
    If,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("for")]
    For,
    #[token("function")]
    Function,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("leave")]
    Leave,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Punctuation
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token("->")]
    Arrow,
    #[token(":=")]
    Assign,

    // Literals and identifiers. Yul identifiers may contain `$` and `.`
    // (the disambiguator and object paths use them).
    #[regex(r"0x[0-9a-fA-F]+", |lex| lex.slice().to_string())]
    HexNumber(String),
    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    DecimalNumber(String),
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$.]*", |lex| lex.slice().to_string())]
    Ident(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Let => write!(f, "let"),
            Token::If => write!(f, "if"),
            Token::Switch => write!(f, "switch"),
            Token::Case => write!(f, "case"),
            Token::Default => write!(f, "default"),
            Token::For => write!(f, "for"),
            Token::Function => write!(f, "function"),
            Token::Break => write!(f, "break"),
            Token::Continue => write!(f, "continue"),
            Token::Leave => write!(f, "leave"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Arrow => write!(f, "->"),
            Token::Assign => write!(f, ":="),
            Token::HexNumber(text) | Token::DecimalNumber(text) | Token::Ident(text) => {
                write!(f, "{text}")
            }
        }
    }
}
