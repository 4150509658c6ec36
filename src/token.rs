use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Illegal,
    Eof,
    Ident,
    Num,

    Lt, // '<'
    Gt, // '>'
    Le, // '<='
    Ge, // '>='
    Eq, // '='

    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,

    Plus,
    Minus,
    Asterisk,
    Slash,

    // Keywords
    True,
    False,
    Do,
    Def,
    Defn,
    Let,
    If,
    Function,
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenType> = {
        let mut m = HashMap::new();
        m.insert("true", TokenType::True);
        m.insert("false", TokenType::False);
        m.insert("do", TokenType::Do);
        m.insert("def", TokenType::Def);
        m.insert("defn", TokenType::Defn);
        m.insert("let", TokenType::Let);
        m.insert("if", TokenType::If);
        m.insert("fn", TokenType::Function);
        m
    };
}

impl TokenType {
    pub fn lookup_ident(ident: &str) -> Self {
        KEYWORDS.get(ident).copied().unwrap_or(TokenType::Ident)
    }

    /// Canonical source spelling for tokens that have a fixed one.
    /// Identifiers and numbers carry their text in the token literal instead.
    pub fn spelling(&self) -> Option<&'static str> {
        let s = match self {
            TokenType::Lt => "<",
            TokenType::Gt => ">",
            TokenType::Le => "<=",
            TokenType::Ge => ">=",
            TokenType::Eq => "=",
            TokenType::LBracket => "[",
            TokenType::RBracket => "]",
            TokenType::LParen => "(",
            TokenType::RParen => ")",
            TokenType::Comma => ",",
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Asterisk => "*",
            TokenType::Slash => "/",
            TokenType::True => "true",
            TokenType::False => "false",
            TokenType::Do => "do",
            TokenType::Def => "def",
            TokenType::Defn => "defn",
            TokenType::Let => "let",
            TokenType::If => "if",
            TokenType::Function => "fn",
            _ => return None,
        };
        Some(s)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.spelling() {
            Some(s) => write!(f, "'{}'", s),
            None => match self {
                TokenType::Ident => write!(f, "identifier"),
                TokenType::Num => write!(f, "number"),
                TokenType::Eof => write!(f, "end of input"),
                _ => write!(f, "illegal token"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub literal: String,
}

impl Token {
    pub fn new(token_type: TokenType, literal: String) -> Self {
        Token {
            token_type,
            literal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TokenType;

    #[test]
    fn test_lookup_ident() {
        let tests = vec![
            ("fn", TokenType::Function),
            ("let", TokenType::Let),
            ("true", TokenType::True),
            ("false", TokenType::False),
            ("do", TokenType::Do),
            ("def", TokenType::Def),
            ("defn", TokenType::Defn),
            ("if", TokenType::If),
            ("foo", TokenType::Ident),
            ("deffoo", TokenType::Ident),
            ("Def", TokenType::Ident),
        ];

        for (ident, expected) in tests {
            assert_eq!(
                TokenType::lookup_ident(ident),
                expected,
                "lookup_ident({:?}) wrong",
                ident
            );
        }
    }

    #[test]
    fn test_keywords_round_trip_through_lookup() {
        for tok in [
            TokenType::True,
            TokenType::False,
            TokenType::Do,
            TokenType::Def,
            TokenType::Defn,
            TokenType::Let,
            TokenType::If,
            TokenType::Function,
        ] {
            let spelling = tok.spelling().expect("keyword without spelling");
            assert_eq!(TokenType::lookup_ident(spelling), tok);
        }
    }
}
