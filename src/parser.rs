use crate::ast::{BindPair, Expr, ExprList};
use crate::error::ParseError;
use crate::scanner::Scanner;
use crate::token::TokenType;
use std::rc::Rc;

/// Parses exactly one expression from `src`. The token stream must end
/// right after it; anything trailing is a syntax error.
pub fn parse_expr(src: &[u8]) -> Result<Expr, ParseError> {
    let mut p = Parser::new(src);
    let expr = p.parse_expr();
    p.match_tok(TokenType::Eof);
    match p.err {
        Some(err) => Err(err),
        None => Ok(expr),
    }
}

struct Parser<'a> {
    sc: Scanner<'a>,
    tok: TokenType,
    lit: String,
    err: Option<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a [u8]) -> Parser<'a> {
        let mut p = Parser {
            sc: Scanner::new(src),
            tok: TokenType::Eof,
            lit: String::new(),
            err: None,
        };
        p.next();
        p
    }

    /// An expression starting with '(' is a function call unless the token
    /// after '(' is a keyword or operator selecting a special form. Anything
    /// else must be a literal, an identifier, or end of input (which parses
    /// to the nil expression).
    fn parse_expr(&mut self) -> Expr {
        if self.err.is_some() {
            return Expr::Nil;
        }
        if self.tok == TokenType::LParen {
            self.next();
            let expr = match self.tok {
                TokenType::Function => self.parse_fn(),
                TokenType::If => self.parse_if(),
                TokenType::Do => self.parse_do_block(),
                TokenType::Def => self.parse_def(),
                TokenType::Defn => self.parse_defn(),
                TokenType::Let => self.parse_let(),
                TokenType::Plus | TokenType::Minus | TokenType::Asterisk | TokenType::Slash => {
                    self.parse_multi_op()
                }
                TokenType::Lt | TokenType::Gt | TokenType::Le | TokenType::Ge | TokenType::Eq => {
                    self.parse_binary_op()
                }
                TokenType::Ident | TokenType::LParen => self.parse_call(),
                _ => {
                    self.error(ParseError::UnexpectedToken(self.tok));
                    Expr::Nil
                }
            };
            self.match_tok(TokenType::RParen);
            expr
        } else {
            match self.tok {
                TokenType::Num => self.parse_num(),
                TokenType::Ident => Expr::Ident(self.parse_ident()),
                TokenType::True => {
                    self.next();
                    Expr::Boolean(true)
                }
                TokenType::False => {
                    self.next();
                    Expr::Boolean(false)
                }
                TokenType::Eof => Expr::Nil,
                _ => {
                    self.error(ParseError::UnexpectedToken(self.tok));
                    Expr::Nil
                }
            }
        }
    }

    fn parse_ident(&mut self) -> String {
        if self.err.is_some() {
            return String::new();
        }
        let lit = std::mem::take(&mut self.lit);
        self.match_tok(TokenType::Ident);
        lit
    }

    fn parse_num(&mut self) -> Expr {
        if self.err.is_some() {
            return Expr::Nil;
        }
        let lit = std::mem::take(&mut self.lit);
        self.match_tok(TokenType::Num);
        match lit.parse::<f64>() {
            Ok(value) => Expr::Num(value),
            Err(_) => {
                self.error(ParseError::InvalidNumber(lit));
                Expr::Nil
            }
        }
    }

    fn parse_fn(&mut self) -> Expr {
        if self.err.is_some() {
            return Expr::Nil;
        }
        self.match_tok(TokenType::Function);
        self.match_tok(TokenType::LBracket);
        let mut params = Vec::new();
        while self.tok == TokenType::Ident && self.err.is_none() {
            params.push(self.parse_ident());
        }
        self.match_tok(TokenType::RBracket);
        let body = self.parse_expr();
        Expr::Fn {
            params,
            body: Rc::new(body),
        }
    }

    fn parse_if(&mut self) -> Expr {
        if self.err.is_some() {
            return Expr::Nil;
        }
        self.match_tok(TokenType::If);
        let cond = self.parse_expr();
        let then = self.parse_expr();
        let els = self.parse_expr();
        Expr::If {
            cond: Box::new(cond),
            then: Box::new(then),
            els: Box::new(els),
        }
    }

    fn parse_call(&mut self) -> Expr {
        if self.err.is_some() {
            return Expr::Nil;
        }
        let func = self.parse_expr();
        let args = self.parse_expr_list();
        Expr::Call {
            func: Box::new(func),
            args,
        }
    }

    fn parse_do_block(&mut self) -> Expr {
        if self.err.is_some() {
            return Expr::Nil;
        }
        self.match_tok(TokenType::Do);
        Expr::Do(self.parse_expr_list())
    }

    // Greedy: collects expressions for as long as the current token can
    // start one. The sequence may be empty.
    fn parse_expr_list(&mut self) -> ExprList {
        let mut exprs = Vec::new();
        while self.err.is_none() && self.can_start_expr() {
            exprs.push(self.parse_expr());
        }
        ExprList { exprs }
    }

    fn parse_def(&mut self) -> Expr {
        if self.err.is_some() {
            return Expr::Nil;
        }
        self.match_tok(TokenType::Def);
        let name = self.parse_ident();
        let value = self.parse_expr();
        Expr::Def {
            name,
            value: Box::new(value),
        }
    }

    // defn is sugar for binding a function literal, so the parser builds
    // the Fn node right here.
    fn parse_defn(&mut self) -> Expr {
        if self.err.is_some() {
            return Expr::Nil;
        }
        self.match_tok(TokenType::Defn);
        let name = self.parse_ident();
        self.match_tok(TokenType::LBracket);
        let mut params = Vec::new();
        while self.tok == TokenType::Ident && self.err.is_none() {
            params.push(self.parse_ident());
        }
        self.match_tok(TokenType::RBracket);
        let body = self.parse_expr();
        Expr::Defn {
            name,
            value: Box::new(Expr::Fn {
                params,
                body: Rc::new(body),
            }),
        }
    }

    fn parse_binary_op(&mut self) -> Expr {
        if self.err.is_some() {
            return Expr::Nil;
        }
        let op = self.tok;
        self.next();
        let left = self.parse_expr();
        let right = self.parse_expr();
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn parse_multi_op(&mut self) -> Expr {
        if self.err.is_some() {
            return Expr::Nil;
        }
        let op = self.tok;
        self.next();
        Expr::Multi {
            op,
            operands: self.parse_expr_list(),
        }
    }

    fn parse_let(&mut self) -> Expr {
        if self.err.is_some() {
            return Expr::Nil;
        }
        self.match_tok(TokenType::Let);
        self.match_tok(TokenType::LBracket);
        // At least one binding pair is required.
        let mut bindings = vec![self.parse_binding_pair()];
        while self.err.is_none() && self.tok == TokenType::Ident {
            bindings.push(self.parse_binding_pair());
        }
        self.match_tok(TokenType::RBracket);
        let body = self.parse_expr();
        Expr::Let {
            bindings,
            body: Box::new(body),
        }
    }

    fn parse_binding_pair(&mut self) -> BindPair {
        let name = self.parse_ident();
        let value = self.parse_expr();
        BindPair { name, value }
    }

    // Whether the current token can begin an expression.
    fn can_start_expr(&self) -> bool {
        matches!(
            self.tok,
            TokenType::LParen | TokenType::Ident | TokenType::Num
        )
    }

    fn next(&mut self) {
        let (tok, err) = self.sc.next_token();
        self.tok = tok.token_type;
        self.lit = tok.literal;
        if let Some(err) = err {
            self.error(err.into());
        }
    }

    fn match_tok(&mut self, expected: TokenType) {
        if self.err.is_some() {
            return;
        }
        if self.tok != expected {
            self.error(ParseError::Expected {
                expected,
                found: self.tok,
            });
            return;
        }
        self.next();
    }

    // Sticky: the first error is kept, later ones are dropped.
    fn error(&mut self, err: ParseError) {
        if self.err.is_none() {
            self.err = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_expr;
    use crate::ast::{BindPair, Expr, ExprList};
    use crate::error::{ParseError, ScanError};
    use crate::token::TokenType;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    #[test]
    fn test_accepts_well_formed_expressions() {
        let tests = vec![
            "a",
            "1.5",
            "true",
            "false",
            "(+ 1 2)",
            "(+)",
            "(- 10 2 3)",
            "(def a 1)",
            "(defn inc [n] (+ n 1))",
            "(if (< 1 2) 1 2)",
            "(do (add 1 2) (sub 1 2))",
            "(do)",
            "(let [x 1 y 2] (+ x y))",
            "(fn [] 1)",
            "((fn [x] x) 5)",
            "(f)",
            "(= 1 2)",
        ];
        for input in tests {
            assert!(
                parse_expr(input.as_bytes()).is_ok(),
                "input {:?} should parse",
                input
            );
        }
    }

    #[test]
    fn test_rejects_malformed_expressions() {
        let tests = vec![
            "+ 1 2",
            "(+ 1 2",
            "(< 1)",
            "(1 2)",
            "(let [] 1)",
            "(fn [x 1] x)",
            "(f 1, 2)",
            ")",
            "1 2",
            "a b",
        ];
        for input in tests {
            assert!(
                parse_expr(input.as_bytes()).is_err(),
                "input {:?} should not parse",
                input
            );
        }
    }

    #[test]
    fn test_empty_input_is_nil() {
        assert_eq!(parse_expr(b""), Ok(Expr::Nil));
        assert_eq!(parse_expr(b"   \t\n"), Ok(Expr::Nil));
    }

    #[test]
    fn test_fn_literal_structure() {
        let expr = parse_expr(b"(fn [x y] (+ x y))").unwrap();
        assert_eq!(
            expr,
            Expr::Fn {
                params: vec!["x".to_string(), "y".to_string()],
                body: Rc::new(Expr::Multi {
                    op: TokenType::Plus,
                    operands: ExprList {
                        exprs: vec![
                            Expr::Ident("x".to_string()),
                            Expr::Ident("y".to_string()),
                        ],
                    },
                }),
            }
        );
    }

    #[test]
    fn test_defn_wraps_function_literal() {
        let expr = parse_expr(b"(defn id [x] x)").unwrap();
        assert_eq!(
            expr,
            Expr::Defn {
                name: "id".to_string(),
                value: Box::new(Expr::Fn {
                    params: vec!["x".to_string()],
                    body: Rc::new(Expr::Ident("x".to_string())),
                }),
            }
        );
    }

    #[test]
    fn test_let_structure() {
        let expr = parse_expr(b"(let [x 1 y x] y)").unwrap();
        assert_eq!(
            expr,
            Expr::Let {
                bindings: vec![
                    BindPair {
                        name: "x".to_string(),
                        value: Expr::Num(1.0),
                    },
                    BindPair {
                        name: "y".to_string(),
                        value: Expr::Ident("x".to_string()),
                    },
                ],
                body: Box::new(Expr::Ident("y".to_string())),
            }
        );
    }

    #[test]
    fn test_call_structure() {
        let expr = parse_expr(b"(f 1 (g 2))").unwrap();
        assert_eq!(
            expr,
            Expr::Call {
                func: Box::new(Expr::Ident("f".to_string())),
                args: ExprList {
                    exprs: vec![
                        Expr::Num(1.0),
                        Expr::Call {
                            func: Box::new(Expr::Ident("g".to_string())),
                            args: ExprList {
                                exprs: vec![Expr::Num(2.0)],
                            },
                        },
                    ],
                },
            }
        );
    }

    #[test]
    fn test_if_requires_three_parts() {
        // The missing else branch runs into ')', which can't start an
        // expression.
        let err = parse_expr(b"(if (< 1 2) 1)").unwrap_err();
        assert_eq!(err, ParseError::UnexpectedToken(TokenType::RParen));
    }

    #[test]
    fn test_trailing_token_is_an_error() {
        let err = parse_expr(b"(+ 1 2) 3").unwrap_err();
        assert_eq!(
            err,
            ParseError::Expected {
                expected: TokenType::Eof,
                found: TokenType::Num,
            }
        );
    }

    #[test]
    fn test_first_error_is_reported() {
        // The unmatched '(' is hit before the stray ']' ever gets scanned.
        let err = parse_expr(b"(+ 1").unwrap_err();
        assert_eq!(
            err,
            ParseError::Expected {
                expected: TokenType::RParen,
                found: TokenType::Eof,
            }
        );
    }

    #[test]
    fn test_lexical_error_surfaces_as_parse_error() {
        let err = parse_expr(b"(+ 1 $)").unwrap_err();
        assert_eq!(err, ParseError::Scan(ScanError::UnrecognizedChar('$')));
    }
}
