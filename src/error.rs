use crate::object::ObjKind;
use crate::token::TokenType;
use thiserror::Error;

/// Lexical errors. The scanner records the first one it hits and keeps
/// reporting it for the rest of the pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    #[error("unrecognized character {0:?}")]
    UnrecognizedChar(char),
    #[error("illegal utf-8 encoding")]
    InvalidEncoding,
}

/// Syntax errors. Sticky within one parse pass: the first error suppresses
/// everything after it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("unexpected token {0}")]
    UnexpectedToken(TokenType),
    #[error("expecting {expected} while got {found}")]
    Expected {
        expected: TokenType,
        found: TokenType,
    },
    #[error("invalid number literal {0:?}")]
    InvalidNumber(String),
}

/// Evaluation errors: binding, type and arity failures. Each one aborts the
/// current evaluation immediately.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("{0:?} is not defined")]
    Undefined(String),
    #[error("can't bind nil to a name")]
    BindNil,
    #[error("uncaptured name {0:?}")]
    Uncaptured(String),
    #[error("def is not allowed inside a function")]
    DefInsideFunction,
    #[error("not a function: {0}")]
    NotCallable(ObjKind),
    #[error("wrong number of arguments ({got}), expect {want}")]
    WrongArgCount { got: usize, want: usize },
    #[error("if condition must be a boolean, got {0}")]
    NonBooleanCondition(ObjKind),
    #[error("can't compare {left} with {right}")]
    MixedComparison { left: ObjKind, right: ObjKind },
    #[error("only numbers can be compared, got {0}")]
    NonNumericComparison(ObjKind),
    #[error("operands must be numbers, got {0}")]
    NonNumericOperand(ObjKind),
    #[error("invalid operator {0}")]
    InvalidOperator(TokenType),
}
