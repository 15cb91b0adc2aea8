//! Abstract Syntax Tree for the Yul subset the optimizer operates on

mod printer;
mod span;
mod visit;

pub use span::*;
pub use visit::*;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// A brace-delimited sequence of statements. The unit the optimizer runs on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// Statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    Block(Block),
    VariableDeclaration(VariableDeclaration),
    Assignment(Assignment),
    Expression(Expression),
    If(If),
    Switch(Switch),
    ForLoop(ForLoop),
    FunctionDefinition(FunctionDefinition),
    Break(Span),
    Continue(Span),
    Leave(Span),
}

/// `let a, b := value` (value optional: `let a`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub variables: Vec<Identifier>,
    pub value: Option<Expression>,
    pub span: Span,
}

/// `a, b := value`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub targets: Vec<Identifier>,
    pub value: Expression,
    pub span: Span,
}

/// `if condition { ... }`; Yul has no else branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct If {
    pub condition: Expression,
    pub body: Block,
    pub span: Span,
}

/// `switch e case 0 { } case 1 { } default { }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Switch {
    pub expression: Expression,
    pub cases: Vec<Case>,
    pub span: Span,
}

/// One arm of a switch; `value` is `None` for the `default` arm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub value: Option<Literal>,
    pub body: Block,
    pub span: Span,
}

/// `for { init } condition { post } { body }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForLoop {
    pub pre: Block,
    pub condition: Expression,
    pub post: Block,
    pub body: Block,
    pub span: Span,
}

/// `function f(a, b) -> r { ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: Identifier,
    pub parameters: Vec<Identifier>,
    pub returns: Vec<Identifier>,
    pub body: Block,
    pub span: Span,
}

/// Expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expression {
    Literal(Literal),
    Identifier(Identifier),
    FunctionCall(FunctionCall),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal(literal) => literal.span,
            Expression::Identifier(identifier) => identifier.span,
            Expression::FunctionCall(call) => call.span,
        }
    }
}

/// Number literal. `true`/`false` are parsed as 1/0; all literals fit in
/// 256 bits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Literal {
    pub value: BigInt,
    pub span: Span,
}

/// Name reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

/// `f(a, b)`, covering both builtins and user-defined functions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub function: Identifier,
    pub arguments: Vec<Expression>,
    pub span: Span,
}
