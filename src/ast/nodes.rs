//! # AST Nodes
//!
//! This module defines the fundamental data structures (nodes) that make up
//! the Abstract Syntax Tree (AST) of the Lyn language.
//!
//! Every node owns its children directly (`Box`, `Vec`); dropping the root
//! drops the whole tree. There is no shared or cyclic structure, so no
//! reference counting is needed anywhere in this module.

/// The root of a Lyn program's Abstract Syntax Tree.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// A single module import (`import`, `ui`, or `css`).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum ImportKind {
    Module(String),
    Ui,
    Css,
}

/// All statement-level constructs in the Lyn grammar.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum Stmt {
    /// Assignment to a name that may or may not already be declared
    /// (`name = value` or `obj.member = value`).
    VarAssign { name: String, initializer: Expr },

    /// `name: type [= initializer]`.
    VarDecl {
        name: String,
        type_name: String,
        initializer: Option<Box<Expr>>,
    },

    /// `func name(params) [-> return_type] ... end`.
    FuncDef {
        name: String,
        params: Vec<Param>,
        return_type: String,
        body: Vec<Stmt>,
    },

    /// A call used as a statement (e.g. `register_event(...)`, or a bare
    /// `name(args)` that is not consumed by any expression context).
    FuncCall { name: String, args: Vec<Expr> },

    /// `return expr`.
    Return(Expr),

    /// `print(expr)`.
    Print(Expr),

    /// `class Name; members... end`.
    ClassDef { name: String, members: Vec<Stmt> },

    /// `if cond; then... [else; else...] end`.
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },

    /// `for iterator in range(start[, end]); body end`.
    For {
        iterator: String,
        range_start: Expr,
        range_end: Expr,
        body: Vec<Stmt>,
    },

    /// `import kind "name"` / `ui "name"` / `css "name"`.
    Import { kind: ImportKind, name: String },

    /// An expression evaluated for its side effect alone (e.g. a bare
    /// `obj.method()` call parsed via postfix outside an assignment).
    ExprStmt(Expr),
}

/// A function or lambda parameter. Only the name survives into the AST;
/// the declared type is checked by the parser/analyzer but not retained.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Param {
    pub name: String,
}

/// All expression-level constructs in the Lyn grammar.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum Expr {
    NumberLit(OrderedF64),
    StringLit(String),
    Identifier(String),

    /// `(params) -> return_type => body`.
    Lambda {
        params: Vec<Param>,
        return_type: String,
        body: Box<Expr>,
    },

    /// `[ elem, elem, ... ]`.
    ArrayLiteral(Vec<Expr>),

    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },

    /// `name(args)`.
    FuncCall { name: String, args: Vec<Expr> },

    /// `object.member` (not immediately called).
    MemberAccess { object: Box<Expr>, member: String },

    /// `object.method(args)`.
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
}

/// The arithmetic and comparison operators the grammar recognizes at a
/// single (flat) precedence level for `+ - > < >= <= == !=`, plus `* /`
/// at the next level down. See §4.4 for the two-level precedence climb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Gt,
    Lt,
    Gte,
    Lte,
    Eq,
    Neq,
}

impl BinOp {
    /// Arithmetic operators eligible for constant folding (§4.5); the
    /// comparison operators are deliberately excluded.
    pub fn is_foldable_arithmetic(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div)
    }
}

/// A thin wrapper around `f64` that derives `PartialEq` by bit pattern so
/// `NumberLit` can sit inside a `#[derive(PartialEq)]` AST without pulling
/// in a general-purpose float-ordering crate nobody else in this crate
/// needs. NaN is not a representable Lyn literal, so bit equality and
/// value equality coincide for every value the parser can produce.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct OrderedF64(pub f64);

impl PartialEq for OrderedF64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl From<f64> for OrderedF64 {
    fn from(v: f64) -> Self {
        OrderedF64(v)
    }
}
