// ABOUTME: The AST node inventory produced by the parser and walked by the evaluator

use crate::token::Token;
use crate::value::{Arguments, BuiltinKind, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitAnd,
    BitXor,
    BitOr,
}

impl Operator {
    /// The symbol used in `TypeError: unsupported operand type(s) for <op> ...`.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mult => "*",
            Operator::Div => "/",
            Operator::FloorDiv => "//",
            Operator::Mod => "%",
            Operator::Pow => "**",
            Operator::LShift => "<<",
            Operator::RShift => ">>",
            Operator::BitAnd => "&",
            Operator::BitXor => "^",
            Operator::BitOr => "|",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Invert,
    Not,
    UAdd,
    USub,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Invert => "~",
            UnaryOperator::Not => "not",
            UnaryOperator::UAdd => "+",
            UnaryOperator::USub => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncDecOp {
    PostIncrement,
    PostDecrement,
    PreIncrement,
    PreDecrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Gt,
    GtE,
    In,
    Is,
    IsNot,
    Lt,
    LtE,
    NotEq,
    NotIn,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Gt => ">",
            CmpOp::GtE => ">=",
            CmpOp::In => "in",
            CmpOp::Is => "===",
            CmpOp::IsNot => "!==",
            CmpOp::Lt => "<",
            CmpOp::LtE => "<=",
            CmpOp::NotEq => "!=",
            CmpOp::NotIn => "not in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructKind {
    Boolean,
    Number,
    String,
    Tuple,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ctx {
    Load,
    Store,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Constant(Value, Token),
    TupleLit(Vec<Expr>, Token),
    ListLit(Vec<Expr>, Token),
    SliceExpr { start: Option<Box<Expr>>, stop: Option<Box<Expr>>, step: Option<Box<Expr>>, token: Token },
    Name { id: String, ctx: Ctx, token: Token },
    BinOp { left: Box<Expr>, op: Operator, right: Box<Expr>, token: Token },
    UnaryOp { op: UnaryOperator, operand: Box<Expr>, token: Token },
    InplaceUnaryOp { op: IncDecOp, target: String, token: Token },
    Compare { left: Box<Expr>, ops: Vec<CmpOp>, comparators: Vec<Expr>, token: Token },
    GetItem { value: Box<Expr>, index: Box<Expr>, token: Token },
    Call { func: Box<Expr>, args: Vec<Expr>, token: Token },
    Construct { kind: ConstructKind, arg: Option<Box<Expr>>, token: Token },
    BuiltinCall { kind: BuiltinKind, args: Vec<Expr>, token: Token },
}

impl Expr {
    pub fn token(&self) -> &Token {
        match self {
            Expr::Constant(_, t)
            | Expr::TupleLit(_, t)
            | Expr::ListLit(_, t)
            | Expr::SliceExpr { token: t, .. }
            | Expr::Name { token: t, .. }
            | Expr::BinOp { token: t, .. }
            | Expr::UnaryOp { token: t, .. }
            | Expr::InplaceUnaryOp { token: t, .. }
            | Expr::Compare { token: t, .. }
            | Expr::GetItem { token: t, .. }
            | Expr::Call { token: t, .. }
            | Expr::Construct { token: t, .. }
            | Expr::BuiltinCall { token: t, .. } => t,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    ExprStmt(Expr),
    Assign { target: Expr, value: Expr, token: Token },
    AugAssign { target: Expr, op: Operator, value: Expr, token: Token },
    /// `if`/`elif`/`else` collapses into an ordered list of (cond, body)
    /// branches plus a trailing else body (possibly empty).
    If { branches: Vec<(Expr, Vec<Stmt>)>, orelse: Vec<Stmt>, token: Token },
    While { cond: Expr, body: Vec<Stmt>, orelse: Vec<Stmt>, token: Token },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Box<Stmt>>,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        token: Token,
    },
    ForOf { target: String, iter: Expr, body: Vec<Stmt>, orelse: Vec<Stmt>, token: Token },
    FunctionDef { name: String, args: Arguments, body: Vec<Stmt>, token: Token },
    Break(Token),
    Continue(Token),
    Return(Option<Expr>, Token),
    Global(Vec<String>, Token),
    Nonlocal(Vec<String>, Token),
}

impl Stmt {
    pub fn token(&self) -> &Token {
        match self {
            Stmt::ExprStmt(e) => e.token(),
            Stmt::Assign { token: t, .. }
            | Stmt::AugAssign { token: t, .. }
            | Stmt::If { token: t, .. }
            | Stmt::While { token: t, .. }
            | Stmt::For { token: t, .. }
            | Stmt::ForOf { token: t, .. }
            | Stmt::FunctionDef { token: t, .. }
            | Stmt::Break(t)
            | Stmt::Continue(t)
            | Stmt::Return(_, t)
            | Stmt::Global(_, t)
            | Stmt::Nonlocal(_, t) => t,
        }
    }
}
