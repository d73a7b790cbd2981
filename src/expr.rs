use crate::token::Token;

/// Parse-time identity for variable-bearing expressions.
///
/// `Variable` and `Assign` nodes each get a fresh id from the parser; the
/// resolver keys its binding-depth side table on these ids.  The driver keeps
/// the counter monotonic across REPL lines so ids from earlier lines (still
/// alive inside closure bodies) never collide with new ones.
pub type ExprId = usize;

#[derive(Debug, Clone)]
pub enum Expr {
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    // 'and' / 'or'; kept apart from Binary for short-circuit evaluation
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    Unary {
        operator: Token,
        right: Box<Expr>,
    },

    // The literal token carries the value payload
    Literal(Token),

    Grouping(Box<Expr>),

    Variable {
        id: ExprId,
        name: Token,
    },

    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },
}
