use std::fmt;

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Binary operators, normalized from either spelling (`==` / `eq`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum BinOp {
    Pow,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    In,
    And,
    Or,
    Add,
    Sub,
}

impl BinOp {
    /// Resolve a word alias (`eq`, `lt`, `plus`, `and`, ...) to its operator.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "eq" => Some(BinOp::Eq),
            "ne" => Some(BinOp::Ne),
            "lt" => Some(BinOp::Lt),
            "gt" => Some(BinOp::Gt),
            "le" => Some(BinOp::Le),
            "ge" => Some(BinOp::Ge),
            "in" => Some(BinOp::In),
            "and" => Some(BinOp::And),
            "or" => Some(BinOp::Or),
            "plus" => Some(BinOp::Add),
            "minus" => Some(BinOp::Sub),
            "mul" => Some(BinOp::Mul),
            "div" => Some(BinOp::Div),
            _ => None,
        }
    }

    /// Canonical spelling used when rendering a tree.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Pow => "^",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::In => "in",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Add => "+",
            BinOp::Sub => "-",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum UnaryOp {
    /// `+x`
    Plus,
    /// `-x`
    Neg,
    /// `not x`
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Plus => f.write_str("+"),
            UnaryOp::Neg => f.write_str("-"),
            UnaryOp::Not => f.write_str("not "),
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in functions
// ---------------------------------------------------------------------------

/// The fixed set of callable functions. There are no user-defined functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `len(x)`: characters of a string or elements of a list.
    Len,
    /// `bool(x)`: truthiness of a value.
    Bool,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "len" => Some(Builtin::Len),
            "bool" => Some(Builtin::Bool),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::Bool => "bool",
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Expr {
    /// Variable reference without the `$` sigil, e.g. `user.age`.
    Var(String),
    /// String literal.
    StringLit(String),
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// List literal: `[a, b, c]`.
    List(Vec<Expr>),
    /// Built-in function call.
    FuncCall { func: Builtin, args: Vec<Expr> },
    /// Unary operation.
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Binary operation.
    BinOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    /// Collect the names of all variables referenced by this tree, in
    /// order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Var(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expr::List(items) | Expr::FuncCall { args: items, .. } => {
                for item in items {
                    item.collect_vars(out);
                }
            }
            Expr::Unary { operand, .. } => operand.collect_vars(out),
            Expr::BinOp { left, right, .. } => {
                left.collect_vars(out);
                right.collect_vars(out);
            }
            Expr::StringLit(_) | Expr::Int(_) | Expr::Float(_) => {}
        }
    }
}

/// Canonical rendering: symbolic operators, every operator node wrapped in
/// parentheses. Parsing the output yields an equal tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "${name}"),
            Expr::StringLit(s) => {
                // No escapes in the grammar: pick the quote the text lacks.
                if s.contains('\'') {
                    write!(f, "\"{s}\"")
                } else {
                    write!(f, "'{s}'")
                }
            }
            Expr::Int(n) => write!(f, "{n}"),
            Expr::Float(n) => write!(f, "{n:?}"),
            Expr::List(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            Expr::FuncCall { func, args } => {
                write!(f, "{func}(")?;
                write_joined(f, args)?;
                f.write_str(")")
            }
            Expr::Unary { op, operand } => write!(f, "({op}({operand}))"),
            Expr::BinOp { op, left, right } => write!(f, "({left} {op} {right})"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
