//! Typed Python syntax tree for detection and rewriting.
//!
//! This is a deliberately closed subset of Python: every node kind the
//! detector or auto-fixer cares about gets its own variant, and anything
//! outside the subset is preserved as a verbatim source slice. Verbatim
//! nodes round-trip untouched through the rewriter, which is what makes
//! structural rewriting safe on arbitrary input.

// ============================================================================
// Statements
// ============================================================================

/// A parsed module: the ordered top-level statement list.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub body: Vec<Stmt>,
}

/// A statement with its 1-indexed source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub line: u32,
    pub kind: StmtKind,
}

impl Stmt {
    pub fn new(line: u32, kind: StmtKind) -> Self {
        Stmt { line, kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Single-target assignment: `target = value`.
    Assign { target: Expr, value: Expr },
    /// Bare expression statement.
    Expr(Expr),
    /// `if`/`elif`/`else`. An `elif` chain is a nested `If` as the sole
    /// statement of `orelse`.
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    /// `for target in iter:`.
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
    },
    /// `while test:`.
    While { test: Expr, body: Vec<Stmt> },
    /// `def name(signature): ...` — the signature text is kept raw,
    /// parentheses included.
    FunctionDef {
        name: String,
        signature: String,
        decorators: Vec<String>,
        body: Vec<Stmt>,
    },
    /// `class name(bases): ...` — base list kept raw, parens included.
    ClassDef {
        name: String,
        bases: Option<String>,
        decorators: Vec<String>,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    /// Any `import`/`from ... import` line, kept verbatim.
    Import(String),
    Pass,
    /// A statement outside the recognized subset, dedented to its own
    /// starting column.
    Verbatim(String),
}

// ============================================================================
// Expressions
// ============================================================================

/// An expression with its 1-indexed source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub line: u32,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(line: u32, kind: ExprKind) -> Self {
        Expr { line, kind }
    }

    /// The identifier, when this expression is a simple name.
    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Whether this is a call to the given bare function name.
    pub fn is_call_to(&self, name: &str) -> bool {
        match &self.kind {
            ExprKind::Call { func, .. } => func.as_name() == Some(name),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A simple identifier.
    Name(String),
    /// A literal scalar (number, string, `True`, `False`, `None`),
    /// stored as source text.
    Literal(String),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Set(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    /// A list comprehension, kept verbatim (brackets included).
    ListComp(String),
    /// A dict comprehension, kept verbatim (braces included).
    DictComp(String),
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    BinOp {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    /// A single (non-chained) comparison.
    Compare {
        left: Box<Expr>,
        op: CmpOp,
        right: Box<Expr>,
    },
    /// Explicit grouping parentheses from the source.
    Paren(Box<Expr>),
    /// An expression outside the recognized subset.
    Verbatim(String),
}

/// Comparison operators; only membership matters for detection, the rest
/// are carried as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmpOp {
    In,
    NotIn,
    Other(String),
}
