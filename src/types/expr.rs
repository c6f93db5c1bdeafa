use std::collections::BTreeSet;
use std::fmt;
use std::ops::Not;

/// Expected value of an entity reference that carries no explicit `=value`.
pub const DEFAULT_EXPECTED: &str = "on";

/// Deepest expression tree the parser and the alias resolver produce, counted
/// in nodes along the longest root-to-leaf path.
pub const MAX_DEPTH: usize = 256;

/// Binary operators. The grammar gives them no relative precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
}

/// Immutable expression tree produced by the parser.
///
/// Alias substitution builds new trees instead of mutating existing ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `name` or `name=value`. `value` is `None` when no override was written.
    Entity { name: String, value: Option<String> },
    Not(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::And => write!(f, "&"),
            BinaryOp::Or => write!(f, "|"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Entity { name, value: Some(v) } => write!(f, "{name}={v}"),
            Expr::Entity { name, value: None } => write!(f, "{name}"),
            // `!!a` is not valid input, a nested negation needs its own group
            Expr::Not(inner) if matches!(**inner, Expr::Not(_)) => write!(f, "!({inner})"),
            Expr::Not(inner) => write!(f, "!{inner}"),
            Expr::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
        }
    }
}

impl Expr {
    #[must_use]
    pub fn and(self, other: Expr) -> Expr {
        Expr::Binary {
            op: BinaryOp::And,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        Expr::Binary {
            op: BinaryOp::Or,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// The value an entity reference compares against, `None` for compound nodes.
    #[must_use]
    pub fn expected_value(&self) -> Option<&str> {
        match self {
            Expr::Entity { value, .. } => Some(value.as_deref().unwrap_or(DEFAULT_EXPECTED)),
            _ => None,
        }
    }

    /// Nodes on the longest path from this node to a leaf. An entity is 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Expr::Entity { .. } => 1,
            Expr::Not(inner) => 1 + inner.depth(),
            Expr::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// All entity names referenced anywhere in this tree.
    #[must_use]
    pub fn entities(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        collect_entities(self, &mut out);
        out
    }
}

fn collect_entities<'a>(expr: &'a Expr, out: &mut BTreeSet<&'a str>) {
    match expr {
        Expr::Entity { name, .. } => {
            out.insert(name.as_str());
        }
        Expr::Not(inner) => collect_entities(inner, out),
        Expr::Binary { left, right, .. } => {
            collect_entities(left, out);
            collect_entities(right, out);
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

/// Intermediate builder for entity references.
/// Created by [`entity()`]; converts into an [`Expr`] with the default expected value.
#[derive(Debug, Clone)]
pub struct EntityExpr {
    name: String,
}

impl EntityExpr {
    /// Compare against an explicit value, like `name=value` in the text form.
    #[must_use]
    pub fn is(self, value: &str) -> Expr {
        Expr::Entity {
            name: self.name,
            value: Some(value.to_owned()),
        }
    }
}

impl From<EntityExpr> for Expr {
    fn from(e: EntityExpr) -> Expr {
        Expr::Entity {
            name: e.name,
            value: None,
        }
    }
}

#[must_use]
pub fn entity(name: &str) -> EntityExpr {
    EntityExpr {
        name: name.to_owned(),
    }
}
