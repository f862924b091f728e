//! # Scalar Expressions
//!
//! Row-level expressions carried by operators: filter predicates, join conditions
//! and projection lists. Columns are referenced by name; the name must exist in the
//! row type of the operator's input.
//!
//! Operator digests embed the `Display` form of these expressions, so two
//! expressions print the same exactly when they are structurally equal.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Constant value.
///
/// `Float64` is wrapped in `OrderedFloat` so literals can derive `Eq` and `Hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(OrderedFloat<f64>),
    Utf8(String),
}

impl ScalarValue {
    /// SQL type name of the value.
    pub fn data_type(&self) -> &'static str {
        match self {
            ScalarValue::Null => "NULL",
            ScalarValue::Bool(_) => "BOOLEAN",
            ScalarValue::Int64(_) => "BIGINT",
            ScalarValue::Float64(_) => "DOUBLE",
            ScalarValue::Utf8(_) => "VARCHAR",
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "NULL"),
            ScalarValue::Bool(v) => write!(f, "{}", v),
            ScalarValue::Int64(v) => write!(f, "{}", v),
            ScalarValue::Float64(v) => write!(f, "{}", v),
            ScalarValue::Utf8(v) => write!(f, "'{}'", v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Multiply,
}

impl BinaryOp {
    pub fn is_comparison(&self) -> bool {
        !matches!(self, BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Multiply)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Multiply => "*",
        };
        f.write_str(symbol)
    }
}

/// Scalar expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    Column(String),
    Literal(ScalarValue),
    BinaryOp {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    /// Flat conjunction. Nested `And`s are flattened by [`Expr::and`].
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    pub fn col(name: &str) -> Expr {
        Expr::Column(name.to_string())
    }

    pub fn int(v: i64) -> Expr {
        Expr::Literal(ScalarValue::Int64(v))
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn eq(left: Expr, right: Expr) -> Expr {
        Expr::binary(BinaryOp::Eq, left, right)
    }

    /// Conjunction of `exprs`, flattened. `TRUE` if empty, the expression itself if single.
    pub fn and(exprs: Vec<Expr>) -> Expr {
        let mut conjuncts: Vec<Expr> = exprs
            .iter()
            .flat_map(|e| e.conjuncts())
            .filter(|e| !e.is_true())
            .cloned()
            .collect();
        match conjuncts.len() {
            0 => Expr::Literal(ScalarValue::Bool(true)),
            1 => conjuncts.remove(0),
            _ => Expr::And(conjuncts),
        }
    }

    /// Flatten AND-chains: `A AND (B AND C)` gives `[A, B, C]`.
    pub fn conjuncts(&self) -> Vec<&Expr> {
        match self {
            Expr::And(exprs) => exprs.iter().flat_map(|e| e.conjuncts()).collect(),
            other => vec![other],
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Expr::Literal(ScalarValue::Bool(true)))
    }

    /// Names of all referenced columns, in order of appearance.
    pub fn columns(&self) -> Vec<&str> {
        let mut cols = Vec::new();
        self.collect_columns(&mut cols);
        cols
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Column(name) => out.push(name),
            Expr::Literal(_) => {}
            Expr::BinaryOp { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expr::Not(inner) => inner.collect_columns(out),
            Expr::And(exprs) | Expr::Or(exprs) => {
                for e in exprs {
                    e.collect_columns(out);
                }
            }
        }
    }

    /// True if some conjunct is an equality between two columns.
    pub fn has_equi_conjunct(&self) -> bool {
        self.conjuncts().iter().any(|c| {
            matches!(
                c,
                Expr::BinaryOp { op: BinaryOp::Eq, left, right }
                    if matches!(left.as_ref(), Expr::Column(_))
                        && matches!(right.as_ref(), Expr::Column(_))
            )
        })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => f.write_str(name),
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::BinaryOp { op, left, right } => write!(f, "{} {} {}", left, op, right),
            Expr::Not(inner) => write!(f, "NOT({})", inner),
            Expr::And(exprs) | Expr::Or(exprs) => {
                let sep = if matches!(self, Expr::And(_)) { " AND " } else { " OR " };
                let parts: Vec<String> = exprs
                    .iter()
                    .map(|e| match e {
                        Expr::And(_) | Expr::Or(_) => format!("({})", e),
                        _ => e.to_string(),
                    })
                    .collect();
                f.write_str(&parts.join(sep))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_flattens_and_drops_true() {
        let a = Expr::eq(Expr::col("a"), Expr::int(1));
        let b = Expr::eq(Expr::col("b"), Expr::int(2));
        let c = Expr::eq(Expr::col("c"), Expr::int(3));
        let nested = Expr::and(vec![
            a.clone(),
            Expr::And(vec![b.clone(), c.clone()]),
            Expr::Literal(ScalarValue::Bool(true)),
        ]);
        assert_eq!(nested, Expr::And(vec![a.clone(), b, c]));
        assert_eq!(Expr::and(vec![a.clone()]), a);
        assert!(Expr::and(vec![]).is_true());
    }

    #[test]
    fn test_display() {
        let pred = Expr::And(vec![
            Expr::binary(BinaryOp::Gt, Expr::col("price"), Expr::int(100)),
            Expr::Or(vec![
                Expr::eq(Expr::col("flag"), Expr::Literal(ScalarValue::Utf8("R".into()))),
                Expr::Not(Box::new(Expr::col("done"))),
            ]),
        ]);
        assert_eq!(pred.to_string(), "price > 100 AND (flag = 'R' OR NOT(done))");
    }

    #[test]
    fn test_equi_conjunct_detection() {
        let equi = Expr::and(vec![
            Expr::eq(Expr::col("a_id"), Expr::col("b_id")),
            Expr::binary(BinaryOp::Lt, Expr::col("a_v"), Expr::int(3)),
        ]);
        assert!(equi.has_equi_conjunct());
        assert!(!Expr::eq(Expr::col("a_id"), Expr::int(1)).has_equi_conjunct());
        assert_eq!(equi.columns(), vec!["a_id", "b_id", "a_v"]);
    }
}
