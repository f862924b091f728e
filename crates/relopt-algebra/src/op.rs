//! # Relational Operators
//!
//! [`RelOp`] is a small relational algebra that plugs into the planners through
//! [`Operator`]. Every operator carries a [`Convention`]:
//!
//! - **Logical** operators describe *what* to compute. They cannot be executed, so
//!   their self cost is infinite and the cost-based planner never picks them.
//! - **Physical** operators describe *how*. Implementation rules produce them from
//!   logical operators; a join additionally picks a [`JoinStrategy`].
//!
//! ## Estimates
//!
//! Row counts use fixed selectivities. A filter keeps
//! [`DEFAULT_FILTER_SELECTIVITY`] of its input per conjunct, floored at one row.
//! An equi-join produces as many rows as its larger input; other inner joins keep
//! the same fraction of the cross product as a single-conjunct filter would.
//!
//! Physical self costs put output rows in `rows`, per-row work in `cpu` and rows
//! read from storage in `io`.

use relopt_core::{Cost, Field, Operator, RowType, TraitSet};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::scalar::{BinaryOp, Expr};

/// Fraction of rows kept per filter conjunct.
pub const DEFAULT_FILTER_SELECTIVITY: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Convention {
    Logical,
    Physical,
}

impl Convention {
    pub fn name(&self) -> &'static str {
        match self {
            Convention::Logical => "LOGICAL",
            Convention::Physical => "PHYSICAL",
        }
    }

    pub fn trait_set(&self) -> TraitSet {
        TraitSet::of(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Cross,
}

/// Execution strategy of a physical join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinStrategy {
    /// Logical joins have no strategy.
    Unspecified,
    /// Build a hash table on the right input, probe with the left. Equi-joins only.
    Hash,
    /// Compare every pair of rows. Works for any condition.
    NestedLoop,
}

/// Data-free discriminant used in rule operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelOpKind {
    Scan,
    Filter,
    Project,
    Join,
    Sort,
    Limit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RelBody {
    /// Leaf reading a base table with a known row count.
    Scan {
        table: String,
        columns: Vec<Field>,
        rows: f64,
    },
    Filter {
        predicate: Expr,
    },
    Project {
        exprs: Vec<Expr>,
        aliases: Vec<String>,
    },
    Join {
        join_type: JoinType,
        condition: Expr,
        strategy: JoinStrategy,
    },
    Sort {
        keys: Vec<String>,
    },
    Limit {
        count: u64,
    },
}

/// One relational operator with its convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelOp {
    pub body: RelBody,
    pub convention: Convention,
}

impl RelOp {
    pub fn logical(body: RelBody) -> Self {
        Self {
            body,
            convention: Convention::Logical,
        }
    }

    /// Table scan over `(name, type)` columns.
    pub fn scan(table: &str, columns: &[(&str, &str)], rows: f64) -> Self {
        Self::logical(RelBody::Scan {
            table: table.to_string(),
            columns: RowType::of(columns).fields,
            rows,
        })
    }

    pub fn filter(predicate: Expr) -> Self {
        Self::logical(RelBody::Filter { predicate })
    }

    /// Projection of `(expr, alias)` pairs.
    pub fn project(items: Vec<(Expr, &str)>) -> Self {
        let (exprs, aliases) = items
            .into_iter()
            .map(|(e, alias)| (e, alias.to_string()))
            .unzip();
        Self::logical(RelBody::Project { exprs, aliases })
    }

    pub fn join(join_type: JoinType, condition: Expr) -> Self {
        Self::logical(RelBody::Join {
            join_type,
            condition,
            strategy: JoinStrategy::Unspecified,
        })
    }

    pub fn sort(keys: &[&str]) -> Self {
        Self::logical(RelBody::Sort {
            keys: keys.iter().map(|k| k.to_string()).collect(),
        })
    }

    pub fn limit(count: u64) -> Self {
        Self::logical(RelBody::Limit { count })
    }

    /// The same operator in the physical convention.
    pub fn to_physical(&self) -> Self {
        Self {
            body: self.body.clone(),
            convention: Convention::Physical,
        }
    }

    /// A physical join with the given strategy; `None` if this is not a join.
    pub fn to_physical_join(&self, strategy: JoinStrategy) -> Option<Self> {
        let RelBody::Join {
            join_type,
            condition,
            ..
        } = &self.body
        else {
            return None;
        };
        Some(Self {
            body: RelBody::Join {
                join_type: *join_type,
                condition: condition.clone(),
                strategy,
            },
            convention: Convention::Physical,
        })
    }

    pub fn is_logical(&self) -> bool {
        self.convention == Convention::Logical
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            RelBody::Scan { table, .. } => write!(f, "Scan({})", table),
            RelBody::Filter { predicate } => write!(f, "Filter({})", predicate),
            RelBody::Project { exprs, aliases } => {
                let items: Vec<String> = exprs
                    .iter()
                    .zip(aliases)
                    .map(|(e, alias)| match e {
                        Expr::Column(name) if name == alias => alias.clone(),
                        _ => format!("{} AS {}", e, alias),
                    })
                    .collect();
                write!(f, "Project({})", items.join(", "))
            }
            RelBody::Join {
                join_type,
                condition,
                strategy,
            } => {
                let name = match strategy {
                    JoinStrategy::Unspecified => "Join",
                    JoinStrategy::Hash => "HashJoin",
                    JoinStrategy::NestedLoop => "NestedLoopJoin",
                };
                write!(f, "{}({:?}, {})", name, join_type, condition)
            }
            RelBody::Sort { keys } => write!(f, "Sort({})", keys.join(", ")),
            RelBody::Limit { count } => write!(f, "Limit({})", count),
        }
    }
}

fn expr_type(expr: &Expr, input: Option<&RowType>) -> String {
    match expr {
        Expr::Column(name) => input
            .and_then(|row| row.fields.iter().find(|f| &f.name == name))
            .map(|f| f.data_type.clone())
            .unwrap_or_else(|| "UNKNOWN".to_string()),
        Expr::Literal(v) => v.data_type().to_string(),
        Expr::BinaryOp { op, left, .. } if !op.is_comparison() => expr_type(left, input),
        Expr::BinaryOp { .. } | Expr::Not(_) | Expr::And(_) | Expr::Or(_) => {
            "BOOLEAN".to_string()
        }
    }
}

fn filter_rows(input: f64, predicate: &Expr) -> f64 {
    if predicate.is_true() {
        return input;
    }
    let conjuncts = predicate.conjuncts().len() as i32;
    (input * DEFAULT_FILTER_SELECTIVITY.powi(conjuncts)).max(1.0)
}

impl Operator for RelOp {
    type Kind = RelOpKind;

    fn kind(&self) -> RelOpKind {
        match self.body {
            RelBody::Scan { .. } => RelOpKind::Scan,
            RelBody::Filter { .. } => RelOpKind::Filter,
            RelBody::Project { .. } => RelOpKind::Project,
            RelBody::Join { .. } => RelOpKind::Join,
            RelBody::Sort { .. } => RelOpKind::Sort,
            RelBody::Limit { .. } => RelOpKind::Limit,
        }
    }

    fn digest(&self) -> String {
        self.to_string()
    }

    fn traits(&self) -> TraitSet {
        self.convention.trait_set()
    }

    fn row_type(&self, inputs: &[RowType]) -> RowType {
        match &self.body {
            RelBody::Scan { columns, .. } => RowType::new(columns.clone()),
            RelBody::Project { exprs, aliases } => RowType::new(
                exprs
                    .iter()
                    .zip(aliases)
                    .map(|(e, alias)| Field {
                        name: alias.clone(),
                        data_type: expr_type(e, inputs.first()),
                    })
                    .collect(),
            ),
            RelBody::Join { .. } => match inputs {
                [left, right, ..] => left.concat(right),
                [only] => only.clone(),
                [] => RowType::default(),
            },
            RelBody::Filter { .. } | RelBody::Sort { .. } | RelBody::Limit { .. } => {
                inputs.first().cloned().unwrap_or_default()
            }
        }
    }

    fn row_count(&self, input_rows: &[f64]) -> f64 {
        let first = input_rows.first().copied().unwrap_or(1.0);
        match &self.body {
            RelBody::Scan { rows, .. } => *rows,
            RelBody::Filter { predicate } => filter_rows(first, predicate),
            RelBody::Project { .. } | RelBody::Sort { .. } => first,
            RelBody::Limit { count } => first.min(*count as f64),
            RelBody::Join {
                join_type,
                condition,
                ..
            } => {
                let second = input_rows.get(1).copied().unwrap_or(1.0);
                let inner = match join_type {
                    JoinType::Cross => first * second,
                    _ if condition.has_equi_conjunct() => first.max(second),
                    _ => filter_rows(first * second, condition),
                };
                match join_type {
                    JoinType::Left => inner.max(first),
                    _ => inner,
                }
            }
        }
    }

    fn self_cost(&self, input_rows: &[f64]) -> Cost {
        if self.is_logical() {
            return Cost::INFINITY;
        }
        let out = self.row_count(input_rows);
        let first = input_rows.first().copied().unwrap_or(1.0);
        match &self.body {
            RelBody::Scan { rows, .. } => Cost::new(*rows, *rows, *rows),
            RelBody::Filter { .. } => Cost::new(out, first, 0.0),
            RelBody::Project { exprs, .. } => Cost::new(out, first * exprs.len() as f64, 0.0),
            RelBody::Sort { .. } => {
                let n_log_n = if first > 1.0 { first * first.log2() } else { 1.0 };
                Cost::new(out, n_log_n, 0.0)
            }
            RelBody::Limit { .. } => Cost::new(out, out, 0.0),
            RelBody::Join { strategy, .. } => {
                let second = input_rows.get(1).copied().unwrap_or(1.0);
                let cpu = match strategy {
                    JoinStrategy::Hash => first + second,
                    JoinStrategy::NestedLoop | JoinStrategy::Unspecified => first * second,
                };
                Cost::new(out, cpu, 0.0)
            }
        }
    }
}
