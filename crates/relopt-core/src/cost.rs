//! # Cost Value
//!
//! This module defines the cost abstraction shared by both planners.
//!
//! ## Vector Cost
//!
//! A plan's cost is not collapsed into a single number. It is a triple of
//! estimated output rows, CPU work and I/O work:
//!
//! ```text
//! {rows, cpu, io}
//! ```
//!
//! Costs are compared component-wise, which makes the ordering a *partial* order:
//! `a.is_le(b)` holds only when every component of `a` is at most the matching
//! component of `b`. Two costs where each is cheaper along a different dimension
//! are incomparable, and neither is ever treated as an improvement over the other.
//!
//! ## Sentinels
//!
//! - `Cost::INFINITY`: not implementable (every component `+inf`). Absorbs arithmetic.
//! - `Cost::HUGE`: the largest finite cost.
//! - `Cost::ZERO`: free.
//! - `Cost::TINY`: the minimal non-zero overhead of one trivial operator.
//!
//! ## Accumulation
//!
//! Cumulative costs are additive: a node's cumulative cost is its self-cost (supplied by
//! the operator) plus the cumulative costs of its inputs.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

/// Tolerance used by [`Cost::is_eq_with_epsilon`].
pub const EPSILON: f64 = 1.0e-5;

/// Immutable three-component cost: rows, cpu and io.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cost {
    rows: f64,
    cpu: f64,
    io: f64,
}

impl Cost {
    pub const INFINITY: Cost = Cost::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    pub const HUGE: Cost = Cost::new(f64::MAX, f64::MAX, f64::MAX);
    pub const ZERO: Cost = Cost::new(0.0, 0.0, 0.0);
    pub const TINY: Cost = Cost::new(1.0, 1.0, 0.0);

    pub const fn new(rows: f64, cpu: f64, io: f64) -> Self {
        Self { rows, cpu, io }
    }

    pub fn rows(&self) -> f64 {
        self.rows
    }

    pub fn cpu(&self) -> f64 {
        self.cpu
    }

    pub fn io(&self) -> f64 {
        self.io
    }

    /// True if any component is `+inf`.
    pub fn is_infinite(&self) -> bool {
        self.rows == f64::INFINITY || self.cpu == f64::INFINITY || self.io == f64::INFINITY
    }

    /// Component-wise `<=` on all three dimensions.
    pub fn is_le(&self, other: &Cost) -> bool {
        self.rows <= other.rows && self.cpu <= other.cpu && self.io <= other.io
    }

    /// `is_le` and not equal. Incomparable costs are never less than each other.
    pub fn is_lt(&self, other: &Cost) -> bool {
        self.is_le(other) && self != other
    }

    pub fn is_eq_with_epsilon(&self, other: &Cost) -> bool {
        self == other
            || ((self.rows - other.rows).abs() < EPSILON
                && (self.cpu - other.cpu).abs() < EPSILON
                && (self.io - other.io).abs() < EPSILON)
    }

    pub fn plus(&self, other: &Cost) -> Cost {
        if self.is_infinite() || other.is_infinite() {
            return Cost::INFINITY;
        }
        Cost::new(self.rows + other.rows, self.cpu + other.cpu, self.io + other.io)
    }

    pub fn minus(&self, other: &Cost) -> Cost {
        if self.is_infinite() {
            return *self;
        }
        Cost::new(self.rows - other.rows, self.cpu - other.cpu, self.io - other.io)
    }

    pub fn multiply_by(&self, factor: f64) -> Cost {
        if self.is_infinite() {
            return *self;
        }
        Cost::new(self.rows * factor, self.cpu * factor, self.io * factor)
    }

    /// Geometric mean of the per-component ratios `self / other`.
    ///
    /// Components where either side is zero or infinite are skipped. If every
    /// component is skipped the ratio is `1.0`.
    pub fn divide_by(&self, other: &Cost) -> f64 {
        let pairs = [
            (self.rows, other.rows),
            (self.cpu, other.cpu),
            (self.io, other.io),
        ];
        let mut product = 1.0;
        let mut n = 0;
        for (this, that) in pairs {
            if this != 0.0 && this.is_finite() && that != 0.0 && that.is_finite() {
                product *= this / that;
                n += 1;
            }
        }
        if n == 0 {
            return 1.0;
        }
        product.powf(1.0 / n as f64)
    }
}

impl Default for Cost {
    fn default() -> Self {
        Cost::ZERO
    }
}

/// Exact component-wise equality.
impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cpu == other.cpu && self.io == other.io
    }
}

/// The partial order behind `is_le`: `None` for incomparable costs.
impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else if self.is_le(other) {
            Some(Ordering::Less)
        } else if other.is_le(self) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Cost {
        self.plus(&rhs)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Cost::INFINITY {
            write!(f, "{{inf}}")
        } else if *self == Cost::HUGE {
            write!(f, "{{huge}}")
        } else if *self == Cost::ZERO {
            write!(f, "{{0}}")
        } else if *self == Cost::TINY {
            write!(f, "{{tiny}}")
        } else {
            write!(f, "{{{} rows, {} cpu, {} io}}", self.rows, self.cpu, self.io)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_order() {
        let a = Cost::new(10.0, 5.0, 1.0);
        let b = Cost::new(12.0, 5.0, 1.0);
        let c = Cost::new(8.0, 9.0, 1.0);

        assert!(a.is_le(&b));
        assert!(a.is_lt(&b));
        assert!(!b.is_lt(&a));
        assert!(a.is_le(&a));
        assert!(!a.is_lt(&a));

        // a is cheaper in rows, c is cheaper in cpu: incomparable.
        assert!(!a.is_lt(&c));
        assert!(!c.is_lt(&a));
        assert_eq!(a.partial_cmp(&c), None);
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Less));
    }

    #[test]
    fn test_infinity_absorbs() {
        let a = Cost::new(1.0, 2.0, 3.0);
        assert_eq!(a.plus(&Cost::INFINITY), Cost::INFINITY);
        assert_eq!(Cost::INFINITY.plus(&a), Cost::INFINITY);
        assert_eq!(Cost::INFINITY.minus(&a), Cost::INFINITY);
        assert_eq!(Cost::INFINITY.multiply_by(0.5), Cost::INFINITY);
        assert!(Cost::new(1.0, f64::INFINITY, 0.0).is_infinite());
        assert!(a.is_lt(&Cost::INFINITY));
        assert!(Cost::HUGE.is_lt(&Cost::INFINITY));
    }

    #[test]
    fn test_arithmetic() {
        let a = Cost::new(10.0, 20.0, 30.0);
        let b = Cost::new(1.0, 2.0, 3.0);
        assert_eq!(a.plus(&b), Cost::new(11.0, 22.0, 33.0));
        assert_eq!(a + b, Cost::new(11.0, 22.0, 33.0));
        assert_eq!(a.minus(&b), Cost::new(9.0, 18.0, 27.0));
        assert_eq!(b.multiply_by(2.0), Cost::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_divide_by_geometric_mean() {
        let a = Cost::new(8.0, 2.0, 0.0);
        let b = Cost::new(2.0, 1.0, 5.0);
        // io skipped (zero on one side): sqrt(4 * 2)
        let ratio = a.divide_by(&b);
        assert!((ratio - 8.0_f64.sqrt()).abs() < 1e-12);

        assert_eq!(Cost::ZERO.divide_by(&Cost::INFINITY), 1.0);
    }

    #[test]
    fn test_display_sentinels() {
        assert_eq!(Cost::INFINITY.to_string(), "{inf}");
        assert_eq!(Cost::HUGE.to_string(), "{huge}");
        assert_eq!(Cost::ZERO.to_string(), "{0}");
        assert_eq!(Cost::TINY.to_string(), "{tiny}");
        assert_eq!(Cost::new(5.0, 1.0, 2.0).to_string(), "{5 rows, 1 cpu, 2 io}");
    }

    #[test]
    fn test_epsilon_equality() {
        let a = Cost::new(1.0, 1.0, 1.0);
        let b = Cost::new(1.000_001, 1.0, 1.0);
        assert!(a.is_eq_with_epsilon(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Cost::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(json, r#"{"rows":1.0,"cpu":2.0,"io":3.0}"#);
    }
}
