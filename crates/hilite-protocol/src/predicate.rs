//! Predicate trees used as the `where` clause of hilite commands.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison applied by a leaf predicate.
///
/// Equality is the only comparison peers understand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    /// `column == value`.
    #[default]
    #[serde(rename = "==")]
    Eq,
}

impl Comparison {
    /// Returns the wire token for the comparison.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
        }
    }
}

/// Boolean combinator joining the operands of a composite predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Every operand must match.
    And,
    /// At least one operand must match.
    Or,
}

impl Combinator {
    /// Returns the wire token for the combinator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Unary operator wrapping a single operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Negation {
    /// Logical complement of the operand.
    Not,
}

impl Negation {
    /// Returns the wire token for the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Not => "not",
        }
    }
}

/// Value compared against a column in a leaf predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer, used for object, time and track identifiers.
    Int(i64),
    /// Floating point measurement.
    Float(f64),
    /// Free-form text.
    Text(String),
}

/// Renders the value as it appears in a human-readable query.
///
/// Booleans are capitalised (`True`, `False`) and whole floats keep a
/// trailing `.0` so they stay distinguishable from integers.
impl fmt::Display for Scalar {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => formatter.write_str("True"),
            Self::Bool(false) => formatter.write_str("False"),
            Self::Int(value) => write!(formatter, "{value}"),
            Self::Float(value) => {
                let text = value.to_string();
                if value.is_finite() && !text.contains('.') {
                    write!(formatter, "{text}.0")
                } else {
                    formatter.write_str(&text)
                }
            }
            Self::Text(value) => formatter.write_str(value),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Boolean expression selecting the objects a hilite command applies to.
///
/// The serialized form is untagged: the shape of the object (`value`,
/// `operands` or `operand`) identifies the variant, mirroring the JSON peers
/// already exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Predicate {
    /// Equality test on a named column.
    Leaf {
        /// Comparison applied to the column.
        operator: Comparison,
        /// Column name, for example `ilastik_id`.
        column: String,
        /// Expected value.
        value: Scalar,
    },
    /// Boolean combination of sub-predicates; may be empty.
    Composite {
        /// Combinator joining the operands.
        operator: Combinator,
        /// Operands in the order they were supplied.
        operands: Vec<Predicate>,
    },
    /// Negation of a single sub-predicate.
    Unary {
        /// Unary operator.
        operator: Negation,
        /// Negated operand.
        operand: Box<Predicate>,
    },
}

impl Predicate {
    /// Builds an equality leaf.
    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::Leaf {
            operator: Comparison::Eq,
            column: column.into(),
            value: value.into(),
        }
    }

    /// Returns `true` for a composite without operands.
    ///
    /// Such a predicate selects nothing; the renderer marks it as `MISSING`.
    #[must_use]
    pub fn is_vacuous(&self) -> bool {
        matches!(self, Self::Composite { operands, .. } if operands.is_empty())
    }

    /// Returns the number of leaves in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Composite { operands, .. } => operands.iter().map(Self::leaf_count).sum(),
            Self::Unary { operand, .. } => operand.leaf_count(),
        }
    }
}
