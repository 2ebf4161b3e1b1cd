//! Stateless builder for hilite predicates and commands.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::command::{HiliteCommand, HiliteMode};
use crate::errors::ProtocolError;
use crate::predicate::{Combinator, Comparison, Negation, Predicate, Scalar};
use crate::render;

/// Builder for hilite `where` clauses and commands.
///
/// Every function is pure and allocates fresh values, so the builder can be
/// used from any thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Protocol;

impl Protocol {
    /// Builds a single leaf predicate, `column <operator> value`.
    ///
    /// `simple_op(Comparison::Eq, "lineage_id", 42)` renders as
    /// `lineage_id == 42`.
    #[must_use]
    pub fn simple_op(
        operator: Comparison,
        column: impl Into<String>,
        value: impl Into<Scalar>,
    ) -> Predicate {
        Predicate::Leaf {
            operator,
            column: column.into(),
            value: value.into(),
        }
    }

    /// Builds a composite from finished sub-clauses plus one equality leaf per
    /// attribute.
    ///
    /// Sub-clauses keep their order and come first. Attribute leaves follow,
    /// sorted by column name; a column named twice keeps the last value.
    #[must_use]
    pub fn simple<K, V>(
        operator: Combinator,
        wheres: impl IntoIterator<Item = Predicate>,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> Predicate
    where
        K: Into<String>,
        V: Into<Scalar>,
    {
        let attributes: BTreeMap<String, Scalar> = attributes
            .into_iter()
            .map(|(column, value)| (column.into(), value.into()))
            .collect();

        let mut operands: Vec<Predicate> = wheres.into_iter().collect();
        operands.extend(
            attributes
                .into_iter()
                .map(|(column, value)| Predicate::eq(column, value)),
        );

        Predicate::Composite { operator, operands }
    }

    /// Builds an `or` over every combination of wildcard filler and possible
    /// value.
    ///
    /// Each `*` in `column` is replaced by the filler. Leaves are grouped by
    /// value, every filler for one value before the next value:
    /// `simple_in("track_id*", [42, 1337], [1, 2])` yields
    /// `track_id1 == 42`, `track_id2 == 42`, `track_id1 == 1337`,
    /// `track_id2 == 1337`. This is the documented grouping for the
    /// operation; iterating filler-major instead would select the same
    /// objects but reorder the operands on the wire. Without fillers the
    /// result is an empty `or` which selects nothing.
    #[must_use]
    pub fn simple_in<V, F>(
        column: &str,
        possibilities: impl IntoIterator<Item = V>,
        wildcard_filler: impl IntoIterator<Item = F>,
    ) -> Predicate
    where
        V: Into<Scalar>,
        F: Display,
    {
        let possibilities: Vec<Scalar> = possibilities.into_iter().map(Into::into).collect();
        let columns: Vec<String> = wildcard_filler
            .into_iter()
            .map(|filler| column.replace('*', &filler.to_string()))
            .collect();

        let operands = possibilities
            .iter()
            .flat_map(|value| {
                columns
                    .iter()
                    .map(move |name| Predicate::eq(name.clone(), value.clone()))
            })
            .collect();

        Predicate::Composite {
            operator: Combinator::Or,
            operands,
        }
    }

    /// Wraps a predicate in a negation.
    #[must_use]
    pub fn negate(predicate: Predicate) -> Predicate {
        Predicate::Unary {
            operator: Negation::Not,
            operand: Box::new(predicate),
        }
    }

    /// Builds the command that clears every hilite.
    #[must_use]
    pub fn clear() -> HiliteCommand {
        HiliteCommand::new(HiliteMode::Clear, None)
    }

    /// Builds a hilite command for the named mode.
    ///
    /// The mode is matched case-insensitively. The `where` key is left out of
    /// the command entirely when `predicate` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidMode`] if `mode` is not a hilite mode.
    pub fn cmd(mode: &str, predicate: Option<Predicate>) -> Result<HiliteCommand, ProtocolError> {
        let mode = HiliteMode::parse(mode)?;
        Ok(HiliteCommand::new(mode, predicate))
    }

    /// Renders a command as an SQL-like string for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnsupportedCommand`] for anything other than a
    /// hilite command and [`ProtocolError::MissingPredicate`] when a non-clear
    /// command has no `where` clause.
    pub fn verbose(command: &HiliteCommand) -> Result<String, ProtocolError> {
        render::verbose(command)
    }
}
