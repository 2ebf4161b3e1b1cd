//! Default column vocabulary and the canned queries viewers offer in their
//! context menus.
//!
//! Object tables shared with peers identify an object by its timestep and
//! per-timestep id, tracks by one `track_id<n>` column per merged object slot,
//! and lineages by a single id.

use crate::builder::Protocol;
use crate::command::{HiliteCommand, HiliteMode};
use crate::predicate::{Combinator, Predicate};

/// Column holding the timestep of an object.
pub const TIME: &str = "time";

/// Column holding the per-timestep object id.
pub const OBJECT_ID: &str = "ilastik_id";

/// Column holding the lineage id of a tracked object.
pub const LINEAGE_ID: &str = "lineage_id";

/// Wildcard column for the track id slots of merged objects.
pub const TRACK_ID_PATTERN: &str = "track_id*";

/// Selects every object of a timestep.
#[must_use]
pub fn timestep(time: i64) -> Predicate {
    Protocol::simple(Combinator::Or, [], [(TIME, time)])
}

/// Selects one object of one timestep.
#[must_use]
pub fn object(time: i64, object_id: i64) -> Predicate {
    Protocol::simple(Combinator::And, [], [(TIME, time), (OBJECT_ID, object_id)])
}

/// Selects every object belonging to one of `tracks`.
///
/// A merged detection may carry up to `max_objects` track ids, so each track
/// is matched against the columns `track_id1` through `track_id<max_objects>`.
/// With `max_objects == 0` the predicate is vacuous.
#[must_use]
pub fn tracks(tracks: &[i64], max_objects: u32) -> Predicate {
    Protocol::simple_in(TRACK_ID_PATTERN, tracks.iter().copied(), 1..=max_objects)
}

/// Selects every object of a lineage.
#[must_use]
pub fn lineage(lineage_id: i64) -> Predicate {
    Protocol::simple(Combinator::Or, [], [(LINEAGE_ID, lineage_id)])
}

/// Builds one command per selective mode for the same predicate.
///
/// Viewers use this to populate a "Hilite ..." submenu with one entry per
/// mode; clearing is offered separately since it takes no predicate.
#[must_use]
pub fn per_mode(predicate: &Predicate) -> Vec<HiliteCommand> {
    HiliteMode::SELECTIVE
        .into_iter()
        .map(|mode| HiliteCommand::new(mode, Some(predicate.clone())))
        .collect()
}
