//! Viewer state without a user interface, implementing [`Shell`].

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::dispatch::{SessionError, Shell, ViewerPosition};

const SHELL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::shell");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Session {
    timesteps: u32,
    position: ViewerPosition,
    marker: Option<ViewerPosition>,
    hilites: BTreeSet<(i64, i64)>,
}

impl Session {
    fn check_time(&self, t: i64) -> Result<(), SessionError> {
        if t < 0 || t >= i64::from(self.timesteps) {
            return Err(SessionError::OutOfRange {
                index: t,
                timesteps: self.timesteps,
            });
        }
        Ok(())
    }
}

/// Object ids are non-negative; `0` is the background label.
fn check_object(oid: i64) -> Result<(), SessionError> {
    if oid < 0 {
        return Err(SessionError::rejected(format!(
            "object id {oid} is negative"
        )));
    }
    Ok(())
}

/// Headless viewer: a position, a position marker and a hilite set per
/// loaded session.
#[derive(Debug, Default)]
pub struct HeadlessShell {
    session: Mutex<Option<Session>>,
}

impl HeadlessShell {
    /// Creates a shell with no session loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a shell with a session of `timesteps` timesteps loaded.
    #[must_use]
    pub fn with_session(timesteps: u32) -> Self {
        let shell = Self::new();
        shell.load_session(timesteps);
        shell
    }

    /// Loads a fresh session, discarding the previous one.
    pub fn load_session(&self, timesteps: u32) {
        *self.lock_session() = Some(Session {
            timesteps,
            ..Session::default()
        });
        info!(target: SHELL_TARGET, timesteps, "session loaded");
    }

    /// Closes the current session.
    pub fn close_session(&self) {
        if self.lock_session().take().is_some() {
            info!(target: SHELL_TARGET, "session closed");
        }
    }

    /// Reports whether a session is loaded.
    pub fn has_session(&self) -> bool {
        self.lock_session().is_some()
    }

    /// Current viewer position, when a session is loaded.
    pub fn position(&self) -> Option<ViewerPosition> {
        self.lock_session().as_ref().map(|session| session.position)
    }

    /// Position marker set by the last position request, if any.
    pub fn marker(&self) -> Option<ViewerPosition> {
        self.lock_session()
            .as_ref()
            .and_then(|session| session.marker)
    }

    /// Hilited `(t, oid)` pairs in ascending order.
    pub fn hilites(&self) -> Vec<(i64, i64)> {
        self.lock_session()
            .as_ref()
            .map(|session| session.hilites.iter().copied().collect())
            .unwrap_or_default()
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_active<T>(
        &self,
        apply: impl FnOnce(&mut Session) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut guard = self.lock_session();
        let session = guard.as_mut().ok_or(SessionError::NoActiveSession)?;
        apply(session)
    }
}

impl Shell for HeadlessShell {
    fn set_all_viewers_position(&self, position: ViewerPosition) -> Result<(), SessionError> {
        self.with_active(|session| {
            session.check_time(position.t)?;
            session.position = position;
            session.marker = Some(position);
            debug!(target: SHELL_TARGET, position = ?position.to_array(), "viewers moved");
            Ok(())
        })
    }

    fn unset_all_viewers_position(
        &self,
        position: ViewerPosition,
        keep: bool,
    ) -> Result<(), SessionError> {
        self.with_active(|session| {
            session.check_time(position.t)?;
            if session.marker == Some(position) {
                session.marker = None;
            }
            if !keep {
                session.marker = None;
                session.position = ViewerPosition::default();
            }
            Ok(())
        })
    }

    fn set_hilite(&self, t: i64, oid: i64, keep: bool) -> Result<(), SessionError> {
        self.with_active(|session| {
            session.check_time(t)?;
            check_object(oid)?;
            if !keep {
                session.hilites.clear();
            }
            session.hilites.insert((t, oid));
            debug!(target: SHELL_TARGET, t, oid, keep, "object hilited");
            Ok(())
        })
    }

    fn unset_hilite(&self, t: i64, oid: i64, keep: bool) -> Result<(), SessionError> {
        self.with_active(|session| {
            session.check_time(t)?;
            check_object(oid)?;
            if keep {
                session.hilites.remove(&(t, oid));
            } else {
                session.hilites.clear();
            }
            debug!(target: SHELL_TARGET, t, oid, keep, "object unhilited");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn shell() -> HeadlessShell {
        HeadlessShell::with_session(5)
    }

    #[test]
    fn every_mutator_requires_a_session() {
        let shell = HeadlessShell::new();
        let position = ViewerPosition::default();
        assert_eq!(
            shell.set_all_viewers_position(position),
            Err(SessionError::NoActiveSession)
        );
        assert_eq!(
            shell.unset_all_viewers_position(position, true),
            Err(SessionError::NoActiveSession)
        );
        assert_eq!(shell.set_hilite(0, 1, true), Err(SessionError::NoActiveSession));
        assert_eq!(shell.unset_hilite(0, 1, true), Err(SessionError::NoActiveSession));
    }

    #[rstest]
    fn position_is_recorded_and_marked(shell: HeadlessShell) {
        let position = ViewerPosition::new(2, 10, 20, 30, 1);
        shell.set_all_viewers_position(position).expect("move");
        assert_eq!(shell.position(), Some(position));
        assert_eq!(shell.marker(), Some(position));
    }

    #[rstest]
    fn unset_position_with_keep_leaves_viewers_in_place(shell: HeadlessShell) {
        let position = ViewerPosition::new(1, 1, 1, 1, 0);
        shell.set_all_viewers_position(position).expect("move");
        shell
            .unset_all_viewers_position(position, true)
            .expect("unset");
        assert_eq!(shell.marker(), None);
        assert_eq!(shell.position(), Some(position));
    }

    #[rstest]
    fn unset_position_without_keep_resets_viewers(shell: HeadlessShell) {
        let position = ViewerPosition::new(1, 1, 1, 1, 0);
        shell.set_all_viewers_position(position).expect("move");
        shell
            .unset_all_viewers_position(ViewerPosition::default(), false)
            .expect("unset");
        assert_eq!(shell.marker(), None);
        assert_eq!(shell.position(), Some(ViewerPosition::default()));
    }

    #[rstest]
    #[case::negative(-1)]
    #[case::past_end(5)]
    fn times_outside_the_session_are_rejected(shell: HeadlessShell, #[case] t: i64) {
        assert_eq!(
            shell.set_hilite(t, 1, true),
            Err(SessionError::OutOfRange {
                index: t,
                timesteps: 5
            })
        );
    }

    #[rstest]
    fn negative_object_ids_are_rejected(shell: HeadlessShell) {
        shell.set_hilite(0, 1, true).expect("hilite");
        assert!(matches!(
            shell.set_hilite(0, -3, true),
            Err(SessionError::Rejected { .. })
        ));
        assert!(matches!(
            shell.unset_hilite(0, -3, false),
            Err(SessionError::Rejected { .. })
        ));
        assert_eq!(shell.hilites(), vec![(0, 1)]);
    }

    #[rstest]
    fn keep_controls_whether_hilites_accumulate(shell: HeadlessShell) {
        shell.set_hilite(0, 1, true).expect("hilite");
        shell.set_hilite(1, 2, true).expect("hilite");
        assert_eq!(shell.hilites(), vec![(0, 1), (1, 2)]);

        shell.set_hilite(3, 4, false).expect("hilite");
        assert_eq!(shell.hilites(), vec![(3, 4)]);
    }

    #[rstest]
    fn unhilite_removes_one_or_all(shell: HeadlessShell) {
        shell.set_hilite(0, 1, true).expect("hilite");
        shell.set_hilite(0, 2, true).expect("hilite");
        shell.unset_hilite(0, 1, true).expect("unhilite");
        assert_eq!(shell.hilites(), vec![(0, 2)]);

        shell.set_hilite(0, 3, true).expect("hilite");
        shell.unset_hilite(0, 2, false).expect("unhilite");
        assert!(shell.hilites().is_empty());
    }

    #[test]
    fn closing_the_session_drops_state() {
        let shell = HeadlessShell::with_session(2);
        shell.set_hilite(1, 1, true).expect("hilite");
        shell.close_session();
        assert!(!shell.has_session());
        assert!(shell.hilites().is_empty());
        assert_eq!(shell.position(), None);
    }
}
