//! Hilite query language and wire envelopes.
//!
//! Peers synchronise their selection state by exchanging hilite commands: a
//! mode (`hilite`, `unhilite`, `toggle` or `clear`) plus an optional
//! predicate tree describing which objects the command applies to. This crate
//! holds the data model for those commands, the [`Protocol`] builder used to
//! assemble them, the SQL-like renderer used for diagnostics, and the JSONL
//! envelopes exchanged with the dispatch daemon.
//!
//! ```
//! use hilite_protocol::{Combinator, HiliteMode, Protocol};
//!
//! let predicate = Protocol::simple(Combinator::And, [], [("time", 3), ("ilastik_id", 17)]);
//! let command = Protocol::cmd("toggle", Some(predicate)).expect("valid mode");
//! assert_eq!(command.mode, HiliteMode::Toggle);
//! assert_eq!(
//!     Protocol::verbose(&command).expect("hilite command"),
//!     "TOGGLE * WHERE ( ilastik_id == 17 ) AND ( time == 3 )",
//! );
//! ```

mod builder;
mod command;
mod errors;
mod predicate;
pub mod queries;
mod render;
pub mod wire;

pub use builder::Protocol;
pub use command::{HILITE_COMMAND, HiliteCommand, HiliteMode};
pub use errors::ProtocolError;
pub use predicate::{Combinator, Comparison, Negation, Predicate, Scalar};
