//! Test suites for the hilite daemon.

mod dispatch_behaviour;
mod support;
mod unit;
