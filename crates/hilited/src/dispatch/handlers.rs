//! Command handlers.
//!
//! One function per [`CommandKind`]. Handlers decode their arguments, call the
//! bound facade or shell, and report failures as [`HandlerError`]s for the
//! processor to contain.

use hilite_protocol::wire::Payload;

use super::arguments::{
    ClearPeersArguments, HiliteArguments, HiliteMethod, PeerArguments, PositionArguments,
    UnsetPositionArguments, decode,
};
use super::command::CommandKind;
use super::errors::HandlerError;
use super::target::{ExecutionTarget, Facade, SessionError};

/// Runs the handler registered for `kind`.
pub(crate) fn run(
    kind: CommandKind,
    target: &ExecutionTarget,
    data: &Payload,
) -> Result<(), HandlerError> {
    match kind {
        CommandKind::ClearPeers => clear_peers(target, decode(kind, data)?),
        CommandKind::Handshake => handshake(target, decode(kind, data)?),
        CommandKind::SetViewerPosition => set_position(target, decode(kind, data)?),
        CommandKind::UnsetViewerPosition => unset_position(target, decode(kind, data)?),
        CommandKind::Hilite => hilite(target, decode(kind, data)?),
        CommandKind::Goodbye => goodbye(target, decode(kind, data)?),
    }
}

fn facade(target: &ExecutionTarget) -> Result<&dyn Facade, HandlerError> {
    target.facade().ok_or(HandlerError::FacadeUnbound)
}

fn handshake(target: &ExecutionTarget, arguments: PeerArguments) -> Result<(), HandlerError> {
    facade(target)?.handshake(&arguments.protocol, &arguments.name, arguments.address())?;
    Ok(())
}

fn goodbye(target: &ExecutionTarget, arguments: PeerArguments) -> Result<(), HandlerError> {
    facade(target)?.goodbye(&arguments.protocol, &arguments.name, arguments.address())?;
    Ok(())
}

fn clear_peers(
    target: &ExecutionTarget,
    arguments: ClearPeersArguments,
) -> Result<(), HandlerError> {
    facade(target)?.clear_peers(&arguments.protocol)?;
    Ok(())
}

fn set_position(
    target: &ExecutionTarget,
    arguments: PositionArguments,
) -> Result<(), HandlerError> {
    tolerate_inactive(
        target
            .shell()
            .map(|shell| shell.set_all_viewers_position(arguments.position())),
    )
}

fn unset_position(
    target: &ExecutionTarget,
    arguments: UnsetPositionArguments,
) -> Result<(), HandlerError> {
    tolerate_inactive(target.shell().map(|shell| {
        shell.unset_all_viewers_position(arguments.position.position(), arguments.keep)
    }))
}

fn hilite(target: &ExecutionTarget, arguments: HiliteArguments) -> Result<(), HandlerError> {
    let method = HiliteMethod::parse(&arguments.method)?;
    let HiliteArguments { t, oid, keep, .. } = arguments;
    tolerate_inactive(target.shell().map(|shell| match method {
        HiliteMethod::Hilite => shell.set_hilite(t, oid, keep),
        HiliteMethod::Unhilite => shell.unset_hilite(t, oid, keep),
    }))
}

/// Treats a missing shell, a missing session or an index the session does not
/// have as a completed request.
fn tolerate_inactive(result: Option<Result<(), SessionError>>) -> Result<(), HandlerError> {
    match result {
        Some(Err(error)) if !error.is_index_error() => Err(error.into()),
        _ => Ok(()),
    }
}
