//! Typed handler arguments decoded from a command payload.
//!
//! Each command kind owns one argument struct. Missing fields fall back to
//! their documented defaults; fields a handler does not know are ignored.

use hilite_protocol::wire::Payload;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::command::CommandKind;
use super::errors::HandlerError;
use super::target::{PeerAddress, ViewerPosition};

/// Decodes the arguments of `kind` from its payload.
pub(crate) fn decode<T: DeserializeOwned>(
    kind: CommandKind,
    data: &Payload,
) -> Result<T, HandlerError> {
    serde_json::from_value(Value::Object(data.clone()))
        .map_err(|error| HandlerError::invalid_arguments(kind.as_str(), error.to_string()))
}

/// Arguments of `handshake` and `goodbye`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeerArguments {
    pub protocol: String,
    pub name: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

impl PeerArguments {
    /// Address of the peer, present only when both host and port were sent.
    #[must_use]
    pub fn address(&self) -> Option<PeerAddress> {
        match (&self.host, self.port) {
            (Some(host), Some(port)) => Some(PeerAddress::new(host.clone(), port)),
            _ => None,
        }
    }
}

/// Arguments of `clear peers`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClearPeersArguments {
    pub protocol: String,
}

/// Arguments of `setviewerposition`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PositionArguments {
    pub t: i64,
    pub x: i64,
    pub y: i64,
    pub z: i64,
    pub c: i64,
}

impl PositionArguments {
    /// Position the viewers are moved to.
    #[must_use]
    pub const fn position(self) -> ViewerPosition {
        ViewerPosition::new(self.t, self.x, self.y, self.z, self.c)
    }
}

/// Arguments of `unsetviewerposition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UnsetPositionArguments {
    #[serde(flatten)]
    pub position: PositionArguments,
    #[serde(default = "keep_by_default")]
    pub keep: bool,
}

/// Arguments of `ilastikhilite`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HiliteArguments {
    #[serde(default)]
    pub t: i64,
    #[serde(default)]
    pub oid: i64,
    #[serde(default = "keep_by_default")]
    pub keep: bool,
    #[serde(default = "default_method")]
    pub method: String,
}

/// Shell operation selected by the `method` field of a hilite request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiliteMethod {
    /// Add the object to the hilite set.
    Hilite,
    /// Remove the object from the hilite set.
    Unhilite,
}

impl HiliteMethod {
    /// Parses a method name case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::UnknownMethod`] for anything other than
    /// `hilite` or `unhilite`.
    pub fn parse(method: &str) -> Result<Self, HandlerError> {
        if method.eq_ignore_ascii_case("hilite") {
            Ok(Self::Hilite)
        } else if method.eq_ignore_ascii_case("unhilite") {
            Ok(Self::Unhilite)
        } else {
            Err(HandlerError::unknown_method(method))
        }
    }
}

const fn keep_by_default() -> bool {
    true
}

fn default_method() -> String {
    String::from("hilite")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object payload, got {other}"),
        }
    }

    #[test]
    fn position_fields_default_to_zero() {
        let arguments: PositionArguments =
            decode(CommandKind::SetViewerPosition, &payload(json!({"x": 5}))).expect("decode");
        assert_eq!(arguments.position().to_array(), [0, 5, 0, 0, 0]);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let data = payload(json!({"protocol": "knime", "t": 1, "extra": [1, 2]}));
        let arguments: PositionArguments =
            decode(CommandKind::SetViewerPosition, &data).expect("decode");
        assert_eq!(arguments.t, 1);
    }

    #[test]
    fn unset_position_keeps_by_default() {
        let arguments: UnsetPositionArguments =
            decode(CommandKind::UnsetViewerPosition, &payload(json!({"t": 2}))).expect("decode");
        assert!(arguments.keep);
        assert_eq!(arguments.position.t, 2);
    }

    #[test]
    fn hilite_defaults() {
        let arguments: HiliteArguments =
            decode(CommandKind::Hilite, &Payload::new()).expect("decode");
        assert_eq!(
            arguments,
            HiliteArguments {
                t: 0,
                oid: 0,
                keep: true,
                method: String::from("hilite"),
            }
        );
    }

    #[test]
    fn peer_arguments_require_protocol_and_name() {
        let result: Result<PeerArguments, _> =
            decode(CommandKind::Handshake, &payload(json!({"protocol": "knime"})));
        assert!(matches!(
            result,
            Err(HandlerError::InvalidArguments { ref command, .. }) if command == "handshake"
        ));
    }

    #[rstest]
    #[case::both(json!({"host": "localhost", "port": 9998}), Some(PeerAddress::new("localhost", 9998)))]
    #[case::host_only(json!({"host": "localhost"}), None)]
    #[case::port_only(json!({"port": 9998}), None)]
    #[case::neither(json!({}), None)]
    fn address_requires_host_and_port(#[case] extra: Value, #[case] expected: Option<PeerAddress>) {
        let mut data = payload(json!({"protocol": "knime", "name": "table"}));
        data.extend(payload(extra));
        let arguments: PeerArguments = decode(CommandKind::Handshake, &data).expect("decode");
        assert_eq!(arguments.address(), expected);
    }

    #[rstest]
    #[case::lower("hilite", HiliteMethod::Hilite)]
    #[case::upper("UNHILITE", HiliteMethod::Unhilite)]
    #[case::mixed("UnHilite", HiliteMethod::Unhilite)]
    fn methods_parse_case_insensitively(#[case] name: &str, #[case] expected: HiliteMethod) {
        assert_eq!(HiliteMethod::parse(name).expect("known method"), expected);
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(matches!(
            HiliteMethod::parse("bogus"),
            Err(HandlerError::UnknownMethod { ref method }) if method == "bogus"
        ));
    }
}
