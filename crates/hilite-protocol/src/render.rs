//! SQL-like rendering of hilite commands for logs and diagnostics.

use crate::command::{HILITE_COMMAND, HiliteCommand, HiliteMode};
use crate::errors::ProtocolError;
use crate::predicate::Predicate;

/// Placeholder emitted for a composite without operands.
const MISSING: &str = "MISSING";

pub(crate) fn verbose(command: &HiliteCommand) -> Result<String, ProtocolError> {
    if command.command != HILITE_COMMAND {
        return Err(ProtocolError::unsupported_command(&command.command));
    }
    if command.mode == HiliteMode::Clear {
        return Ok(String::from("CLEAR *"));
    }
    let predicate = command
        .predicate
        .as_ref()
        .ok_or_else(|| ProtocolError::missing_predicate(command.mode.as_str()))?;

    let mut tokens = Vec::new();
    push_tokens(&mut tokens, predicate);
    Ok(format!(
        "{} * WHERE {}",
        command.mode.as_str().to_ascii_uppercase(),
        tokens.join(" ")
    ))
}

fn push_tokens(tokens: &mut Vec<String>, predicate: &Predicate) {
    match predicate {
        Predicate::Leaf {
            operator,
            column,
            value,
        } => {
            tokens.push(column.clone());
            tokens.push(operator.as_str().to_owned());
            tokens.push(value.to_string());
        }
        Predicate::Composite { operator, operands } => {
            if operands.is_empty() {
                tokens.push(String::from(MISSING));
                return;
            }
            let joiner = operator.as_str().to_ascii_uppercase();
            for (index, operand) in operands.iter().enumerate() {
                if index > 0 {
                    tokens.push(joiner.clone());
                }
                push_parenthesised(tokens, operand);
            }
        }
        Predicate::Unary { operator, operand } => {
            tokens.push(operator.as_str().to_ascii_uppercase());
            push_parenthesised(tokens, operand);
        }
    }
}

fn push_parenthesised(tokens: &mut Vec<String>, predicate: &Predicate) {
    tokens.push(String::from("("));
    push_tokens(tokens, predicate);
    tokens.push(String::from(")"));
}
