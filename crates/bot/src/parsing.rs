//! Message-text parsing: raw chat text into ledger operations.

use thiserror::Error;

/// One parsed command intent, ready for the dispatcher to act on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Deposit(i64),
    Withdraw(i64),
    Balance,
    Statement,
    Help,
    Ping,
    Unrecognized(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("valor inválido")]
    InvalidAmount,
}

/// Amount commands: first token (ASCII case-insensitive), value in the
/// second token. Anything after the second token is ignored.
const DEPOSIT_KEYWORDS: [&str; 2] = ["ganhei", "recebi"];
const WITHDRAW_KEYWORDS: [&str; 2] = ["gastei", "paguei"];

/// Exact commands, matched against the whole text as literally sent.
const EXACT_COMMANDS: [(&str, Operation); 4] = [
    ("!total", Operation::Balance),
    ("!extrato", Operation::Statement),
    ("!ajuda", Operation::Help),
    ("!teste", Operation::Ping),
];

/// Parses one inbound message.
///
/// The two tables above are checked in order: amount keywords first, exact
/// commands second. Text matching neither is [`Operation::Unrecognized`],
/// which the dispatcher drops without replying. A recognized amount keyword
/// with a missing, non-integer or non-positive value is
/// [`ParseError::InvalidAmount`].
pub fn parse(text: &str) -> Result<Operation, ParseError> {
    let mut tokens = text.split_whitespace();
    if let Some(keyword) = tokens.next() {
        let keyword = keyword.to_ascii_lowercase();
        if DEPOSIT_KEYWORDS.contains(&keyword.as_str()) {
            return Ok(Operation::Deposit(parse_amount(tokens.next())?));
        }
        if WITHDRAW_KEYWORDS.contains(&keyword.as_str()) {
            return Ok(Operation::Withdraw(parse_amount(tokens.next())?));
        }
    }

    for (literal, operation) in &EXACT_COMMANDS {
        if text == *literal {
            return Ok(operation.clone());
        }
    }

    Ok(Operation::Unrecognized(text.to_string()))
}

fn parse_amount(token: Option<&str>) -> Result<i64, ParseError> {
    let value = token
        .and_then(|t| t.parse::<i64>().ok())
        .ok_or(ParseError::InvalidAmount)?;
    if value <= 0 {
        return Err(ParseError::InvalidAmount);
    }
    Ok(value)
}
