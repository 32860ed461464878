use std::str::FromStr;
use thiserror::Error;
use yield_api::ProtocolId;
use yield_core::token::parse_amount_input;

pub const HELP: &str = "commands: connect | deposit <amount> | toggle | \
rebalance <from> <to> <percent> | apr <protocol> <percent> | reset | snapshot | quit";

/// A command typed on the runner's stdin.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Connect,
    Deposit(f64),
    ToggleAutoRebalance,
    Rebalance {
        from: ProtocolId,
        to: ProtocolId,
        percentage: f64,
    },
    SetApr { id: ProtocolId, apr: f64 },
    Reset,
    Snapshot,
    Help,
    Quit,
}

impl SessionCommand {
    pub fn is_quit(&self) -> bool {
        matches!(self, SessionCommand::Quit)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ParseCommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}'")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
}

fn number(token: &str) -> Result<f64, ParseCommandError> {
    parse_amount_input(token).ok_or_else(|| ParseCommandError::InvalidNumber(token.to_string()))
}

impl FromStr for SessionCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (name, rest) = tokens.split_first().ok_or(ParseCommandError::Empty)?;

        match (name.to_ascii_lowercase().as_str(), rest) {
            ("connect", []) => Ok(SessionCommand::Connect),
            ("deposit", [amount]) => Ok(SessionCommand::Deposit(number(amount)?)),
            ("deposit", _) => Err(ParseCommandError::Usage("deposit <amount>")),
            ("toggle", []) => Ok(SessionCommand::ToggleAutoRebalance),
            ("rebalance", [from, to, percentage]) => Ok(SessionCommand::Rebalance {
                from: ProtocolId::new(*from),
                to: ProtocolId::new(*to),
                percentage: number(percentage)?,
            }),
            ("rebalance", _) => Err(ParseCommandError::Usage("rebalance <from> <to> <percent>")),
            ("apr", [id, apr]) => Ok(SessionCommand::SetApr {
                id: ProtocolId::new(*id),
                apr: number(apr)?,
            }),
            ("apr", _) => Err(ParseCommandError::Usage("apr <protocol> <percent>")),
            ("reset", []) => Ok(SessionCommand::Reset),
            ("snapshot", []) => Ok(SessionCommand::Snapshot),
            ("help", _) => Ok(SessionCommand::Help),
            ("quit" | "exit", []) => Ok(SessionCommand::Quit),
            _ => Err(ParseCommandError::Unknown(line.trim().to_string())),
        }
    }
}
