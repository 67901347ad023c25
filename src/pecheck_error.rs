// SPDX-License-Identifier: Apache-2.0

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PecheckError {
    /// The device under test could not be created; nothing was evaluated.
    Construction(String),
    UnknownPort(String),
    UnknownOp(String),
    BitFormat(String),
    VectorFile(String),
    Harness(String),
    /// The operand domain is too large for the datapath or for enumeration.
    Domain(String),
    Io(String),
}

impl std::fmt::Display for PecheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PecheckError::Construction(msg) => write!(f, "pecheck error: construction: {}", msg),
            PecheckError::UnknownPort(port) => write!(f, "pecheck error: unknown port `{}`", port),
            PecheckError::UnknownOp(op) => write!(f, "pecheck error: unknown operation `{}`", op),
            PecheckError::BitFormat(msg) => write!(f, "pecheck error: bit format: {}", msg),
            PecheckError::VectorFile(msg) => write!(f, "pecheck error: vector file: {}", msg),
            PecheckError::Harness(msg) => write!(f, "pecheck error: harness: {}", msg),
            PecheckError::Domain(msg) => write!(f, "pecheck error: domain: {}", msg),
            PecheckError::Io(msg) => write!(f, "pecheck error: io: {}", msg),
        }
    }
}

impl std::error::Error for PecheckError {}

impl From<std::io::Error> for PecheckError {
    fn from(e: std::io::Error) -> Self {
        PecheckError::Io(e.to_string())
    }
}
