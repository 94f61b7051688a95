//! Definitions of errors that can occur during the execution of the deploy & upgrade scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deploy & upgrade scripts
#[derive(Debug)]
pub enum ScriptError {
    /// No network name was given on the command line
    MissingNetwork,
    /// A required configuration entry (RPC URL, private key, proxy admin, ...) is absent
    ConfigNotFound(String),
    /// Error reading a configuration or ledger file
    ReadFile(String),
    /// Error writing a ledger file
    WriteFile(String),
    /// The compiled artifact for a contract does not exist
    ArtifactNotFound(String),
    /// Error parsing a compiled contract artifact
    ArtifactParsing(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// An RPC call was rejected or the endpoint was unreachable
    RpcFailure(String),
    /// Applying the markup to the network gas price overflowed
    GasPriceOverflow(u128),
    /// The initializer types and values have different lengths
    EncodingMismatch {
        /// The number of Solidity types given
        types: usize,
        /// The number of values given
        values: usize,
    },
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// Error determining the current git branch
    GitBranch(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::MissingNetwork => write!(
                f,
                "please provide the network name as a command line argument"
            ),
            ScriptError::ConfigNotFound(s) => write!(f, "configuration not found: {}", s),
            ScriptError::ReadFile(s) => write!(f, "error reading file: {}", s),
            ScriptError::WriteFile(s) => write!(f, "error writing file: {}", s),
            ScriptError::ArtifactNotFound(s) => write!(f, "artifact not found: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::RpcFailure(s) => write!(f, "rpc failure: {}", s),
            ScriptError::GasPriceOverflow(price) => {
                write!(f, "gas price markup overflows for base price {}", price)
            }
            ScriptError::EncodingMismatch { types, values } => write!(
                f,
                "initializer has {} types but {} values",
                types, values
            ),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::GitBranch(s) => write!(f, "error reading git branch: {}", s),
        }
    }
}

impl Error for ScriptError {}
