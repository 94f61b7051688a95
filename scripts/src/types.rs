//! Type definitions used throughout the scripts

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use alloy::{
    json_abi::JsonAbi,
    primitives::{Address, Bytes, U256},
};
use serde::Deserialize;

/// The contents of a ledger file: network name -> contract name -> address
pub type LedgerMap = BTreeMap<String, BTreeMap<String, String>>;

/// The kind of address recorded in the ledger
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LedgerKind {
    /// The address of an implementation (logic) contract
    Implementation,
    /// The address of a proxy delegating to an implementation
    Proxy,
}

impl Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerKind::Implementation => write!(f, "implementation"),
            LedgerKind::Proxy => write!(f, "proxy"),
        }
    }
}

/// A compiled contract artifact, as written by `forge build`
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode
    pub bytecode: ArtifactBytecode,
}

/// The bytecode section of a compiled artifact
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactBytecode {
    /// The hex-encoded bytecode
    pub object: String,
}

/// The parameters of an upgrade run
#[derive(Debug, Clone)]
pub struct UpgradePlan {
    /// The implementation contract to deploy
    pub contract_name: String,
    /// The owner handed to the proxy, which creates its `ProxyAdmin` for it
    pub proxy_admin: Address,
    /// The parameter types of the `initialize` call made by the proxy constructor
    pub init_types: Vec<String>,
    /// The values passed to the `initialize` call, one per type
    pub init_values: Vec<String>,
    /// The maximum grant amount set on the upgraded contract, in wei
    pub max_grant_amount: U256,
    /// The recipients registered on the upgraded contract
    pub recipients: Vec<Address>,
}

/// A contract compiled and ready to deploy
#[derive(Debug, Clone)]
pub struct CompiledContract {
    /// The contract name
    pub name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The decoded creation bytecode
    pub bytecode: Bytes,
}
