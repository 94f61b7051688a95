//! Network and deployment configuration, resolved once at startup

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::primitives::Address;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    constants::{NETWORK_URL_KEY, PROXY_ADMIN_KEY, SPECIFIC_RECIPIENTS_KEY},
    errors::ScriptError,
    ledger::AddressLedger,
    utils::read_json_file,
};

/// The deployment environment a network belongs to
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    /// Development networks (the default bucket)
    Develop,
    /// Staging networks
    Staging,
    /// Production networks
    Prod,
}

impl Environment {
    /// Classify a network by its name.
    ///
    /// A name containing "mainnet" is production, otherwise one containing
    /// "staging" is staging, and anything else is develop. Matching ignores
    /// ASCII case, and the mainnet check takes precedence.
    pub fn from_network_name(network_name: &str) -> Self {
        let name = network_name.to_ascii_lowercase();
        if name.contains("mainnet") {
            Environment::Prod
        } else if name.contains("staging") {
            Environment::Staging
        } else {
            Environment::Develop
        }
    }

    /// The key of this environment's bundle in the deployment config
    pub fn config_key(&self) -> &'static str {
        match self {
            Environment::Develop => "develop",
            Environment::Staging => "staging",
            Environment::Prod => "prod",
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.config_key())
    }
}

/// A single entry of `networks.json`
#[derive(Debug, Clone, Deserialize)]
struct NetworkEntry {
    /// The RPC endpoint of the network
    url: Option<String>,
}

/// The static mapping of network names to RPC endpoints
#[derive(Debug, Clone, Default)]
pub struct Networks {
    entries: BTreeMap<String, NetworkEntry>,
}

impl Networks {
    /// Load the networks file at the given path
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let value = read_json_file(path)?;
        Self::from_value(value)
    }

    /// Build the mapping from an already-parsed JSON document
    pub fn from_value(value: Value) -> Result<Self, ScriptError> {
        let entries = serde_json::from_value(value)
            .map_err(|e| ScriptError::ReadFile(format!("malformed networks file: {e}")))?;
        Ok(Self { entries })
    }

    /// The RPC URL configured for the given network
    pub fn rpc_url(&self, network_name: &str) -> Result<String, ScriptError> {
        self.entries
            .get(network_name)
            .and_then(|entry| entry.url.clone())
            .ok_or_else(|| {
                ScriptError::ConfigNotFound(format!(
                    "{NETWORK_URL_KEY} for network {network_name}"
                ))
            })
    }
}

/// A resolved network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// The network name, as keyed in the networks file and the ledgers
    pub name: String,
    /// The RPC endpoint
    pub rpc_url: String,
    /// The environment bucket the network falls in
    pub environment: Environment,
}

impl NetworkConfig {
    /// Resolve a network name against the networks mapping
    pub fn resolve(networks: &Networks, network_name: &str) -> Result<Self, ScriptError> {
        Ok(Self {
            name: network_name.to_string(),
            rpc_url: networks.rpc_url(network_name)?,
            environment: Environment::from_network_name(network_name),
        })
    }
}

/// The deployment parameters in effect for one network.
///
/// Built from the environment's bundle in `deploymentConfig.json`, overlaid
/// with the bundle keyed by the network name itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentConfig {
    settings: Map<String, Value>,
}

impl DeploymentConfig {
    /// Load and merge the deployment config for the given network
    pub fn load(path: &Path, network: &NetworkConfig) -> Result<Self, ScriptError> {
        let value = read_json_file(path)?;
        Self::from_value(value, &network.name, network.environment)
    }

    /// Merge the bundles of an already-parsed deployment config
    pub fn from_value(
        value: Value,
        network_name: &str,
        environment: Environment,
    ) -> Result<Self, ScriptError> {
        let Value::Object(root) = value else {
            return Err(ScriptError::ReadFile(
                "deployment config must be a JSON object".to_string(),
            ));
        };

        let mut settings = bundle(&root, environment.config_key())?;
        settings.extend(bundle(&root, network_name)?);

        Ok(Self { settings })
    }

    /// A raw setting
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// The recipients to register on the upgraded contract
    pub fn specific_recipients(&self) -> Result<Vec<Address>, ScriptError> {
        let Some(value) = self.get(SPECIFIC_RECIPIENTS_KEY) else {
            return Ok(Vec::new());
        };

        let entries = value.as_array().ok_or_else(|| {
            ScriptError::ReadFile(format!("{SPECIFIC_RECIPIENTS_KEY} must be an array"))
        })?;

        entries
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .ok_or_else(|| {
                        ScriptError::ReadFile(format!(
                            "{SPECIFIC_RECIPIENTS_KEY} entries must be strings"
                        ))
                    })
                    .and_then(parse_address)
            })
            .collect()
    }

    /// The proxy admin address, if the config names one
    pub fn proxy_admin(&self) -> Result<Option<Address>, ScriptError> {
        match self.get(PROXY_ADMIN_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => parse_address(s).map(Some),
            Some(_) => Err(ScriptError::ReadFile(format!(
                "{PROXY_ADMIN_KEY} must be a string"
            ))),
        }
    }
}

/// Fetch a nested object from the deployment config root, empty if absent
fn bundle(root: &Map<String, Value>, key: &str) -> Result<Map<String, Value>, ScriptError> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(ScriptError::ReadFile(format!(
            "deployment config entry {key} must be a JSON object"
        ))),
    }
}

fn parse_address(s: &str) -> Result<Address, ScriptError> {
    Address::from_str(s).map_err(|e| ScriptError::ReadFile(format!("invalid address {s}: {e}")))
}

/// Everything a script needs to know about its target, constructed once at
/// startup and passed by reference to every operation
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// The target network
    pub network: NetworkConfig,
    /// The deployment parameters for the target network
    pub deployment: DeploymentConfig,
    /// The directory containing the compiled artifacts
    pub artifacts_dir: PathBuf,
    /// The ledger recording deployed addresses
    pub ledger: AddressLedger,
}
