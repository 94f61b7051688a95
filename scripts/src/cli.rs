//! Definitions of CLI arguments for the upgrade script

use std::{path::PathBuf, str::FromStr};

use alloy::primitives::{utils::parse_ether, Address};
use clap::Parser;
use tracing::info;

use crate::{
    commands::upgrade,
    config::{DeploymentConfig, NetworkConfig, Networks, ScriptConfig},
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_CONTRACT_NAME, DEFAULT_DEPLOYMENTS_DIR,
        DEFAULT_DEPLOYMENT_CONFIG_PATH, DEFAULT_MAX_GRANT_AMOUNT, DEFAULT_NETWORKS_PATH,
        PROXY_ADMIN_KEY,
    },
    errors::ScriptError,
    ledger::AddressLedger,
    types::UpgradePlan,
    utils::setup_client,
};

/// Deploy a new implementation of an upgradeable contract behind a fresh
/// proxy, record both addresses, and configure the result
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name of the network to deploy to, as keyed in the networks file
    pub network: Option<String>,

    /// Private key of the deployer
    #[arg(long = "pkey", env = "PKEY", hide_env_values = true)]
    pub priv_key: Option<String>,

    /// Path to the file mapping network names to RPC URLs
    #[arg(long, default_value = DEFAULT_NETWORKS_PATH)]
    pub networks: PathBuf,

    /// Path to the per-environment deployment configuration
    #[arg(long, default_value = DEFAULT_DEPLOYMENT_CONFIG_PATH)]
    pub deployment_config: PathBuf,

    /// Directory containing the compiled contract artifacts
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Directory in which the address ledgers are written
    #[arg(long, default_value = DEFAULT_DEPLOYMENTS_DIR)]
    pub deployments_dir: PathBuf,

    /// Branch name used to namespace the ledgers, defaults to the current git branch
    #[arg(long, env = "DEPLOY_BRANCH")]
    pub branch: Option<String>,

    /// The contract to deploy
    #[arg(short, long, default_value = DEFAULT_CONTRACT_NAME)]
    pub contract: String,

    /// Owner of the proxy's admin contract, in hex.
    /// Falls back to `proxy_admin` in the deployment config
    #[arg(long, env = "PROXY_ADMIN")]
    pub proxy_admin: Option<String>,

    /// Parameter type of the proxy's `initialize` call, repeated once per parameter
    #[arg(long = "init-type")]
    pub init_types: Vec<String>,

    /// Value of the proxy's `initialize` call, repeated once per parameter
    #[arg(long = "init-value")]
    pub init_values: Vec<String>,

    /// The maximum grant amount set after deployment, in ether
    #[arg(long, default_value = DEFAULT_MAX_GRANT_AMOUNT)]
    pub max_grant_amount: String,
}

impl Cli {
    /// Run the upgrade described by the arguments
    pub async fn run(self) -> Result<(), ScriptError> {
        let network_name = self.network.clone().ok_or(ScriptError::MissingNetwork)?;

        let config = self.script_config(&network_name)?;
        let plan = self.upgrade_plan(&config)?;

        let priv_key = self
            .priv_key
            .as_deref()
            .ok_or_else(|| ScriptError::ConfigNotFound("deployer private key (PKEY)".to_string()))?;
        let client = setup_client(priv_key, &config.network.rpc_url)?;

        upgrade(&plan, &config, &client).await
    }

    /// Resolve the configuration for the given network
    pub fn script_config(&self, network_name: &str) -> Result<ScriptConfig, ScriptError> {
        let networks = Networks::load(&self.networks)?;
        let network = NetworkConfig::resolve(&networks, network_name)?;
        let deployment = DeploymentConfig::load(&self.deployment_config, &network)?;

        let ledger = match &self.branch {
            Some(branch) => AddressLedger::new(&self.deployments_dir, branch),
            None => AddressLedger::for_current_branch(&self.deployments_dir)?,
        };

        info!(
            "resolved {} to {} ({} environment)",
            network.name, network.rpc_url, network.environment
        );

        Ok(ScriptConfig {
            network,
            deployment,
            artifacts_dir: self.artifacts_dir.clone(),
            ledger,
        })
    }

    /// Build the upgrade parameters from the arguments and the deployment config
    pub fn upgrade_plan(&self, config: &ScriptConfig) -> Result<UpgradePlan, ScriptError> {
        let proxy_admin = match &self.proxy_admin {
            Some(addr) => Address::from_str(addr).map_err(|e| {
                ScriptError::CalldataConstruction(format!("invalid proxy admin: {e}"))
            })?,
            None => config.deployment.proxy_admin()?.ok_or_else(|| {
                ScriptError::ConfigNotFound(format!(
                    "{PROXY_ADMIN_KEY} for network {}",
                    config.network.name
                ))
            })?,
        };

        let max_grant_amount = parse_ether(&self.max_grant_amount).map_err(|e| {
            ScriptError::CalldataConstruction(format!("invalid max grant amount: {e}"))
        })?;

        Ok(UpgradePlan {
            contract_name: self.contract.clone(),
            proxy_admin,
            init_types: self.init_types.clone(),
            init_values: self.init_values.clone(),
            max_grant_amount,
            recipients: config.deployment.specific_recipients()?,
        })
    }
}
