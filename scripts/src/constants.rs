//! Constants used in the deploy & upgrade scripts

use alloy::primitives::{b256, B256};

/// The default path of the file mapping network names to RPC URLs
pub const DEFAULT_NETWORKS_PATH: &str = "networks.json";

/// The default path of the per-environment deployment configuration
pub const DEFAULT_DEPLOYMENT_CONFIG_PATH: &str = "deployments/deploymentConfig.json";

/// The default directory in which Foundry writes compiled artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "out";

/// The default directory in which the address ledgers are kept
pub const DEFAULT_DEPLOYMENTS_DIR: &str = "deployments";

/// The contract upgraded by default
pub const DEFAULT_CONTRACT_NAME: &str = "PufferVaultV3";

/// The name of the proxy contract deployed in front of every implementation
///
/// Compiled from https://github.com/OpenZeppelin/openzeppelin-contracts/blob/v5.0.0/contracts/proxy/transparent/TransparentUpgradeableProxy.sol
pub const PROXY_CONTRACT_NAME: &str = "TransparentUpgradeableProxy";

/// The number of constructor arguments of the proxy contract:
/// `(address _logic, address initialOwner, bytes _data)`
pub const NUM_PROXY_CONSTRUCTOR_ARGS: usize = 3;

/// The name of the initializer function invoked through the proxy constructor
pub const INITIALIZER_NAME: &str = "initialize";

/// The number of bytes in a function selector
pub const NUM_BYTES_SELECTOR: usize = 4;

/// The markup applied on top of the network gas price, in percent
pub const GAS_PRICE_MARKUP_PERCENT: u128 = 50;

/// The storage slot containing the proxy admin contract address in the upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#admin-address
pub const PROXY_ADMIN_STORAGE_SLOT: B256 =
    b256!("0xb53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103");

/// Suffix of the ledger file holding implementation addresses
pub const IMPLEMENTATIONS_FILE_SUFFIX: &str = "contract-addresses.json";

/// Suffix of the ledger file holding proxy addresses
pub const PROXIES_FILE_SUFFIX: &str = "contract-proxies.json";

/// Extension appended to a ledger path to form its lock file
pub const LOCK_FILE_EXTENSION: &str = "lock";

/// Extension appended to a ledger path to form its staging file
pub const TMP_FILE_EXTENSION: &str = "tmp";

/// The indentation used when pretty-printing the ledger files
pub const LEDGER_INDENT: &[u8] = b"    ";

/// The key in a network entry of `networks.json` holding the RPC URL
pub const NETWORK_URL_KEY: &str = "url";

/// The deployment config key listing the recipients to register after an upgrade
pub const SPECIFIC_RECIPIENTS_KEY: &str = "specific_recipients";

/// The deployment config key holding the proxy admin address
pub const PROXY_ADMIN_KEY: &str = "proxy_admin";

/// The name of the git command
pub const GIT_COMMAND: &str = "git";

/// Arguments to `git` printing the current branch name
pub const GIT_BRANCH_ARGS: [&str; 3] = ["rev-parse", "--abbrev-ref", "HEAD"];

/// The default maximum grant amount set after an upgrade, in ether units
pub const DEFAULT_MAX_GRANT_AMOUNT: &str = "1";
