//! Implementations of the deploy & upgrade steps

use alloy::{
    contract::{CallBuilder, CallDecoder},
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, B256, U256},
    providers::Provider,
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use tracing::{info, warn};

use crate::{
    config::ScriptConfig,
    constants::{NUM_PROXY_CONSTRUCTOR_ARGS, PROXY_ADMIN_STORAGE_SLOT, PROXY_CONTRACT_NAME},
    errors::ScriptError,
    gas::estimate_gas_price,
    solidity::IPufferVaultV3Instance,
    types::{CompiledContract, LedgerKind, UpgradePlan},
    utils::{initializer_calldata, load_artifact, proxy_constructor_args, RpcClient},
};

/// The call builder type used for post-deploy calls
pub type ScriptCallBuilder<'a, C> = CallBuilder<&'a RpcClient, C, Ethereum>;

// --------------
// | Deployment |
// --------------

/// Deploy the implementation of `contract_name` and record its address in
/// the implementation ledger
pub async fn deploy_implementation(
    contract_name: &str,
    config: &ScriptConfig,
    client: &RpcClient,
) -> Result<Address, ScriptError> {
    let contract = load_artifact(&config.artifacts_dir, contract_name)?;
    if let Some(constructor) = contract.abi.constructor() {
        if !constructor.inputs.is_empty() {
            warn!(
                "{contract_name} constructor takes {} arguments, deploying without any",
                constructor.inputs.len()
            );
        }
    }

    let address = deploy_contract(&contract, &[], client).await?;
    info!("{contract_name} implementation address: {address:#x}");

    log_replaced(config, LedgerKind::Implementation, contract_name);
    config.ledger.write(
        LedgerKind::Implementation,
        &config.network.name,
        contract_name,
        address,
    )?;

    Ok(address)
}

/// Deploy a proxy in front of `implementation` whose constructor calls
/// `initialize(init_types...)` with `init_values`, and record its address in
/// the proxy ledger under `contract_name`
pub async fn deploy_proxy(
    contract_name: &str,
    implementation: Address,
    admin: Address,
    init_types: &[String],
    init_values: &[String],
    config: &ScriptConfig,
    client: &RpcClient,
) -> Result<Address, ScriptError> {
    let init_data = initializer_calldata(init_types, init_values)?;

    let proxy = load_artifact(&config.artifacts_dir, PROXY_CONTRACT_NAME)?;
    let num_args = proxy
        .abi
        .constructor()
        .map(|constructor| constructor.inputs.len())
        .unwrap_or_default();
    if num_args != NUM_PROXY_CONSTRUCTOR_ARGS {
        return Err(ScriptError::ArtifactParsing(format!(
            "{PROXY_CONTRACT_NAME} constructor takes {num_args} arguments, \
             expected {NUM_PROXY_CONSTRUCTOR_ARGS}"
        )));
    }

    info!("implementation address: {implementation:#x}");
    info!("proxy admin address: {admin:#x}");

    let constructor_args = proxy_constructor_args(implementation, admin, init_data);
    let address = deploy_contract(&proxy, &constructor_args, client).await?;
    info!("{contract_name} proxy address: {address:#x}");

    log_replaced(config, LedgerKind::Proxy, contract_name);
    config
        .ledger
        .write(LedgerKind::Proxy, &config.network.name, contract_name, address)?;

    // The proxy is deployed and recorded at this point, so a failed lookup is
    // not worth aborting over
    match proxy_admin_address(address, client).await {
        Ok(proxy_admin) => info!("ProxyAdmin contract deployed at {proxy_admin:#x}"),
        Err(e) => warn!("could not read the ProxyAdmin address: {e}"),
    }

    Ok(address)
}

/// Read the address of the `ProxyAdmin` owning the given proxy.
///
/// This is the recommended way to get the proxy admin address:
/// https://github.com/OpenZeppelin/openzeppelin-contracts/blob/v5.0.0/contracts/proxy/ERC1967/ERC1967Utils.sol#L104-L106
pub async fn proxy_admin_address(
    proxy: Address,
    client: &RpcClient,
) -> Result<Address, ScriptError> {
    let word = client
        .get_storage_at(proxy, U256::from_be_bytes(PROXY_ADMIN_STORAGE_SLOT.0))
        .await
        .map_err(|e| ScriptError::RpcFailure(e.to_string()))?;

    Ok(Address::from_word(B256::from(word.to_be_bytes::<32>())))
}

/// Submit a contract creation transaction and wait for the created address
async fn deploy_contract(
    contract: &CompiledContract,
    constructor_args: &[u8],
    client: &RpcClient,
) -> Result<Address, ScriptError> {
    let gas_price = estimate_gas_price(client).await?;
    let tx = deploy_request(contract, constructor_args, gas_price);

    let receipt = client
        .send_transaction(tx)
        .await
        .map_err(|e| ScriptError::RpcFailure(e.to_string()))?
        .get_receipt()
        .await
        .map_err(|e| ScriptError::RpcFailure(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::ContractDeployment(format!(
            "creation of {} reverted in tx {:#x}",
            contract.name, receipt.transaction_hash
        )));
    }

    receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(format!(
            "no contract address in receipt of tx {:#x}",
            receipt.transaction_hash
        ))
    })
}

/// Build a contract creation transaction: the creation bytecode followed by
/// the ABI-encoded constructor arguments
fn deploy_request(
    contract: &CompiledContract,
    constructor_args: &[u8],
    gas_price: u128,
) -> TransactionRequest {
    let mut deploy_code = contract.bytecode.to_vec();
    deploy_code.extend_from_slice(constructor_args);
    TransactionRequest::default()
        .with_deploy_code(deploy_code)
        .with_gas_price(gas_price)
}

/// Log the address about to be replaced in the ledger, if one is recorded
fn log_replaced(config: &ScriptConfig, kind: LedgerKind, contract_name: &str) {
    if let Some(previous) = config.ledger.lookup(kind, &config.network.name, contract_name) {
        info!("replacing recorded {kind} address of {contract_name}: {previous:#x}");
    }
}

// ---------------------
// | Post-deploy setup |
// ---------------------

/// Configure a freshly deployed vault through its proxy: run the V3
/// initializer, set the maximum grant amount, then register each recipient
pub async fn post_deploy_setup(
    proxy: Address,
    max_grant_amount: U256,
    recipients: &[Address],
    client: &RpcClient,
) -> Result<(), ScriptError> {
    let vault = IPufferVaultV3Instance::new(proxy, client.clone());
    let gas_price = estimate_gas_price(client).await?;

    for (description, call) in setup_calls(&vault, max_grant_amount, recipients) {
        send_tx(call, gas_price).await?;
        info!("{description}");
    }

    Ok(())
}

/// The calls configuring the vault, in the order they are sent
fn setup_calls<'a>(
    vault: &'a IPufferVaultV3Instance<RpcClient>,
    max_grant_amount: U256,
    recipients: &[Address],
) -> Vec<(String, ScriptCallBuilder<'a, ()>)> {
    let mut calls = vec![
        (
            format!("initializeV3 called on {:#x}", vault.address()),
            vault.initializeV3().clear_decoder(),
        ),
        (
            format!("max grant amount set to {max_grant_amount} wei"),
            vault.setMaxGrantAmount(max_grant_amount).clear_decoder(),
        ),
    ];
    calls.extend(recipients.iter().map(|recipient| {
        (
            format!("added recipient {recipient:#x}"),
            vault.addRecipient(*recipient).clear_decoder(),
        )
    }));
    calls
}

/// Send a transaction and wait for it to succeed
async fn send_tx<C: CallDecoder>(
    tx: ScriptCallBuilder<'_, C>,
    gas_price: u128,
) -> Result<TransactionReceipt, ScriptError> {
    let receipt = tx
        .gas_price(gas_price)
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::ContractInteraction(format!(
            "tx {:#x} reverted",
            receipt.transaction_hash
        )));
    }

    Ok(receipt)
}

// -----------
// | Upgrade |
// -----------

/// Run a full upgrade: deploy the implementation, deploy a proxy in front of
/// it, then configure the vault through the proxy.
///
/// Steps run strictly in order and the first failure aborts the run; addresses
/// recorded by earlier steps stay in the ledgers.
pub async fn upgrade(
    plan: &UpgradePlan,
    config: &ScriptConfig,
    client: &RpcClient,
) -> Result<(), ScriptError> {
    info!(
        "upgrading {} on {} ({} environment, branch {})",
        plan.contract_name,
        config.network.name,
        config.network.environment,
        config.ledger.branch()
    );

    let implementation = deploy_implementation(&plan.contract_name, config, client).await?;
    let proxy = deploy_proxy(
        &plan.contract_name,
        implementation,
        plan.proxy_admin,
        &plan.init_types,
        &plan.init_values,
        config,
        client,
    )
    .await?;

    post_deploy_setup(proxy, plan.max_grant_amount, &plan.recipients, client).await?;

    info!("upgrade of {} complete, proxy at {proxy:#x}", plan.contract_name);
    Ok(())
}
