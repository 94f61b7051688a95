//! Utilities for the deploy & upgrade scripts.

use std::{fs, path::Path, process::Command, str::FromStr};

use alloy::{
    dyn_abi::{DynSolType, DynSolValue},
    network::Ethereum,
    primitives::{hex, keccak256, Address, Bytes, Selector},
    providers::{DynProvider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    sol_types::SolValue,
    transports::http::reqwest::Url,
};
use serde_json::Value;
use tracing::info;

use crate::{
    constants::{GIT_BRANCH_ARGS, GIT_COMMAND, INITIALIZER_NAME, NUM_BYTES_SELECTOR},
    errors::ScriptError,
    types::{Artifact, CompiledContract},
};

/// The signing RPC client used by the scripts
pub type RpcClient = DynProvider<Ethereum>;

/// Sets up a signing client for the given RPC endpoint from a hex-encoded private key
pub fn setup_client(priv_key: &str, rpc_url: &str) -> Result<RpcClient, ScriptError> {
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    info!("sending transactions from {:#x}", signer.address());

    let provider = ProviderBuilder::new().wallet(signer).connect_http(url);
    Ok(DynProvider::new(provider))
}

/// Read and parse a JSON file
pub fn read_json_file(path: &Path) -> Result<Value, ScriptError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", path.display())))?;

    serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", path.display())))
}

/// The name of the git branch currently checked out
pub fn current_git_branch() -> Result<String, ScriptError> {
    let output = Command::new(GIT_COMMAND)
        .args(GIT_BRANCH_ARGS)
        .output()
        .map_err(|e| ScriptError::GitBranch(e.to_string()))?;

    if !output.status.success() {
        return Err(ScriptError::GitBranch(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let branch = String::from_utf8(output.stdout)
        .map_err(|e| ScriptError::GitBranch(e.to_string()))?
        .trim()
        .to_string();

    if branch.is_empty() {
        return Err(ScriptError::GitBranch("empty branch name".to_string()));
    }

    Ok(branch)
}

/// Load the compiled artifact of a contract, laid out by Foundry as
/// `<artifacts_dir>/<Name>.sol/<Name>.json`
pub fn load_artifact(
    artifacts_dir: &Path,
    contract_name: &str,
) -> Result<CompiledContract, ScriptError> {
    let path = artifacts_dir
        .join(format!("{contract_name}.sol"))
        .join(format!("{contract_name}.json"));

    if !path.is_file() {
        return Err(ScriptError::ArtifactNotFound(path.display().to_string()));
    }

    let contents = fs::read_to_string(&path)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))?;
    let artifact: Artifact = serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))?;

    let bytecode = hex::decode(artifact.bytecode.object.trim())
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))?;
    if bytecode.is_empty() {
        return Err(ScriptError::ArtifactParsing(format!(
            "{} has no creation bytecode",
            path.display()
        )));
    }

    Ok(CompiledContract {
        name: contract_name.to_string(),
        abi: artifact.abi,
        bytecode: bytecode.into(),
    })
}

/// Parse a list of Solidity type strings
pub fn parse_sol_types(types: &[String]) -> Result<Vec<DynSolType>, ScriptError> {
    types
        .iter()
        .map(|ty| {
            DynSolType::parse(ty)
                .map_err(|e| ScriptError::CalldataConstruction(format!("invalid type {ty}: {e}")))
        })
        .collect()
}

/// The canonical signature of the initializer taking the given parameter types,
/// e.g. `initialize(address,uint256)`
pub fn initializer_signature(types: &[DynSolType]) -> String {
    let params = types
        .iter()
        .map(|ty| ty.sol_type_name())
        .collect::<Vec<_>>()
        .join(",");
    format!("{INITIALIZER_NAME}({params})")
}

/// The selector of a function: the first 4 bytes of the keccak256 hash of its signature
pub fn function_selector(signature: &str) -> Selector {
    Selector::from_slice(&keccak256(signature.as_bytes())[..NUM_BYTES_SELECTOR])
}

/// Prepare calldata for an `initialize(...)` call with the given parameter
/// types and string-encoded values: the selector followed by the ABI-encoded
/// values
pub fn initializer_calldata(types: &[String], values: &[String]) -> Result<Bytes, ScriptError> {
    if types.len() != values.len() {
        return Err(ScriptError::EncodingMismatch {
            types: types.len(),
            values: values.len(),
        });
    }

    let sol_types = parse_sol_types(types)?;
    let sol_values = sol_types
        .iter()
        .zip(values)
        .map(|(ty, value)| {
            ty.coerce_str(value).map_err(|e| {
                ScriptError::CalldataConstruction(format!(
                    "cannot encode {value} as {}: {e}",
                    ty.sol_type_name()
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let signature = initializer_signature(&sol_types);
    let mut calldata = function_selector(&signature).to_vec();
    calldata.extend(DynSolValue::Tuple(sol_values).abi_encode_params());
    let calldata = Bytes::from(calldata);

    info!("initializer signature: {signature}");
    info!("initializer calldata: {calldata}");
    Ok(calldata)
}

/// ABI-encode the proxy constructor arguments
/// `(address _logic, address initialOwner, bytes _data)`
pub fn proxy_constructor_args(
    implementation: Address,
    admin: Address,
    init_data: Bytes,
) -> Vec<u8> {
    (implementation, admin, init_data).abi_encode_params()
}

/// A client answering RPC requests from the given mock responses, in order
#[cfg(test)]
pub(crate) fn mock_client(asserter: alloy::providers::mock::Asserter) -> RpcClient {
    DynProvider::new(ProviderBuilder::new().connect_mocked_client(asserter))
}
