use std::{fs, process::Command};

use eyre::Result;
use tempfile::tempdir;

const BIN: &str = env!("CARGO_BIN_EXE_upgrade-scripts");

#[test]
fn test_missing_network_exits_with_status_one() -> Result<()> {
    let output = Command::new(BIN).env_remove("PKEY").output()?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("network name"), "stderr: {stderr}");
    Ok(())
}

#[test]
fn test_unknown_network_exits_with_status_one() -> Result<()> {
    let dir = tempdir()?;
    let networks = dir.path().join("networks.json");
    let deployment_config = dir.path().join("deploymentConfig.json");
    fs::write(&networks, r#"{ "holesky": { "url": "http://127.0.0.1:1" } }"#)?;
    fs::write(&deployment_config, "{}")?;

    let output = Command::new(BIN)
        .arg("sepolia")
        .arg("--networks")
        .arg(&networks)
        .arg("--deployment-config")
        .arg(&deployment_config)
        .arg("--deployments-dir")
        .arg(dir.path())
        .arg("--branch")
        .arg("main")
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    // Nothing was deployed, so nothing was recorded
    assert!(!dir.path().join("main-contract-addresses.json").exists());
    assert!(!dir.path().join("main-contract-proxies.json").exists());
    Ok(())
}

#[test]
fn test_missing_artifact_records_nothing() -> Result<()> {
    let dir = tempdir()?;
    let networks = dir.path().join("networks.json");
    let deployment_config = dir.path().join("deploymentConfig.json");
    fs::write(&networks, r#"{ "holesky": { "url": "http://127.0.0.1:1" } }"#)?;
    fs::write(
        &deployment_config,
        r#"{ "develop": { "proxy_admin": "0x00000000000000000000000000000000000000aa" } }"#,
    )?;

    let output = Command::new(BIN)
        .arg("holesky")
        .arg("--networks")
        .arg(&networks)
        .arg("--deployment-config")
        .arg(&deployment_config)
        .arg("--deployments-dir")
        .arg(dir.path())
        .arg("--artifacts-dir")
        .arg(dir.path().join("out"))
        .arg("--branch")
        .arg("main")
        .arg("--pkey")
        .arg("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("artifact not found"), "stderr: {stderr}");
    assert!(!dir.path().join("main-contract-addresses.json").exists());
    Ok(())
}
