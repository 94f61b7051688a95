//! The address ledger: JSON files recording deployed contract addresses,
//! namespaced by the current branch.
//!
//! Each ledger file maps a network name to a mapping from contract name to
//! address. Writing an address for an existing `(network, contract)` pair
//! replaces the previous one. Writes leave a `.lock` file beside each ledger.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::primitives::Address;
use fs2::FileExt;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info, warn};

use crate::{
    constants::{
        IMPLEMENTATIONS_FILE_SUFFIX, LEDGER_INDENT, LOCK_FILE_EXTENSION, PROXIES_FILE_SUFFIX,
        TMP_FILE_EXTENSION,
    },
    errors::ScriptError,
    types::{LedgerKind, LedgerMap},
    utils::current_git_branch,
};

/// The pair of ledger files for one branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressLedger {
    /// The directory holding the ledger files
    dir: PathBuf,
    /// The branch the ledger files are namespaced by
    branch: String,
}

impl AddressLedger {
    /// Create a ledger for the given branch, stored under `dir`.
    ///
    /// The branch name is used verbatim, so `feature/x` keeps its ledgers in a
    /// `feature/` subdirectory and never shares files with `feature-x`.
    pub fn new(dir: impl Into<PathBuf>, branch: &str) -> Self {
        Self {
            dir: dir.into(),
            branch: branch.to_string(),
        }
    }

    /// Create a ledger for the branch currently checked out
    pub fn for_current_branch(dir: impl Into<PathBuf>) -> Result<Self, ScriptError> {
        let branch = current_git_branch()?;
        Ok(Self::new(dir, &branch))
    }

    /// The branch this ledger is namespaced by
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// The path of the ledger file for the given kind
    pub fn path(&self, kind: LedgerKind) -> PathBuf {
        let suffix = match kind {
            LedgerKind::Implementation => IMPLEMENTATIONS_FILE_SUFFIX,
            LedgerKind::Proxy => PROXIES_FILE_SUFFIX,
        };
        self.dir.join(format!("{}-{}", self.branch, suffix))
    }

    /// Read the current mapping for the given kind.
    ///
    /// A missing, unreadable or malformed file reads as an empty mapping.
    pub fn read(&self, kind: LedgerKind) -> LedgerMap {
        let path = self.path(kind);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("no {kind} ledger at {}: {e}", path.display());
                return LedgerMap::new();
            }
        };

        if contents.trim().is_empty() {
            return LedgerMap::new();
        }

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(
                "ignoring malformed {kind} ledger at {}: {e}",
                path.display()
            );
            LedgerMap::new()
        })
    }

    /// Look up a single recorded address
    pub fn lookup(
        &self,
        kind: LedgerKind,
        network: &str,
        contract_name: &str,
    ) -> Option<Address> {
        self.read(kind)
            .get(network)?
            .get(contract_name)
            .and_then(|addr| Address::from_str(addr).ok())
    }

    /// Record an address, replacing any previous address for the same
    /// network and contract.
    ///
    /// The read-modify-write is done under an exclusive lock on a sibling
    /// lock file, and the new contents are renamed into place.
    pub fn write(
        &self,
        kind: LedgerKind,
        network: &str,
        contract_name: &str,
        address: Address,
    ) -> Result<(), ScriptError> {
        let path = self.path(kind);
        let parent = path.parent().unwrap_or(self.dir.as_path());
        fs::create_dir_all(parent).map_err(|e| ScriptError::WriteFile(e.to_string()))?;

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path.with_extension(LOCK_FILE_EXTENSION))
            .map_err(|e| ScriptError::WriteFile(e.to_string()))?;
        lock_file
            .lock_exclusive()
            .map_err(|e| ScriptError::WriteFile(e.to_string()))?;

        let mut ledger = self.read(kind);
        ledger
            .entry(network.to_string())
            .or_default()
            .insert(contract_name.to_string(), address.to_checksum(None));

        let res = write_atomically(&path, &ledger);
        FileExt::unlock(&lock_file).map_err(|e| ScriptError::WriteFile(e.to_string()))?;
        res?;

        info!(
            "recorded {kind} address of {contract_name} on {network}: {address:#x} ({})",
            path.display()
        );
        Ok(())
    }
}

/// Serialize the ledger to a staging file next to `path`, then rename it over `path`
fn write_atomically(path: &Path, ledger: &LedgerMap) -> Result<(), ScriptError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(LEDGER_INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    ledger
        .serialize(&mut ser)
        .map_err(|e| ScriptError::WriteFile(e.to_string()))?;

    let tmp_path = path.with_extension(TMP_FILE_EXTENSION);
    fs::write(&tmp_path, &buf).map_err(|e| ScriptError::WriteFile(e.to_string()))?;
    fs::rename(&tmp_path, path).map_err(|e| ScriptError::WriteFile(e.to_string()))
}

#[cfg(test)]
mod tests {
    use eyre::Result;
    use tempfile::tempdir;

    use super::*;

    const NETWORK: &str = "holesky";
    const CONTRACT: &str = "PufferVaultV3";

    #[test]
    fn test_absent_ledger_reads_empty() -> Result<()> {
        let dir = tempdir()?;
        let ledger = AddressLedger::new(dir.path(), "main");

        assert!(ledger.read(LedgerKind::Implementation).is_empty());
        assert!(ledger.read(LedgerKind::Proxy).is_empty());
        assert_eq!(ledger.lookup(LedgerKind::Proxy, NETWORK, CONTRACT), None);
        Ok(())
    }

    #[test]
    fn test_empty_and_malformed_ledger_read_empty() -> Result<()> {
        let dir = tempdir()?;
        let ledger = AddressLedger::new(dir.path(), "main");

        fs::write(ledger.path(LedgerKind::Implementation), "")?;
        assert!(ledger.read(LedgerKind::Implementation).is_empty());

        fs::write(ledger.path(LedgerKind::Proxy), "{ not json")?;
        assert!(ledger.read(LedgerKind::Proxy).is_empty());
        Ok(())
    }

    #[test]
    fn test_write_then_read() -> Result<()> {
        let dir = tempdir()?;
        let ledger = AddressLedger::new(dir.path(), "main");
        let address = Address::with_last_byte(7);

        ledger.write(LedgerKind::Implementation, NETWORK, CONTRACT, address)?;

        let map = ledger.read(LedgerKind::Implementation);
        assert_eq!(map[NETWORK][CONTRACT], address.to_checksum(None));
        assert_eq!(
            ledger.lookup(LedgerKind::Implementation, NETWORK, CONTRACT),
            Some(address)
        );
        // The other kind is untouched
        assert!(ledger.read(LedgerKind::Proxy).is_empty());
        Ok(())
    }

    #[test]
    fn test_overwrite_replaces_address() -> Result<()> {
        let dir = tempdir()?;
        let ledger = AddressLedger::new(dir.path(), "main");

        ledger.write(LedgerKind::Proxy, NETWORK, CONTRACT, Address::with_last_byte(1))?;
        ledger.write(LedgerKind::Proxy, NETWORK, "Other", Address::with_last_byte(2))?;
        ledger.write(LedgerKind::Proxy, NETWORK, CONTRACT, Address::with_last_byte(3))?;

        let map = ledger.read(LedgerKind::Proxy);
        assert_eq!(map[NETWORK].len(), 2);
        assert_eq!(
            ledger.lookup(LedgerKind::Proxy, NETWORK, CONTRACT),
            Some(Address::with_last_byte(3))
        );
        assert_eq!(
            ledger.lookup(LedgerKind::Proxy, NETWORK, "Other"),
            Some(Address::with_last_byte(2))
        );
        Ok(())
    }

    #[test]
    fn test_write_over_malformed_file_starts_fresh() -> Result<()> {
        let dir = tempdir()?;
        let ledger = AddressLedger::new(dir.path(), "main");
        fs::write(ledger.path(LedgerKind::Proxy), "garbage")?;

        ledger.write(LedgerKind::Proxy, NETWORK, CONTRACT, Address::with_last_byte(9))?;

        let map = ledger.read(LedgerKind::Proxy);
        assert_eq!(map.len(), 1);
        assert_eq!(
            ledger.lookup(LedgerKind::Proxy, NETWORK, CONTRACT),
            Some(Address::with_last_byte(9))
        );
        Ok(())
    }

    #[test]
    fn test_branches_are_separate() -> Result<()> {
        let dir = tempdir()?;
        let main = AddressLedger::new(dir.path(), "main");
        let feature = AddressLedger::new(dir.path(), "feature/upgrade");

        main.write(LedgerKind::Implementation, NETWORK, CONTRACT, Address::with_last_byte(1))?;
        feature.write(LedgerKind::Implementation, NETWORK, CONTRACT, Address::with_last_byte(2))?;

        assert_eq!(feature.branch(), "feature/upgrade");
        assert_ne!(
            main.path(LedgerKind::Implementation),
            feature.path(LedgerKind::Implementation)
        );
        assert_eq!(
            main.lookup(LedgerKind::Implementation, NETWORK, CONTRACT),
            Some(Address::with_last_byte(1))
        );
        assert_eq!(
            feature.lookup(LedgerKind::Implementation, NETWORK, CONTRACT),
            Some(Address::with_last_byte(2))
        );
        Ok(())
    }

    #[test]
    fn test_similar_branch_names_do_not_collide() -> Result<()> {
        let dir = tempdir()?;
        let nested = AddressLedger::new(dir.path(), "feature/upgrade");
        let flat = AddressLedger::new(dir.path(), "feature-upgrade");

        nested.write(LedgerKind::Proxy, NETWORK, CONTRACT, Address::with_last_byte(1))?;
        flat.write(LedgerKind::Proxy, NETWORK, CONTRACT, Address::with_last_byte(2))?;

        assert_ne!(nested.path(LedgerKind::Proxy), flat.path(LedgerKind::Proxy));
        assert_eq!(
            nested.path(LedgerKind::Proxy),
            dir.path().join("feature").join("upgrade-contract-proxies.json")
        );
        assert_eq!(
            nested.lookup(LedgerKind::Proxy, NETWORK, CONTRACT),
            Some(Address::with_last_byte(1))
        );
        assert_eq!(
            flat.lookup(LedgerKind::Proxy, NETWORK, CONTRACT),
            Some(Address::with_last_byte(2))
        );
        Ok(())
    }

    #[test]
    fn test_file_layout() -> Result<()> {
        let dir = tempdir()?;
        let ledger = AddressLedger::new(dir.path(), "develop");

        assert_eq!(
            ledger.path(LedgerKind::Implementation),
            dir.path().join("develop-contract-addresses.json")
        );
        assert_eq!(
            ledger.path(LedgerKind::Proxy),
            dir.path().join("develop-contract-proxies.json")
        );

        ledger.write(LedgerKind::Proxy, NETWORK, CONTRACT, Address::with_last_byte(1))?;
        let contents = fs::read_to_string(ledger.path(LedgerKind::Proxy))?;
        let expected = format!(
            "{{\n    \"{NETWORK}\": {{\n        \"{CONTRACT}\": \"{}\"\n    }}\n}}",
            Address::with_last_byte(1).to_checksum(None)
        );
        assert_eq!(contents, expected);

        let proxies = ledger.path(LedgerKind::Proxy);
        assert!(proxies.with_extension(LOCK_FILE_EXTENSION).exists());
        assert!(!proxies.with_extension(TMP_FILE_EXTENSION).exists());
        Ok(())
    }
}
