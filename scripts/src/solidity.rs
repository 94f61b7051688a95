//! Definitions of Solidity functions called after deployment

use alloy::sol;

sol! {
    /// The setup surface of the vault, called through its proxy after an upgrade
    #[sol(rpc)]
    interface IPufferVaultV3 {
        function initializeV3() external;
        function setMaxGrantAmount(uint256 newMaxGrantAmount) external;
        function addRecipient(address recipient) external;
    }
}

pub use IPufferVaultV3::IPufferVaultV3Instance;
