//! Gas price estimation

use alloy::{
    primitives::{utils::format_units, U256},
    providers::Provider,
};
use tracing::info;

use crate::{constants::GAS_PRICE_MARKUP_PERCENT, errors::ScriptError, utils::RpcClient};

/// Apply the fixed markup to a base gas price, truncating toward zero
pub fn apply_markup(gas_price: u128) -> Result<u128, ScriptError> {
    let markup = gas_price / 100 * GAS_PRICE_MARKUP_PERCENT
        + gas_price % 100 * GAS_PRICE_MARKUP_PERCENT / 100;

    gas_price
        .checked_add(markup)
        .ok_or(ScriptError::GasPriceOverflow(gas_price))
}

/// Query the network gas price and apply the markup to it
pub async fn estimate_gas_price(client: &RpcClient) -> Result<u128, ScriptError> {
    let base_price = client
        .get_gas_price()
        .await
        .map_err(|e| ScriptError::RpcFailure(e.to_string()))?;
    let gas_price = apply_markup(base_price)?;

    let gwei =
        format_units(U256::from(gas_price), "gwei").unwrap_or_else(|_| gas_price.to_string());
    info!("using gas price of {gwei} gwei (network price {base_price} wei)");

    Ok(gas_price)
}

#[cfg(test)]
mod tests {
    use alloy::providers::mock::Asserter;

    use super::*;
    use crate::utils::mock_client;

    #[test]
    fn test_markup_is_half_again() {
        for price in [0u128, 1, 2, 3, 7, 99, 100, 101, 1_000_000_007, 25_000_000_000] {
            assert_eq!(apply_markup(price).unwrap(), price * 3 / 2, "price {price}");
        }
    }

    #[test]
    fn test_markup_truncates() {
        assert_eq!(apply_markup(1).unwrap(), 1);
        assert_eq!(apply_markup(3).unwrap(), 4);
        assert_eq!(apply_markup(199).unwrap(), 298);
    }

    #[test]
    fn test_markup_near_max() {
        // Large enough that `price * 3` would overflow, small enough that the result fits
        let price = u128::MAX / 2;
        assert_eq!(apply_markup(price).unwrap(), price + price / 2);
    }

    #[test]
    fn test_markup_overflow() {
        assert!(matches!(
            apply_markup(u128::MAX),
            Err(ScriptError::GasPriceOverflow(u128::MAX))
        ));
    }

    #[tokio::test]
    async fn test_estimate_marks_up_network_price() {
        let asserter = Asserter::new();
        asserter.push_success(&U256::from(3));
        let client = mock_client(asserter);

        assert_eq!(estimate_gas_price(&client).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_estimate_rpc_error() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("boom");
        let client = mock_client(asserter);

        match estimate_gas_price(&client).await {
            Err(ScriptError::RpcFailure(msg)) => assert!(msg.contains("boom"), "{msg}"),
            res => panic!("expected an RPC failure, got {res:?}"),
        }
    }
}
