use alloy_primitives::{Address, U256};
use anyhow::anyhow;
use pax_lib::{
    eth::{self, AbiToken},
    ChainReadClient, SdkError,
};
use serde::{Deserialize, Serialize};

/// A token the home screen shows a balance for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub address: Address,
    pub icon: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// ERC-20 balance of `account`, in base units.
pub async fn token_balance(
    read: &dyn ChainReadClient,
    token: Address,
    account: Address,
) -> Result<U256, SdkError> {
    let data = eth::encode_call(
        eth::selector("balanceOf(address)"),
        &[AbiToken::Address(account)],
    );
    let ret = read.call(token, data).await.map_err(|e| anyhow!(e))?;
    Ok(eth::decode_uint(&ret)?)
}

/// Two-decimal display, the way balances render on the home screen.
pub fn format_balance(amount: U256, decimals: u32) -> String {
    eth::format_units(amount, decimals, 2)
}
