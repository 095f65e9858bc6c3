use alloy_primitives::Address;
use anyhow::anyhow;
use pax_lib::{
    eth::{self, AbiToken},
    sdk::IdentitySdk,
    ChainReadClient, SdkError,
};
use url::Url;

/// Result of the on-chain whitelist lookup. A zero root means unverified;
/// a nonzero root is the whitelisted identity the account is connected to
/// (possibly the account itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationStatus {
    pub is_verified: bool,
    pub root: Option<Address>,
}

/// Single read-only `getWhitelistedRoot` call against the identity contract.
pub async fn verification_status(
    read: &dyn ChainReadClient,
    identity_contract: Address,
    account: Address,
) -> Result<VerificationStatus, SdkError> {
    let data = eth::encode_call(
        eth::selector("getWhitelistedRoot(address)"),
        &[AbiToken::Address(account)],
    );
    let ret = read
        .call(identity_contract, data)
        .await
        .map_err(|e| anyhow!(e))?;
    let root = eth::decode_address(&ret)?;
    Ok(VerificationStatus {
        is_verified: root != Address::ZERO,
        root: (root != Address::ZERO).then_some(root),
    })
}

/// Kick off the external face-verification flow: a generated link the caller
/// redirects the user to. A declined link is an error, not a silent no-op.
pub async fn start_verification(
    identity: &dyn IdentitySdk,
    return_url: &str,
    chain_id: u64,
) -> Result<Url, SdkError> {
    identity
        .generate_fv_link(false, return_url, chain_id)
        .await?
        .ok_or_else(|| anyhow!("No verification link generated"))
}

/// Decode the `verified` query parameter carried back from the verification
/// flow: base64 over `"true"`/`"1"`. `None` when absent or undecodable.
pub fn decode_verified_param(encoded: Option<&str>) -> Option<bool> {
    let encoded = encoded?;
    if encoded.is_empty() {
        return None;
    }
    let decoded = base64::decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    Some(decoded == "true" || decoded == "1")
}
