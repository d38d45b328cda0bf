//! Typed handles for the deployed contracts the workflows call.

use crate::abi::{self, Token};
use crate::chain::{Chain, TxReceipt, TxRequest};
use crate::error::{Result, RomeError};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Send a transaction, labelling any failure with the call being made.
fn submit(chain: &dyn Chain, call: String, tx: TxRequest) -> Result<TxReceipt> {
    tracing::info!(%call, from = %tx.from, "sending");
    chain
        .send_transaction(&tx)
        .map_err(|e| match e {
            RomeError::TransactionFailure { reason, .. } => RomeError::tx_failure(call, reason),
            other => RomeError::tx_failure(call, other.to_string()),
        })
}

// ---------------------------------------------------------------------------
// ClaimHelper
// ---------------------------------------------------------------------------

pub struct ClaimHelper<'c> {
    pub address: Address,
    chain: &'c dyn Chain,
}

impl<'c> ClaimHelper<'c> {
    pub const SET_PRESALE: &'static str = "setPresale(address)";
    pub const TRANSFER_OWNERSHIP: &'static str = "transferOwnership(address)";
    pub const OWNER: &'static str = "owner()";

    pub fn at(address: Address, chain: &'c dyn Chain) -> Self {
        Self { address, chain }
    }

    pub fn set_presale(&self, from: Address, presale: Address) -> Result<TxReceipt> {
        let data = abi::encode_call(Self::SET_PRESALE, &[presale.into()]);
        submit(
            self.chain,
            format!("ClaimHelper.setPresale({presale})"),
            TxRequest::call(from, self.address, data),
        )
    }

    pub fn transfer_ownership(&self, from: Address, new_owner: Address) -> Result<TxReceipt> {
        let data = abi::encode_call(Self::TRANSFER_OWNERSHIP, &[new_owner.into()]);
        submit(
            self.chain,
            format!("ClaimHelper.transferOwnership({new_owner})"),
            TxRequest::call(from, self.address, data),
        )
    }

    pub fn owner(&self) -> Result<Address> {
        let out = self
            .chain
            .call(self.address, &abi::encode_call(Self::OWNER, &[]))?;
        abi::decode_address(&out)
    }
}

// ---------------------------------------------------------------------------
// PermissionCategory
// ---------------------------------------------------------------------------

/// The treasury's managing categories, in the contract's enum order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    ReserveDepositor,
    ReserveSpender,
    ReserveToken,
    ReserveManager,
    LiquidityDepositor,
    LiquidityToken,
    LiquidityManager,
    Debtor,
    RewardManager,
    StakedToken,
}

impl PermissionCategory {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionCategory::ReserveDepositor => "reserve_depositor",
            PermissionCategory::ReserveSpender => "reserve_spender",
            PermissionCategory::ReserveToken => "reserve_token",
            PermissionCategory::ReserveManager => "reserve_manager",
            PermissionCategory::LiquidityDepositor => "liquidity_depositor",
            PermissionCategory::LiquidityToken => "liquidity_token",
            PermissionCategory::LiquidityManager => "liquidity_manager",
            PermissionCategory::Debtor => "debtor",
            PermissionCategory::RewardManager => "reward_manager",
            PermissionCategory::StakedToken => "staked_token",
        }
    }

    /// Public mapping that holds this category's flag. The staked token is a
    /// single address slot, not a per-address flag.
    pub fn flag_getter(&self) -> Option<&'static str> {
        match self {
            PermissionCategory::ReserveDepositor => Some("isReserveDepositor(address)"),
            PermissionCategory::ReserveSpender => Some("isReserveSpender(address)"),
            PermissionCategory::ReserveToken => Some("isReserveToken(address)"),
            PermissionCategory::ReserveManager => Some("isReserveManager(address)"),
            PermissionCategory::LiquidityDepositor => Some("isLiquidityDepositor(address)"),
            PermissionCategory::LiquidityToken => Some("isLiquidityToken(address)"),
            PermissionCategory::LiquidityManager => Some("isLiquidityManager(address)"),
            PermissionCategory::Debtor => Some("isDebtor(address)"),
            PermissionCategory::RewardManager => Some("isRewardManager(address)"),
            PermissionCategory::StakedToken => None,
        }
    }
}

impl fmt::Display for PermissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Treasury
// ---------------------------------------------------------------------------

pub struct Treasury<'c> {
    pub address: Address,
    chain: &'c dyn Chain,
}

impl<'c> Treasury<'c> {
    pub const TOGGLE: &'static str = "toggle(uint8,address,address)";
    pub const QUEUE: &'static str = "queue(uint8,address)";

    pub fn at(address: Address, chain: &'c dyn Chain) -> Self {
        Self { address, chain }
    }

    pub fn toggle(
        &self,
        from: Address,
        category: PermissionCategory,
        target: Address,
        aux: Address,
    ) -> Result<TxReceipt> {
        let data = abi::encode_call(
            Self::TOGGLE,
            &[category.code().into(), target.into(), aux.into()],
        );
        submit(
            self.chain,
            format!("RomeTreasury.toggle({}, {target}, {aux})", category.code()),
            TxRequest::call(from, self.address, data),
        )
    }

    pub fn queue(
        &self,
        from: Address,
        category: PermissionCategory,
        target: Address,
    ) -> Result<TxReceipt> {
        let data = abi::encode_call(Self::QUEUE, &[category.code().into(), target.into()]);
        submit(
            self.chain,
            format!("RomeTreasury.queue({}, {target})", category.code()),
            TxRequest::call(from, self.address, data),
        )
    }

    /// Current flag for `target`, or `None` when the category has no
    /// per-address flag to read.
    pub fn is_granted(&self, category: PermissionCategory, target: Address) -> Result<Option<bool>> {
        let Some(getter) = category.flag_getter() else {
            return Ok(None);
        };
        let out = self
            .chain
            .call(self.address, &abi::encode_call(getter, &[Token::Address(target)]))?;
        abi::decode_bool(&out).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeChain, Op};
    use alloy_primitives::address;

    const TREASURY: Address = address!("a513e6e4b8f2a923d98304ec87f64353c4d5c853");
    const OPERATOR: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
    const BOND: Address = address!("2279b7a0a67db372996a5fab50d91eaa73d2ebe6");

    #[test]
    fn category_codes_follow_enum_order() {
        assert_eq!(PermissionCategory::ReserveDepositor.code(), 0);
        assert_eq!(PermissionCategory::LiquidityDepositor.code(), 4);
        assert_eq!(PermissionCategory::RewardManager.code(), 8);
        assert_eq!(PermissionCategory::StakedToken.code(), 9);
    }

    #[test]
    fn toggle_encodes_category_target_and_aux() {
        let chain = FakeChain::new(1337);
        let treasury = Treasury::at(TREASURY, &chain);
        treasury
            .toggle(OPERATOR, PermissionCategory::RewardManager, BOND, Address::ZERO)
            .unwrap();

        let expected = abi::encode_call(
            Treasury::TOGGLE,
            &[8u8.into(), BOND.into(), Address::ZERO.into()],
        );
        assert_eq!(
            chain.journal(),
            vec![Op::Send {
                from: OPERATOR,
                to: TREASURY,
                data: expected,
            }]
        );
    }

    #[test]
    fn failure_is_labelled_with_the_call() {
        let chain = FakeChain::new(1337);
        chain.fail_selector(Treasury::TOGGLE);
        let err = Treasury::at(TREASURY, &chain)
            .toggle(OPERATOR, PermissionCategory::ReserveDepositor, BOND, Address::ZERO)
            .unwrap_err();
        match err {
            RomeError::TransactionFailure { call, reason } => {
                assert!(call.starts_with("RomeTreasury.toggle(0, "));
                assert_eq!(reason, "execution reverted");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn is_granted_reads_the_category_mapping() {
        let chain = FakeChain::new(1337);
        chain.respond(TREASURY, "isRewardManager(address)", Token::Bool(true));
        let treasury = Treasury::at(TREASURY, &chain);
        assert_eq!(
            treasury
                .is_granted(PermissionCategory::RewardManager, BOND)
                .unwrap(),
            Some(true)
        );
        assert_eq!(
            treasury
                .is_granted(PermissionCategory::ReserveDepositor, BOND)
                .unwrap(),
            Some(false)
        );
        assert_eq!(
            treasury
                .is_granted(PermissionCategory::StakedToken, BOND)
                .unwrap(),
            None
        );
    }

    #[test]
    fn claim_helper_owner_decodes_address() {
        let chain = FakeChain::new(1337);
        let helper_addr = address!("0165878a594ca255338adfa4d48449f69242eb8f");
        chain.respond(helper_addr, ClaimHelper::OWNER, Token::Address(OPERATOR));
        let helper = ClaimHelper::at(helper_addr, &chain);
        assert_eq!(helper.owner().unwrap(), OPERATOR);
    }
}
