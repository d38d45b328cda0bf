use crate::error::Result;
use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// A state-changing transaction. `to == None` creates a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRequest {
    pub from: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    pub data: Bytes,
}

impl TxRequest {
    pub fn call(from: Address, to: Address, data: Bytes) -> Self {
        Self {
            from,
            to: Some(to),
            data,
        }
    }

    pub fn create(from: Address, data: Bytes) -> Self {
        Self {
            from,
            to: None,
            data,
        }
    }
}

/// A mined, successful transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub transaction_hash: B256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<Address>,
    pub block_number: u64,
    pub gas_used: u64,
}

/// The network a workflow talks to.
///
/// `send_transaction` returns only once the transaction is mined; a reverted
/// transaction is reported as `RomeError::TransactionFailure`, never as a
/// receipt.
pub trait Chain {
    fn chain_id(&self) -> Result<u64>;

    fn send_transaction(&self, tx: &TxRequest) -> Result<TxReceipt>;

    /// Read-only call against the latest block.
    fn call(&self, to: Address, data: &Bytes) -> Result<Bytes>;
}
