//! Blocking JSON-RPC client for node-managed accounts.
//!
//! Transactions go through `eth_sendTransaction`, so the node (a local dev
//! chain, or a signing proxy in front of a live network) holds the keys.

use crate::chain::{Chain, TxReceipt, TxRequest};
use crate::error::{Result, RomeError};
use alloy_primitives::{Address, Bytes, B256};
use serde::Deserialize;
use serde_json::{json, Value};
use std::cell::Cell;
use std::str::FromStr;
use std::time::Duration;

pub struct RpcClient {
    url: String,
    http: reqwest::blocking::Client,
    poll_interval: Duration,
    next_id: Cell<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: B256,
    #[serde(default)]
    contract_address: Option<Address>,
    block_number: String,
    gas_used: String,
    #[serde(default)]
    status: Option<String>,
}

impl RpcClient {
    pub fn new(url: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            url: url.into(),
            http: reqwest::blocking::Client::new(),
            poll_interval,
            next_id: Cell::new(1),
        }
    }

    fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        tracing::debug!(method, id, "rpc request");

        let response = self.http.post(&self.url).json(&body).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(RomeError::Rpc(format!("{method}: http status {status}")));
        }
        let mut value: Value = response.json()?;
        if let Some(error) = value.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(RomeError::Rpc(format!("{method}: {message}")));
        }
        Ok(value
            .get_mut("result")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    fn receipt(&self, hash: B256) -> Result<Option<RpcReceipt>> {
        let value = self.request("eth_getTransactionReceipt", json!([hash]))?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }
}

impl Chain for RpcClient {
    fn chain_id(&self) -> Result<u64> {
        let value = self.request("eth_chainId", json!([]))?;
        let raw = value
            .as_str()
            .ok_or_else(|| RomeError::Rpc("eth_chainId result was not a string".into()))?;
        parse_hex_u64(raw, "eth_chainId")
    }

    fn send_transaction(&self, tx: &TxRequest) -> Result<TxReceipt> {
        let value = self.request("eth_sendTransaction", json!([tx]))?;
        let raw = value
            .as_str()
            .ok_or_else(|| RomeError::Rpc("eth_sendTransaction result was not a string".into()))?;
        let hash = B256::from_str(raw)
            .map_err(|e| RomeError::Rpc(format!("bad transaction hash '{raw}': {e}")))?;
        tracing::info!(%hash, "transaction submitted, waiting for receipt");

        // No timeout: a hung node blocks the run until the operator stops it.
        let receipt = loop {
            match self.receipt(hash)? {
                Some(r) => break r,
                None => std::thread::sleep(self.poll_interval),
            }
        };

        let block_number = parse_hex_u64(&receipt.block_number, "blockNumber")?;
        if receipt.status.as_deref().is_some_and(|s| s == "0x0") {
            return Err(RomeError::tx_failure(
                format!("transaction {hash}"),
                format!("reverted in block {block_number}"),
            ));
        }
        Ok(TxReceipt {
            transaction_hash: receipt.transaction_hash,
            contract_address: receipt.contract_address,
            block_number,
            gas_used: parse_hex_u64(&receipt.gas_used, "gasUsed")?,
        })
    }

    fn call(&self, to: Address, data: &Bytes) -> Result<Bytes> {
        let value = self.request("eth_call", json!([{ "to": to, "data": data }, "latest"]))?;
        let raw = value
            .as_str()
            .ok_or_else(|| RomeError::Rpc("eth_call result was not a string".into()))?;
        Bytes::from_str(raw).map_err(|e| RomeError::Rpc(format!("bad eth_call result: {e}")))
    }
}

fn parse_hex_u64(raw: &str, field: &str) -> Result<u64> {
    let digits = raw
        .trim()
        .strip_prefix("0x")
        .ok_or_else(|| RomeError::Rpc(format!("{field} must be 0x-prefixed hex")))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| RomeError::Rpc(format!("failed to parse {field} as hex u64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use mockito::Matcher;

    const HASH: &str = "0x0101010101010101010101010101010101010101010101010101010101010101";

    fn client(server: &mockito::Server) -> RpcClient {
        RpcClient::new(server.url(), Duration::from_millis(1))
    }

    fn reply(server: &mut mockito::Server, method: &str, result: Value) -> mockito::Mock {
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": method })))
            .with_header("content-type", "application/json")
            .with_body(json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string())
            .create()
    }

    #[test]
    fn chain_id_parses_hex() {
        let mut server = mockito::Server::new();
        let _m = reply(&mut server, "eth_chainId", json!("0x505"));
        assert_eq!(client(&server).chain_id().unwrap(), 1285);
    }

    #[test]
    fn rpc_error_is_surfaced() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("POST", "/")
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"unknown account"}}"#)
            .create();
        let err = client(&server).chain_id().unwrap_err();
        assert!(matches!(err, RomeError::Rpc(ref m) if m.contains("unknown account")));
    }

    #[test]
    fn send_transaction_returns_mined_receipt() {
        let mut server = mockito::Server::new();
        let _send = reply(&mut server, "eth_sendTransaction", json!(HASH));
        let _receipt = reply(
            &mut server,
            "eth_getTransactionReceipt",
            json!({
                "transactionHash": HASH,
                "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
                "blockNumber": "0x2",
                "gasUsed": "0x5208",
                "status": "0x1",
            }),
        );
        let tx = TxRequest::create(
            address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
            Bytes::from_static(&[0x60, 0x80]),
        );
        let receipt = client(&server).send_transaction(&tx).unwrap();
        assert_eq!(receipt.block_number, 2);
        assert_eq!(receipt.gas_used, 21_000);
        assert_eq!(
            receipt.contract_address,
            Some(address!("5fbdb2315678afecb367f032d93f642f64180aa3"))
        );
    }

    #[test]
    fn reverted_receipt_is_transaction_failure() {
        let mut server = mockito::Server::new();
        let _send = reply(&mut server, "eth_sendTransaction", json!(HASH));
        let _receipt = reply(
            &mut server,
            "eth_getTransactionReceipt",
            json!({
                "transactionHash": HASH,
                "contractAddress": null,
                "blockNumber": "0x7",
                "gasUsed": "0x100",
                "status": "0x0",
            }),
        );
        let tx = TxRequest::call(
            address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
            address!("5fbdb2315678afecb367f032d93f642f64180aa3"),
            Bytes::new(),
        );
        let err = client(&server).send_transaction(&tx).unwrap_err();
        assert!(matches!(err, RomeError::TransactionFailure { ref reason, .. } if reason.contains("block 7")));
    }

    #[test]
    fn call_decodes_result_bytes() {
        let mut server = mockito::Server::new();
        let word = format!("0x{}", "00".repeat(31) + "01");
        let _m = reply(&mut server, "eth_call", json!(word));
        let out = client(&server)
            .call(
                address!("5fbdb2315678afecb367f032d93f642f64180aa3"),
                &Bytes::from_static(&[1, 2, 3, 4]),
            )
            .unwrap();
        assert_eq!(out.len(), 32);
        assert_eq!(out[31], 1);
    }

    #[test]
    fn parse_hex_requires_prefix() {
        assert!(parse_hex_u64("10", "x").is_err());
        assert_eq!(parse_hex_u64("0x10", "x").unwrap(), 16);
    }
}
