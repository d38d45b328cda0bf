//! In-memory doubles for `Chain` and `DeploymentRegistry`.
//!
//! Both write into one shared journal so a test can assert the exact order
//! of registry lookups, deployments, transactions and reads.

use crate::abi::{self, Token};
use crate::chain::{Chain, TxReceipt, TxRequest};
use crate::error::{Result, RomeError};
use crate::registry::{args_to_json, DeployOutcome, DeployRequest, Deployment, DeploymentRegistry};
use alloy_primitives::{Address, Bytes, B256, U256};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Lookup(String),
    Deploy { name: String, args: Vec<Token> },
    Create { from: Address, address: Address },
    Send { from: Address, to: Address, data: Bytes },
    Read { to: Address, data: Bytes },
}

impl Op {
    pub fn is_state_changing(&self) -> bool {
        matches!(self, Op::Deploy { .. } | Op::Create { .. } | Op::Send { .. })
    }

    /// `Send` whose calldata starts with the selector of `signature`.
    pub fn is_send_of(&self, signature: &str) -> bool {
        matches!(self, Op::Send { data, .. } if data.starts_with(&abi::selector(signature)))
    }
}

pub type Journal = Rc<RefCell<Vec<Op>>>;

fn nth_address(prefix: u8, n: u64) -> Address {
    let mut bytes = [0u8; 20];
    bytes[0] = prefix;
    bytes[12..].copy_from_slice(&n.to_be_bytes());
    Address::from(bytes)
}

// ---------------------------------------------------------------------------
// FakeChain
// ---------------------------------------------------------------------------

pub struct FakeChain {
    chain_id: u64,
    journal: Journal,
    nonce: Cell<u64>,
    reads: RefCell<HashMap<(Address, [u8; 4]), Bytes>>,
    failing: RefCell<Vec<Bytes>>,
}

impl FakeChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            journal: Rc::new(RefCell::new(Vec::new())),
            nonce: Cell::new(0),
            reads: RefCell::new(HashMap::new()),
            failing: RefCell::new(Vec::new()),
        }
    }

    pub fn journal_handle(&self) -> Journal {
        Rc::clone(&self.journal)
    }

    pub fn journal(&self) -> Vec<Op> {
        self.journal.borrow().clone()
    }

    /// Revert every transaction whose calldata starts with `prefix`.
    pub fn fail_when_data_starts_with(&self, prefix: impl Into<Bytes>) {
        self.failing.borrow_mut().push(prefix.into());
    }

    pub fn fail_selector(&self, signature: &str) {
        self.fail_when_data_starts_with(Bytes::copy_from_slice(&abi::selector(signature)));
    }

    /// Answer `signature` reads on `to` with `value`.
    pub fn respond(&self, to: Address, signature: &str, value: Token) {
        self.reads.borrow_mut().insert(
            (to, abi::selector(signature)),
            Bytes::copy_from_slice(&value.word()),
        );
    }

    fn next_receipt(&self, contract_address: Option<Address>) -> TxReceipt {
        let n = self.nonce.get() + 1;
        self.nonce.set(n);
        TxReceipt {
            transaction_hash: B256::from(U256::from(n)),
            contract_address,
            block_number: n,
            gas_used: 21_000,
        }
    }
}

impl Chain for FakeChain {
    fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    fn send_transaction(&self, tx: &TxRequest) -> Result<TxReceipt> {
        if self
            .failing
            .borrow()
            .iter()
            .any(|prefix| tx.data.starts_with(prefix))
        {
            return Err(RomeError::tx_failure("fake transaction", "execution reverted"));
        }
        match tx.to {
            Some(to) => {
                self.journal.borrow_mut().push(Op::Send {
                    from: tx.from,
                    to,
                    data: tx.data.clone(),
                });
                Ok(self.next_receipt(None))
            }
            None => {
                let address = nth_address(0xc0, self.nonce.get() + 1);
                self.journal.borrow_mut().push(Op::Create {
                    from: tx.from,
                    address,
                });
                Ok(self.next_receipt(Some(address)))
            }
        }
    }

    fn call(&self, to: Address, data: &Bytes) -> Result<Bytes> {
        self.journal.borrow_mut().push(Op::Read {
            to,
            data: data.clone(),
        });
        let mut key = [0u8; 4];
        key.copy_from_slice(&data[..4]);
        Ok(self
            .reads
            .borrow()
            .get(&(to, key))
            .cloned()
            .unwrap_or_else(|| Bytes::from(vec![0u8; 32])))
    }
}

// ---------------------------------------------------------------------------
// MemoryRegistry
// ---------------------------------------------------------------------------

pub struct MemoryRegistry {
    deployments: BTreeMap<String, Deployment>,
    journal: Journal,
    counter: u64,
    failing: Vec<String>,
}

impl MemoryRegistry {
    pub fn new(journal: Journal) -> Self {
        Self {
            deployments: BTreeMap::new(),
            journal,
            counter: 0,
            failing: Vec::new(),
        }
    }

    pub fn with(mut self, name: &str, address: Address) -> Self {
        self.deployments
            .insert(name.to_string(), Deployment::new(name, address));
        self
    }

    pub fn fail_deploy(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }
}

impl DeploymentRegistry for MemoryRegistry {
    fn find(&self, name: &str) -> Result<Option<Deployment>> {
        self.journal.borrow_mut().push(Op::Lookup(name.to_string()));
        Ok(self.deployments.get(name).cloned())
    }

    fn list(&self) -> Result<Vec<Deployment>> {
        Ok(self.deployments.values().cloned().collect())
    }

    fn deploy(&mut self, name: &str, request: &DeployRequest) -> Result<DeployOutcome> {
        if self.failing.iter().any(|n| n == name) {
            return Err(RomeError::tx_failure(format!("deploy {name}"), "out of gas"));
        }
        let args = args_to_json(&request.args);
        if let Some(existing) = self.deployments.get(name) {
            if existing.args == args {
                return Ok(DeployOutcome {
                    deployment: existing.clone(),
                    reused: true,
                });
            }
        }
        self.journal.borrow_mut().push(Op::Deploy {
            name: name.to_string(),
            args: request.args.clone(),
        });
        self.counter += 1;
        let mut deployment = Deployment::new(name, nth_address(0xde, self.counter));
        deployment.args = args;
        deployment.deployer = Some(request.from);
        self.deployments.insert(name.to_string(), deployment.clone());
        Ok(DeployOutcome {
            deployment,
            reused: false,
        })
    }
}
