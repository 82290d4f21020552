use std::collections::BTreeMap;
use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

use crate::ports::PortError;

/// Contract name looked up in every network descriptor.
pub const GATEWAY_MANAGER: &str = "GatewayManager";

/// Static per-chain artifact file: `{contracts: {<name>: {abi, address}}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    pub contracts: BTreeMap<String, ContractArtifact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractArtifact {
    pub abi: JsonAbi,
    pub address: Address,
}

impl NetworkDescriptor {
    pub fn from_json(raw: &str) -> Result<Self, PortError> {
        serde_json::from_str(raw)
            .map_err(|e| PortError::Validation(format!("invalid network descriptor: {e}")))
    }

    pub fn binding(&self, name: &str) -> Option<ContractBinding> {
        self.contracts.get(name).map(|artifact| ContractBinding {
            name: name.to_owned(),
            address: artifact.address,
            abi: Arc::new(artifact.abi.clone()),
        })
    }
}

/// A callable contract handle: deployed address plus its ABI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractBinding {
    pub name: String,
    pub address: Address,
    pub abi: Arc<JsonAbi>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    Number,
    Text,
}

impl InputKind {
    pub fn html_type(&self) -> &'static str {
        match self {
            InputKind::Number => "number",
            InputKind::Text => "text",
        }
    }
}

/// One editable argument of a contract method form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgField {
    pub kind: InputKind,
    pub title: String,
    pub value: String,
}

impl ArgField {
    pub fn new(kind: InputKind, title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            value: value.into(),
        }
    }
}

/// An ABI-encoded call against a bound contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub to: Address,
    pub method: String,
    pub args: Vec<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
}

/// Progress notifications emitted by a sent transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxEvent {
    TransactionHash(B256),
    Receipt(TxReceipt),
    Error(String),
}

/// Push notifications from the wallet provider.
///
/// Account lists are shared slices so that consumers can tell a redelivered
/// list apart from a fresh one by pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Arc<[Address]>),
    ChainChanged(u64),
}

/// Human-readable rendering of a decoded contract value.
pub fn display_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Uint(v, _) => v.to_string(),
        DynSolValue::Int(v, _) => v.to_string(),
        DynSolValue::Address(a) => a.to_checksum(None),
        DynSolValue::FixedBytes(word, size) => {
            format!("0x{}", alloy::hex::encode(&word.as_slice()[..*size]))
        }
        DynSolValue::Bytes(b) => format!("0x{}", alloy::hex::encode(b)),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            let inner = items.iter().map(display_value).collect::<Vec<_>>();
            format!("[{}]", inner.join(", "))
        }
        other => format!("{other:?}"),
    }
}
