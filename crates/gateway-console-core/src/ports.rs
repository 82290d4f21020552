use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, Bytes};
use thiserror::Error;

use crate::domain::{ContractBinding, MethodCall};
use crate::feed::{PendingTx, ProviderSubscription};

/// EIP-1193 `userRejectedRequest`.
pub const USER_REJECTED_REQUEST: i64 = 4001;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("policy error: {0}")]
    Policy(String),
    #[error("provider error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl PortError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, PortError::Rpc { code, .. } if *code == USER_REJECTED_REQUEST)
    }

    /// Message shown in the submission status log.
    pub fn display_message(&self) -> String {
        match self {
            PortError::Rpc { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub trait ProviderPort {
    fn chain_id(&self) -> Result<u64, PortError>;
    fn request_accounts(&self) -> Result<Vec<Address>, PortError>;
    /// Registers for `accountsChanged`/`chainChanged`. Dropping the returned
    /// handle unregisters it.
    fn subscribe(&self) -> Result<ProviderSubscription, PortError>;
    /// Re-reads the wallet snapshot and notifies subscribers of changes.
    fn refresh(&self) -> Result<(), PortError>;
}

pub trait ContractPort {
    fn estimate_gas(&self, call: &MethodCall, from: Address) -> Result<u64, PortError>;
    fn send(&self, call: &MethodCall, from: Address, gas: u64) -> Result<PendingTx, PortError>;
    fn call(&self, call: &MethodCall) -> Result<Bytes, PortError>;
}

pub trait AbiPort {
    fn encode_call(
        &self,
        contract: &ContractBinding,
        method: &str,
        args: &[String],
    ) -> Result<MethodCall, PortError>;
    fn decode_output(
        &self,
        contract: &ContractBinding,
        method: &str,
        data: &[u8],
    ) -> Result<Vec<DynSolValue>, PortError>;
}

pub trait DescriptorPort {
    fn fetch(&self, file_name: &str) -> Result<String, PortError>;
}
