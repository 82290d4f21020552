//! Generic contract method form.
//!
//! Holds the editable argument list of one contract method and turns a
//! submission into `estimate_gas` + `send`, folding the resulting transaction
//! events into a [`SubmissionStatus`].

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::{debug, info, warn};

use crate::domain::{ArgField, ContractBinding, TxEvent};
use crate::feed::PendingTx;
use crate::ports::{AbiPort, ContractPort, PortError};
use crate::status::{StatusEvent, SubmissionStatus};

/// Gas limit sent with a transaction: `floor(estimate * 1.5)`.
pub fn gas_limit_with_margin(estimate: u64) -> u64 {
    let limit = u128::from(estimate) * 3 / 2;
    u64::try_from(limit).unwrap_or(u64::MAX)
}

#[derive(Debug)]
pub struct MethodForm {
    contract: ContractBinding,
    method: String,
    description: String,
    fields: Vec<Arc<ArgField>>,
    status: SubmissionStatus,
    in_flight: Vec<PendingTx>,
}

impl MethodForm {
    pub fn new(
        contract: ContractBinding,
        method: impl Into<String>,
        description: impl Into<String>,
        fields: Vec<ArgField>,
    ) -> Self {
        Self {
            contract,
            method: method.into(),
            description: description.into(),
            fields: fields.into_iter().map(Arc::new).collect(),
            status: SubmissionStatus::Idle,
            in_flight: Vec::new(),
        }
    }

    pub fn contract(&self) -> &ContractBinding {
        &self.contract
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn fields(&self) -> &[Arc<ArgField>] {
        &self.fields
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Replaces the value at `index`. Other entries keep their allocation.
    /// Returns false when `index` is out of range.
    pub fn update_field(&mut self, index: usize, value: impl Into<String>) -> bool {
        let Some(current) = self.fields.get(index) else {
            return false;
        };
        let mut next = self.fields.clone();
        next[index] = Arc::new(ArgField {
            value: value.into(),
            ..ArgField::clone(current)
        });
        self.fields = next;
        true
    }

    /// Field values in declaration order.
    pub fn submission_args(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.value.clone()).collect()
    }

    pub fn submit<C, A>(&mut self, contract_port: &C, abi: &A, from: Option<Address>)
    where
        C: ContractPort + ?Sized,
        A: AbiPort + ?Sized,
    {
        if let Err(e) = self.try_submit(contract_port, abi, from) {
            warn!(method = %self.method, error = %e, "submission failed");
            self.apply(StatusEvent::Error(e.display_message()));
        }
    }

    fn try_submit<C, A>(
        &mut self,
        contract_port: &C,
        abi: &A,
        from: Option<Address>,
    ) -> Result<(), PortError>
    where
        C: ContractPort + ?Sized,
        A: AbiPort + ?Sized,
    {
        let from = from.ok_or_else(|| PortError::Policy("no connected account".to_owned()))?;
        let args = self.submission_args();
        let call = abi.encode_call(&self.contract, &self.method, &args)?;
        let estimate = contract_port.estimate_gas(&call, from)?;
        let gas = gas_limit_with_margin(estimate);

        self.apply(StatusEvent::Submitted);
        info!(method = %self.method, %from, estimate, gas, "sending transaction");
        let pending = contract_port.send(&call, from, gas)?;
        self.in_flight.push(pending);
        Ok(())
    }

    /// Applies queued events from every in-flight transaction, handle by
    /// handle in submission order. Events keep their arrival order within a
    /// handle but not across handles. Returns true when the status changed.
    pub fn poll(&mut self) -> bool {
        let before = self.status.clone();
        let mut events = Vec::new();
        self.in_flight.retain(|pending| match pending.drain_events() {
            Ok(drained) => {
                let finished = drained
                    .iter()
                    .any(|e| matches!(e, TxEvent::Receipt(_) | TxEvent::Error(_)));
                events.extend(drained);
                !finished
            }
            Err(e) => {
                warn!(error = %e, "dropping unreadable transaction handle");
                false
            }
        });
        for event in events {
            debug!(?event, "transaction event");
            self.apply(event.into());
        }
        self.status != before
    }

    fn apply(&mut self, event: StatusEvent) {
        self.status = std::mem::take(&mut self.status).apply(event);
    }
}
