//! Wallet session: provider link, chain identity, accounts and the cached
//! `GatewayManager` state.

use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::Address;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::{ContractBinding, NetworkDescriptor, ProviderEvent, GATEWAY_MANAGER};
use crate::feed::ProviderSubscription;
use crate::networks::NetworkFile;
use crate::ports::{AbiPort, ContractPort, DescriptorPort, PortError, ProviderPort};

const THRESHOLD_METHOD: &str = "threshold";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no wallet provider detected")]
    NoProvider,
    #[error("no contract loaded for the active chain")]
    NoContract,
    #[error("descriptor error: {0}")]
    Descriptor(String),
    #[error(transparent)]
    Port(#[from] PortError),
}

/// Provider found at startup. `ambient` is false when it differs from the
/// globally configured provider reference.
#[derive(Debug, Clone)]
pub struct DetectedProvider<P> {
    pub provider: P,
    pub ambient: bool,
}

/// Work the shell has to do in response to provider notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    Reload { chain_id: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected { accounts: usize },
    Rejected,
    Failed,
    NoProvider,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contracts {
    pub gateway_manager: Option<ContractBinding>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayManagerData {
    pub threshold: Option<DynSolValue>,
}

pub struct Session<P, A, D>
where
    P: ProviderPort + ContractPort,
    A: AbiPort,
    D: DescriptorPort,
{
    provider: Option<P>,
    ambient: bool,
    pub abi: A,
    pub descriptors: D,
    chain_id: Option<u64>,
    accounts: Arc<[Address]>,
    contracts: Contracts,
    gateway_manager_data: GatewayManagerData,
    subscription: Option<ProviderSubscription>,
}

impl<P, A, D> Session<P, A, D>
where
    P: ProviderPort + ContractPort,
    A: AbiPort,
    D: DescriptorPort,
{
    pub fn new(detected: Option<DetectedProvider<P>>, abi: A, descriptors: D) -> Self {
        let (provider, ambient) = match detected {
            Some(d) => (Some(d.provider), d.ambient),
            None => (None, false),
        };
        Self {
            provider,
            ambient,
            abi,
            descriptors,
            chain_id: None,
            accounts: Arc::from(Vec::new()),
            contracts: Contracts::default(),
            gateway_manager_data: GatewayManagerData::default(),
            subscription: None,
        }
    }

    pub fn provider(&self) -> Option<&P> {
        self.provider.as_ref()
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn network(&self) -> Option<NetworkFile> {
        self.chain_id.and_then(NetworkFile::for_chain)
    }

    pub fn accounts(&self) -> &Arc<[Address]> {
        &self.accounts
    }

    pub fn first_account(&self) -> Option<Address> {
        self.accounts.first().copied()
    }

    pub fn contracts(&self) -> &Contracts {
        &self.contracts
    }

    pub fn gateway_manager_data(&self) -> &GatewayManagerData {
        &self.gateway_manager_data
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// The connected screen needs both a provider and at least one account.
    pub fn is_connected(&self) -> bool {
        self.provider.is_some() && !self.accounts.is_empty()
    }

    pub fn initialize(&mut self) -> Result<(), SessionError> {
        let Some(provider) = self.provider.as_ref() else {
            info!("no wallet provider detected; install a wallet to continue");
            return Ok(());
        };
        if !self.ambient {
            error!("detected provider is not the ambient provider; are multiple wallets installed?");
        }

        let chain_id = provider.chain_id()?;
        info!(chain_id, "resolved chain");
        self.chain_id = Some(chain_id);

        // accountsChanged also fires on load; a non-empty list means already connected.
        self.subscription = Some(provider.subscribe()?);

        self.load_contracts()?;
        if self.contracts.gateway_manager.is_some() {
            self.load_contract_data()?;
        }
        Ok(())
    }

    pub fn load_contracts(&mut self) -> Result<(), SessionError> {
        let Some(chain_id) = self.chain_id else {
            return Ok(());
        };
        let Some(network) = NetworkFile::for_chain(chain_id) else {
            warn!(chain_id, "no network descriptor for chain");
            self.contracts.gateway_manager = None;
            return Ok(());
        };

        let raw = self.descriptors.fetch(network.file_name())?;
        let descriptor = NetworkDescriptor::from_json(&raw)?;
        let binding = descriptor.binding(GATEWAY_MANAGER).ok_or_else(|| {
            SessionError::Descriptor(format!(
                "{} has no {GATEWAY_MANAGER} contract",
                network.file_name()
            ))
        })?;
        info!(chain_id, address = %binding.address, "loaded gateway manager contract");
        self.contracts.gateway_manager = Some(binding);
        Ok(())
    }

    /// Reads `threshold()` from the bound contract and caches it.
    pub fn load_contract_data(&mut self) -> Result<(), SessionError> {
        let provider = self.provider.as_ref().ok_or(SessionError::NoProvider)?;
        let binding = self
            .contracts
            .gateway_manager
            .as_ref()
            .ok_or(SessionError::NoContract)?;

        let call = self.abi.encode_call(binding, THRESHOLD_METHOD, &[])?;
        let raw = provider.call(&call)?;
        let threshold = self
            .abi
            .decode_output(binding, THRESHOLD_METHOD, &raw)?
            .into_iter()
            .next();
        debug!(?threshold, "fetched threshold");

        self.gateway_manager_data = GatewayManagerData { threshold };
        Ok(())
    }

    pub fn connect(&mut self) -> ConnectOutcome {
        let Some(provider) = self.provider.as_ref() else {
            info!("please install a wallet");
            return ConnectOutcome::NoProvider;
        };
        match provider.request_accounts() {
            Ok(accounts) => {
                let count = accounts.len();
                self.handle_accounts_changed(Arc::from(accounts));
                ConnectOutcome::Connected { accounts: count }
            }
            Err(e) if e.is_user_rejection() => {
                info!("connection request rejected; please connect the wallet");
                ConnectOutcome::Rejected
            }
            Err(e) => {
                error!(error = %e, "eth_requestAccounts failed");
                ConnectOutcome::Failed
            }
        }
    }

    pub fn handle_accounts_changed(&mut self, accounts: Arc<[Address]>) {
        if accounts.is_empty() {
            info!("wallet is locked or no account is connected");
            self.accounts = accounts;
        } else if !Arc::ptr_eq(&accounts, &self.accounts) {
            info!(account = %accounts[0], count = accounts.len(), "accounts changed");
            self.accounts = accounts;
        }
    }

    pub fn handle_chain_changed(&mut self, chain_id: u64) -> SessionEffect {
        info!(chain_id, "chain changed; reloading");
        SessionEffect::Reload { chain_id }
    }

    /// Drains queued provider notifications.
    pub fn handle_provider_events(&mut self) -> Vec<SessionEffect> {
        let events = match self.subscription.as_ref().map(|s| s.drain_events()) {
            Some(Ok(events)) => events,
            Some(Err(e)) => {
                warn!(error = %e, "failed to read provider events");
                return Vec::new();
            }
            None => return Vec::new(),
        };

        let mut effects = Vec::new();
        for event in events {
            match event {
                ProviderEvent::AccountsChanged(accounts) => self.handle_accounts_changed(accounts),
                ProviderEvent::ChainChanged(chain_id) => {
                    effects.push(self.handle_chain_changed(chain_id))
                }
            }
        }
        effects
    }

    /// Asks the provider for a fresh snapshot, then handles what it reported.
    pub fn poll_provider(&mut self) -> Vec<SessionEffect> {
        if let Some(provider) = self.provider.as_ref() {
            if let Err(e) = provider.refresh() {
                warn!(error = %e, "provider refresh failed");
            }
        }
        self.handle_provider_events()
    }
}
