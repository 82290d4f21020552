//! Bridge between the egui shell and the console workspace crates.
//! The shell builds sessions and forms only through this module.

use eyre::WrapErr;
use tracing::{error, info};

use gateway_console_adapters::{
    detect_provider, AbiAdapter, ConsoleAdapterConfig, DescriptorAdapter, Eip1193Adapter,
};
use gateway_console_core::{ArgField, InputKind, MethodForm, Session};

pub type ConsoleSession = Session<Eip1193Adapter, AbiAdapter, DescriptorAdapter>;

const SET_THRESHOLD_METHOD: &str = "setThreshold";
const SET_THRESHOLD_DESCRIPTION: &str = "set threshold";

#[derive(Debug, Clone)]
pub struct ConsoleBridge {
    config: ConsoleAdapterConfig,
}

impl ConsoleBridge {
    pub fn new(config: ConsoleAdapterConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        let config = ConsoleAdapterConfig::from_env();
        info!(
            profile = ?config.runtime_profile,
            descriptor_base = %config.descriptor_base,
            proxy = config.provider_url.is_some(),
            "console configuration loaded"
        );
        Self::new(config)
    }

    pub fn config(&self) -> &ConsoleAdapterConfig {
        &self.config
    }

    /// Detects the provider and initializes a fresh session. Initialization
    /// failures are logged; the session is returned with whatever it loaded.
    pub fn start_session(&self) -> eyre::Result<ConsoleSession> {
        let descriptors = DescriptorAdapter::from_config(&self.config)
            .wrap_err("failed to set up the network descriptor source")?;
        let mut session = Session::new(detect_provider(&self.config), AbiAdapter, descriptors);
        if let Err(e) = session.initialize() {
            error!(error = %e, "session initialization failed");
        }
        Ok(session)
    }

    /// The `setThreshold` form, available once a GatewayManager is bound.
    pub fn threshold_form(session: &ConsoleSession) -> Option<MethodForm> {
        let contract = session.contracts().gateway_manager.clone()?;
        Some(MethodForm::new(
            contract,
            SET_THRESHOLD_METHOD,
            SET_THRESHOLD_DESCRIPTION,
            vec![ArgField::new(InputKind::Number, "threshold", "0")],
        ))
    }
}
