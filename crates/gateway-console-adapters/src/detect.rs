use tracing::info;

use gateway_console_core::DetectedProvider;

use crate::{ConsoleAdapterConfig, Eip1193Adapter};

/// Finds the wallet provider for this runtime and checks it against the
/// ambient provider reference.
pub fn detect_provider(config: &ConsoleAdapterConfig) -> Option<DetectedProvider<Eip1193Adapter>> {
    let Some(provider) = Eip1193Adapter::detect(config) else {
        info!("no EIP-1193 provider configured");
        return None;
    };
    Some(DetectedProvider {
        provider,
        ambient: config.provider_is_ambient(),
    })
}
