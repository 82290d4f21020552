use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeProfile {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct ConsoleAdapterConfig {
    pub runtime_profile: RuntimeProfile,
    /// EIP-1193 JSON-RPC proxy endpoint of the detected wallet.
    pub provider_url: Option<String>,
    /// Globally configured provider reference; a different `provider_url`
    /// means another wallet is shadowing it.
    pub ambient_provider_url: Option<String>,
    /// Directory or http(s) base URL holding `*.network.json` files.
    pub descriptor_base: String,
    pub receipt_poll_interval_ms: u64,
    pub provider_poll_interval_ms: u64,
    /// Chain reported by the deterministic development provider.
    pub dev_chain_id: u64,
}

impl Default for ConsoleAdapterConfig {
    fn default() -> Self {
        Self {
            runtime_profile: RuntimeProfile::Development,
            provider_url: None,
            ambient_provider_url: None,
            descriptor_base: "./networks".to_owned(),
            receipt_poll_interval_ms: 1_000,
            provider_poll_interval_ms: 2_000,
            dev_chain_id: 80001,
        }
    }
}

impl ConsoleAdapterConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let runtime_profile = match env_string("GATEWAY_CONSOLE_RUNTIME_PROFILE").as_deref() {
            Some("production") | Some("prod") => RuntimeProfile::Production,
            _ => RuntimeProfile::Development,
        };
        let provider_url = env_string("GATEWAY_CONSOLE_PROVIDER_URL");
        let ambient_provider_url =
            env_string("GATEWAY_CONSOLE_AMBIENT_PROVIDER_URL").or_else(|| provider_url.clone());

        Self {
            runtime_profile,
            provider_url,
            ambient_provider_url,
            descriptor_base: env_string("GATEWAY_CONSOLE_DESCRIPTOR_BASE")
                .unwrap_or(defaults.descriptor_base),
            receipt_poll_interval_ms: env_u64(
                "GATEWAY_CONSOLE_RECEIPT_POLL_MS",
                defaults.receipt_poll_interval_ms,
            ),
            provider_poll_interval_ms: env_u64(
                "GATEWAY_CONSOLE_PROVIDER_POLL_MS",
                defaults.provider_poll_interval_ms,
            ),
            dev_chain_id: env_u64("GATEWAY_CONSOLE_DEV_CHAIN_ID", defaults.dev_chain_id),
        }
    }

    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }

    /// False when the detected provider is not the globally configured one.
    pub fn provider_is_ambient(&self) -> bool {
        match (&self.provider_url, &self.ambient_provider_url) {
            (Some(detected), Some(ambient)) => {
                detected.trim_end_matches('/') == ambient.trim_end_matches('/')
            }
            _ => true,
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn env_u64(key: &str, default: u64) -> u64 {
    match env_string(key) {
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!(key, value = %raw, error = %e, "ignoring invalid numeric setting");
            default
        }),
        None => default,
    }
}
