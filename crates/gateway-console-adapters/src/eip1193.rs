use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{keccak256, Address, Bytes, B256};
use serde_json::Value;
use tracing::{debug, info, warn};

use gateway_console_core::{
    ContractPort, EventFeed, MethodCall, PendingTx, PortError, ProviderEvent, ProviderPort,
    ProviderSubscription, TxEvent, TxReceipt,
};

use crate::ConsoleAdapterConfig;

const REVERTED_MESSAGE: &str = "Transaction has been reverted by the EVM";
const RPC_LOG_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct Eip1193Adapter {
    mode: ProviderMode,
    state: Arc<Mutex<ProviderState>>,
    listeners: Arc<Mutex<ListenerRegistry>>,
    receipt_poll_interval: Duration,
}

#[derive(Debug, Clone)]
enum ProviderMode {
    Deterministic,
    Proxy(ProxyRuntime),
}

#[derive(Debug, Clone)]
struct ProxyRuntime {
    base_url: String,
    client: reqwest::blocking::Client,
}

/// One provider request as seen by the adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRecord {
    pub method: String,
    pub params: Value,
}

#[derive(Debug, Clone)]
struct ProviderState {
    accounts: Vec<Address>,
    authorized: bool,
    chain_id: u64,
    gas_estimate: u64,
    stored_word: B256,
    sent_count: u64,
    pending_rejection: Option<i64>,
    last_reported_accounts: Option<Vec<Address>>,
    last_reported_chain: Option<u64>,
    rpc_log: VecDeque<RpcRecord>,
}

impl ProviderState {
    fn deterministic(chain_id: u64) -> Self {
        Self {
            accounts: vec![Address::repeat_byte(0x10)],
            authorized: false,
            chain_id,
            gas_estimate: 50_000,
            stored_word: B256::ZERO,
            sent_count: 0,
            pending_rejection: None,
            last_reported_accounts: None,
            last_reported_chain: None,
            rpc_log: VecDeque::new(),
        }
    }
}

#[derive(Debug, Default)]
struct ListenerRegistry {
    next_id: u64,
    feeds: Vec<(u64, EventFeed<ProviderEvent>)>,
}

impl Default for Eip1193Adapter {
    fn default() -> Self {
        Self::deterministic(ConsoleAdapterConfig::default().dev_chain_id)
    }
}

impl Eip1193Adapter {
    /// In-process wallet with one built-in account. Used in development and
    /// tests.
    pub fn deterministic(chain_id: u64) -> Self {
        Self {
            mode: ProviderMode::Deterministic,
            state: Arc::new(Mutex::new(ProviderState::deterministic(chain_id))),
            listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
            receipt_poll_interval: Duration::from_millis(
                ConsoleAdapterConfig::default().receipt_poll_interval_ms,
            ),
        }
    }

    /// Wallet reached through an EIP-1193 JSON-RPC proxy. No request timeout
    /// is applied.
    pub fn proxy(base_url: impl Into<String>, config: &ConsoleAdapterConfig) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .map_err(|e| PortError::Transport(format!("failed to build proxy client: {e}")))?;
        let mut state = ProviderState::deterministic(0);
        state.accounts.clear();
        Ok(Self {
            mode: ProviderMode::Proxy(ProxyRuntime {
                base_url: base_url.into(),
                client,
            }),
            state: Arc::new(Mutex::new(state)),
            listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
            receipt_poll_interval: Duration::from_millis(config.receipt_poll_interval_ms),
        })
    }

    /// Resolves the provider for this runtime, or `None` when no wallet is
    /// available.
    pub fn detect(config: &ConsoleAdapterConfig) -> Option<Self> {
        if let Some(ref url) = config.provider_url {
            return match Self::proxy(url.clone(), config) {
                Ok(adapter) => Some(adapter),
                Err(e) if config.strict_runtime_required() => {
                    warn!(error = %e, "EIP-1193 proxy unavailable in production profile");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "EIP-1193 proxy unavailable; using deterministic provider");
                    Some(Self::deterministic(config.dev_chain_id))
                }
            };
        }
        if config.strict_runtime_required() {
            return None;
        }
        info!(chain_id = config.dev_chain_id, "using deterministic development provider");
        Some(Self::deterministic(config.dev_chain_id))
    }

    pub fn is_deterministic(&self) -> bool {
        matches!(self.mode, ProviderMode::Deterministic)
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, ProviderState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("provider lock poisoned: {e}")))
    }

    fn record(&self, method: &str, params: &Value) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        if g.rpc_log.len() == RPC_LOG_CAPACITY {
            g.rpc_log.pop_front();
        }
        g.rpc_log.push_back(RpcRecord {
            method: method.to_owned(),
            params: params.clone(),
        });
        Ok(())
    }

    fn emit(&self, event: ProviderEvent) -> Result<(), PortError> {
        let g = self
            .listeners
            .lock()
            .map_err(|e| PortError::Transport(format!("listener lock poisoned: {e}")))?;
        for (_, feed) in &g.feeds {
            feed.push(event.clone());
        }
        Ok(())
    }

    fn request(&self, method: &str, params: Value) -> Result<Value, PortError> {
        match &self.mode {
            ProviderMode::Proxy(proxy) => proxy.call(method, params),
            ProviderMode::Deterministic => {
                self.record(method, &params)?;
                self.deterministic_request(method, &params)
            }
        }
    }

    fn deterministic_request(&self, method: &str, params: &Value) -> Result<Value, PortError> {
        let mut g = self.lock_state()?;
        match method {
            "eth_chainId" => Ok(Value::String(format!("0x{:x}", g.chain_id))),
            "eth_accounts" => {
                let visible: &[Address] = if g.authorized { &g.accounts } else { &[] };
                Ok(accounts_json(visible))
            }
            "eth_requestAccounts" => {
                if let Some(code) = g.pending_rejection.take() {
                    return Err(PortError::Rpc {
                        code,
                        message: "User rejected the request.".to_owned(),
                    });
                }
                g.authorized = true;
                Ok(accounts_json(&g.accounts))
            }
            "eth_estimateGas" => Ok(Value::String(format!("0x{:x}", g.gas_estimate))),
            "eth_sendTransaction" => {
                let tx = &params[0];
                let data = tx_data(tx)?;
                if data.len() >= 36 {
                    g.stored_word = B256::from_slice(&data[data.len() - 32..]);
                }
                g.sent_count = g.sent_count.saturating_add(1);
                let mut seed = serde_json::to_vec(tx)
                    .map_err(|e| PortError::Validation(format!("tx serialization failed: {e}")))?;
                seed.extend_from_slice(&g.sent_count.to_be_bytes());
                Ok(Value::String(keccak256(seed).to_string()))
            }
            "eth_call" => Ok(Value::String(format!(
                "0x{}",
                alloy::hex::encode(g.stored_word.as_slice())
            ))),
            other => Err(PortError::Rpc {
                code: 4200,
                message: format!("unsupported method: {other}"),
            }),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|g| g.feeds.len()).unwrap_or(0)
    }

    /// Most recent requests answered by the deterministic provider, oldest
    /// first. Proxy requests are not recorded.
    pub fn debug_rpc_log(&self) -> Vec<RpcRecord> {
        self.lock_state()
            .map(|g| g.rpc_log.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn debug_set_gas_estimate(&self, gas: u64) -> Result<(), PortError> {
        self.lock_state()?.gas_estimate = gas;
        Ok(())
    }

    pub fn debug_set_stored_word(&self, word: B256) -> Result<(), PortError> {
        self.lock_state()?.stored_word = word;
        Ok(())
    }

    /// Makes the next `eth_requestAccounts` fail with `code`.
    pub fn debug_reject_next_connection(&self, code: i64) -> Result<(), PortError> {
        self.lock_state()?.pending_rejection = Some(code);
        Ok(())
    }

    pub fn debug_inject_accounts_changed(&self, accounts: Vec<Address>) -> Result<(), PortError> {
        {
            let mut g = self.lock_state()?;
            g.accounts = accounts.clone();
            g.authorized = !accounts.is_empty();
            g.last_reported_accounts = Some(accounts.clone());
        }
        self.emit(ProviderEvent::AccountsChanged(Arc::from(accounts)))
    }

    pub fn debug_inject_chain_changed(&self, chain_id: u64) -> Result<(), PortError> {
        {
            let mut g = self.lock_state()?;
            g.chain_id = chain_id;
            g.last_reported_chain = Some(chain_id);
        }
        self.emit(ProviderEvent::ChainChanged(chain_id))
    }

    fn watch_receipt(&self, hash: B256, feed: EventFeed<TxEvent>) {
        let ProviderMode::Proxy(proxy) = &self.mode else {
            return;
        };
        let proxy = proxy.clone();
        let interval = self.receipt_poll_interval;
        std::thread::spawn(move || loop {
            std::thread::sleep(interval);
            match proxy.call("eth_getTransactionReceipt", serde_json::json!([hash.to_string()])) {
                Ok(Value::Null) => continue,
                Ok(receipt) => {
                    feed.push(receipt_event(hash, &receipt));
                    break;
                }
                Err(e) => {
                    feed.push(TxEvent::Error(e.display_message()));
                    break;
                }
            }
        });
    }
}

impl ProxyRuntime {
    fn call(&self, method: &str, params: Value) -> Result<Value, PortError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self
            .client
            .post(&self.base_url)
            .json(&payload)
            .send()
            .map_err(|e| PortError::Transport(format!("eip1193 proxy request failed: {e}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .map_err(|e| PortError::Transport(format!("eip1193 proxy json decode failed: {e}")))?;
        if let Some(err) = body.get("error") {
            return Err(rpc_error(err));
        }
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "eip1193 proxy status {}: {}",
                status, body
            )));
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| PortError::Transport("eip1193 proxy missing result".to_owned()))
    }
}

impl ProviderPort for Eip1193Adapter {
    fn chain_id(&self) -> Result<u64, PortError> {
        let result = self.request("eth_chainId", serde_json::json!([]))?;
        let chain_id = json_quantity_to_u64(&result)?;
        self.lock_state()?.chain_id = chain_id;
        Ok(chain_id)
    }

    fn request_accounts(&self) -> Result<Vec<Address>, PortError> {
        let result = self.request("eth_requestAccounts", serde_json::json!([]))?;
        let accounts = parse_accounts(&result)?;
        self.lock_state()?.accounts = accounts.clone();
        Ok(accounts)
    }

    fn subscribe(&self) -> Result<ProviderSubscription, PortError> {
        let feed = EventFeed::new();
        let id = {
            let mut g = self
                .listeners
                .lock()
                .map_err(|e| PortError::Transport(format!("listener lock poisoned: {e}")))?;
            g.next_id = g.next_id.saturating_add(1);
            let id = g.next_id;
            g.feeds.push((id, feed.clone()));
            id
        };
        debug!(id, "provider listener registered");

        let registry = Arc::clone(&self.listeners);
        Ok(ProviderSubscription::new(feed, move || {
            if let Ok(mut g) = registry.lock() {
                g.feeds.retain(|(listener_id, _)| *listener_id != id);
            }
            debug!(id, "provider listener removed");
        }))
    }

    fn refresh(&self) -> Result<(), PortError> {
        let chain_id = json_quantity_to_u64(&self.request("eth_chainId", serde_json::json!([]))?)?;
        let accounts = parse_accounts(&self.request("eth_accounts", serde_json::json!([]))?)?;

        let (accounts_changed, chain_changed) = {
            let mut g = self.lock_state()?;
            let accounts_changed = g.last_reported_accounts.as_ref() != Some(&accounts);
            let chain_changed = g
                .last_reported_chain
                .is_some_and(|previous| previous != chain_id);
            g.last_reported_accounts = Some(accounts.clone());
            g.last_reported_chain = Some(chain_id);
            g.chain_id = chain_id;
            (accounts_changed, chain_changed)
        };

        if accounts_changed {
            self.emit(ProviderEvent::AccountsChanged(Arc::from(accounts)))?;
        }
        if chain_changed {
            self.emit(ProviderEvent::ChainChanged(chain_id))?;
        }
        Ok(())
    }
}

impl ContractPort for Eip1193Adapter {
    fn estimate_gas(&self, call: &MethodCall, from: Address) -> Result<u64, PortError> {
        let params = serde_json::json!([{
            "from": from.to_string(),
            "to": call.to.to_string(),
            "data": call.data.to_string(),
        }]);
        json_quantity_to_u64(&self.request("eth_estimateGas", params)?)
    }

    fn send(&self, call: &MethodCall, from: Address, gas: u64) -> Result<PendingTx, PortError> {
        let params = serde_json::json!([{
            "from": from.to_string(),
            "to": call.to.to_string(),
            "data": call.data.to_string(),
            "gas": format!("0x{gas:x}"),
        }]);
        let result = self.request("eth_sendTransaction", params)?;
        let hash: B256 = result
            .as_str()
            .ok_or_else(|| PortError::Transport("eth_sendTransaction must return hash".to_owned()))?
            .parse()
            .map_err(|e| PortError::Validation(format!("invalid tx hash: {e}")))?;
        info!(tx_hash = %hash, method = %call.method, "transaction submitted");

        let feed = EventFeed::new();
        feed.push(TxEvent::TransactionHash(hash));
        if self.is_deterministic() {
            feed.push(TxEvent::Receipt(TxReceipt {
                transaction_hash: hash,
                block_number: None,
            }));
        } else {
            self.watch_receipt(hash, feed.clone());
        }
        Ok(PendingTx::new(feed))
    }

    fn call(&self, call: &MethodCall) -> Result<Bytes, PortError> {
        let params = serde_json::json!([
            {
                "to": call.to.to_string(),
                "data": call.data.to_string(),
            },
            "latest"
        ]);
        let result = self.request("eth_call", params)?;
        result
            .as_str()
            .ok_or_else(|| PortError::Transport("eth_call must return hex data".to_owned()))?
            .parse()
            .map_err(|e| PortError::Validation(format!("invalid call result: {e}")))
    }
}

fn accounts_json(accounts: &[Address]) -> Value {
    Value::Array(
        accounts
            .iter()
            .map(|a| Value::String(a.to_string()))
            .collect(),
    )
}

fn parse_accounts(value: &Value) -> Result<Vec<Address>, PortError> {
    let arr = value
        .as_array()
        .ok_or_else(|| PortError::Transport("accounts result must be array".to_owned()))?;
    let mut accounts = Vec::with_capacity(arr.len());
    for item in arr {
        let raw = item
            .as_str()
            .ok_or_else(|| PortError::Transport("account must be string".to_owned()))?;
        let parsed: Address = raw
            .parse()
            .map_err(|e| PortError::Validation(format!("invalid account address: {e}")))?;
        accounts.push(parsed);
    }
    Ok(accounts)
}

fn tx_data(tx: &Value) -> Result<Bytes, PortError> {
    tx.get("data")
        .and_then(Value::as_str)
        .unwrap_or("0x")
        .parse()
        .map_err(|e| PortError::Validation(format!("invalid tx data: {e}")))
}

fn rpc_error(err: &Value) -> PortError {
    let code = err.get("code").and_then(Value::as_i64);
    let message = err
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| err.to_string());
    match code {
        Some(code) => PortError::Rpc { code, message },
        None => PortError::Transport(format!("eip1193 proxy returned error: {message}")),
    }
}

fn receipt_event(hash: B256, receipt: &Value) -> TxEvent {
    let succeeded = match receipt.get("status") {
        Some(status) => json_quantity_to_u64(status).map(|s| s == 1).unwrap_or(false),
        None => true,
    };
    if !succeeded {
        return TxEvent::Error(REVERTED_MESSAGE.to_owned());
    }
    let transaction_hash = receipt
        .get("transactionHash")
        .and_then(Value::as_str)
        .and_then(|h| h.parse().ok())
        .unwrap_or(hash);
    let block_number = receipt
        .get("blockNumber")
        .and_then(|n| json_quantity_to_u64(n).ok());
    TxEvent::Receipt(TxReceipt {
        transaction_hash,
        block_number,
    })
}

fn json_quantity_to_u64(value: &Value) -> Result<u64, PortError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    let s = value
        .as_str()
        .ok_or_else(|| PortError::Validation("quantity must be string or number".to_owned()))?;
    parse_quantity_str(s)
}

fn parse_quantity_str(raw: &str) -> Result<u64, PortError> {
    if raw.starts_with("0x") || raw.starts_with("0X") {
        u64::from_str_radix(&raw[2..], 16)
            .map_err(|e| PortError::Validation(format!("invalid hex quantity: {e}")))
    } else {
        raw.parse()
            .map_err(|e| PortError::Validation(format!("invalid quantity: {e}")))
    }
}
