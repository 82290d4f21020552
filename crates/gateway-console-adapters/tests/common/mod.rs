#![allow(dead_code)]

use std::io::Read;
use std::sync::Arc;
use std::thread;

use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, B256, U256};
use serde_json::Value;
use tiny_http::{Response, Server, StatusCode};

use gateway_console_adapters::{AbiAdapter, DescriptorAdapter, Eip1193Adapter};
use gateway_console_core::{ContractBinding, DetectedProvider, Session};

pub const GATEWAY_MANAGER_ABI: &str = r#"[
  {"type": "function", "name": "threshold", "inputs": [], "outputs": [{"name": "", "type": "uint256"}], "stateMutability": "view"},
  {"type": "function", "name": "setThreshold", "inputs": [{"name": "threshold_", "type": "uint256"}], "outputs": [], "stateMutability": "nonpayable"},
  {"type": "function", "name": "setGateway", "inputs": [{"name": "gateway", "type": "address"}, {"name": "enabled", "type": "bool"}, {"name": "label", "type": "string"}], "outputs": [], "stateMutability": "nonpayable"}
]"#;

pub const MUMBAI_GATEWAY: &str = "0x00000000000000000000000000000000000A0001";
pub const RINKEBY_GATEWAY: &str = "0x00000000000000000000000000000000000B0004";

pub type ConsoleSession = Session<Eip1193Adapter, AbiAdapter, DescriptorAdapter>;

pub fn descriptor_json(address: &str) -> String {
    format!(
        r#"{{"contracts": {{"GatewayManager": {{"abi": {GATEWAY_MANAGER_ABI}, "address": "{address}"}}}}}}"#
    )
}

pub fn network_files() -> DescriptorAdapter {
    DescriptorAdapter::in_memory([
        (
            "polygonMumbai.network.json".to_owned(),
            descriptor_json(MUMBAI_GATEWAY),
        ),
        (
            "rinkeby.network.json".to_owned(),
            descriptor_json(RINKEBY_GATEWAY),
        ),
    ])
}

pub fn new_session(provider: Eip1193Adapter, ambient: bool) -> ConsoleSession {
    Session::new(
        Some(DetectedProvider { provider, ambient }),
        AbiAdapter,
        network_files(),
    )
}

pub fn gateway_binding() -> ContractBinding {
    ContractBinding {
        name: "GatewayManager".to_owned(),
        address: MUMBAI_GATEWAY.parse().expect("gateway address"),
        abi: Arc::new(serde_json::from_str::<JsonAbi>(GATEWAY_MANAGER_ABI).expect("abi")),
    }
}

pub fn word(n: u64) -> B256 {
    B256::from(U256::from(n))
}

pub fn account(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// Serves JSON-RPC over HTTP; `handler` maps (method, params) to the full
/// response object minus `jsonrpc`/`id`.
pub fn spawn_rpc_server<F>(handler: F) -> String
where
    F: Fn(&str, &Value) -> Value + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());

    thread::spawn(move || loop {
        let mut req = match server.recv() {
            Ok(r) => r,
            Err(_) => break,
        };
        let mut body = String::new();
        let _ = req.as_reader().read_to_string(&mut body);
        let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        let method = request["method"].as_str().unwrap_or_default().to_owned();
        let mut payload = handler(&method, &request["params"]);
        payload["jsonrpc"] = Value::from("2.0");
        payload["id"] = request["id"].clone();
        let response = Response::from_string(payload.to_string()).with_status_code(StatusCode(200));
        let _ = req.respond(response);
    });

    addr
}

/// Serves static files keyed by URL path; anything else is a 404.
pub fn spawn_file_server(files: Vec<(String, String)>) -> String {
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());

    thread::spawn(move || loop {
        let req = match server.recv() {
            Ok(r) => r,
            Err(_) => break,
        };
        let path = req.url().to_owned();
        let found = files.iter().find(|(name, _)| path == format!("/{name}"));
        let response = match found {
            Some((_, body)) => Response::from_string(body.clone()).with_status_code(StatusCode(200)),
            None => Response::from_string("not found").with_status_code(StatusCode(404)),
        };
        let _ = req.respond(response);
    });

    addr
}
