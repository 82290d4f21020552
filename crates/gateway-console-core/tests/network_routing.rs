use alloy::primitives::Address;
use gateway_console_core::{NetworkDescriptor, NetworkFile, GATEWAY_MANAGER};

const DESCRIPTOR: &str = r#"{
  "contracts": {
    "GatewayManager": {
      "address": "0x00000000000000000000000000000000000000aa",
      "abi": [
        {"type": "function", "name": "threshold", "inputs": [], "outputs": [{"name": "", "type": "uint256"}], "stateMutability": "view"},
        {"type": "function", "name": "setThreshold", "inputs": [{"name": "threshold_", "type": "uint256"}], "outputs": [], "stateMutability": "nonpayable"}
      ]
    }
  }
}"#;

#[test]
fn known_chains_route_to_their_files() {
    assert_eq!(
        NetworkFile::for_chain(80001).map(|n| n.file_name()),
        Some("polygonMumbai.network.json")
    );
    assert_eq!(
        NetworkFile::for_chain(4).map(|n| n.file_name()),
        Some("rinkeby.network.json")
    );
}

#[test]
fn other_chains_have_no_file() {
    for chain_id in [0, 1, 5, 137, 11155111] {
        assert_eq!(NetworkFile::for_chain(chain_id), None);
    }
}

#[test]
fn routing_round_trips_chain_ids() {
    for network in NetworkFile::ALL {
        assert_eq!(NetworkFile::for_chain(network.chain_id()), Some(network));
    }
}

#[test]
fn descriptor_yields_gateway_manager_binding() {
    let descriptor = NetworkDescriptor::from_json(DESCRIPTOR).expect("parse descriptor");
    let binding = descriptor.binding(GATEWAY_MANAGER).expect("binding");
    assert_eq!(
        binding.address,
        "0x00000000000000000000000000000000000000aa"
            .parse::<Address>()
            .expect("address")
    );
    assert!(binding.abi.function("setThreshold").is_some());
    assert!(descriptor.binding("Other").is_none());
}

#[test]
fn malformed_descriptor_is_a_validation_error() {
    let err = NetworkDescriptor::from_json("{\"contracts\": 3}").expect_err("must fail");
    assert!(err.to_string().contains("invalid network descriptor"));
}

#[test]
fn explorer_links_use_network_base() {
    assert_eq!(
        NetworkFile::Rinkeby.explorer_tx_url("0xabc"),
        "https://rinkeby.etherscan.io/tx/0xabc"
    );
}
