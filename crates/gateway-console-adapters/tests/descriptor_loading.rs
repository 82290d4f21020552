mod common;

use std::path::PathBuf;

use gateway_console_adapters::{ConsoleAdapterConfig, DescriptorAdapter};
use gateway_console_core::{DescriptorPort, NetworkDescriptor, PortError, GATEWAY_MANAGER};

use common::{descriptor_json, spawn_file_server, MUMBAI_GATEWAY, RINKEBY_GATEWAY};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "gateway-console-{name}-{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[test]
fn directory_source_reads_network_files() {
    let dir = scratch_dir("dir-source");
    std::fs::write(
        dir.join("polygonMumbai.network.json"),
        descriptor_json(MUMBAI_GATEWAY),
    )
    .expect("write descriptor");

    let adapter = DescriptorAdapter::directory(dir.clone());
    let raw = adapter
        .fetch("polygonMumbai.network.json")
        .expect("fetch descriptor");
    let descriptor = NetworkDescriptor::from_json(&raw).expect("parse");
    assert!(descriptor.binding(GATEWAY_MANAGER).is_some());

    let err = adapter.fetch("rinkeby.network.json").expect_err("missing");
    assert!(matches!(err, PortError::NotFound(_)));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn http_source_fetches_from_base_url() {
    let base = spawn_file_server(vec![(
        "rinkeby.network.json".to_owned(),
        descriptor_json(RINKEBY_GATEWAY),
    )]);
    let config = ConsoleAdapterConfig {
        descriptor_base: format!("{base}/"),
        ..ConsoleAdapterConfig::default()
    };

    let adapter = DescriptorAdapter::from_config(&config).expect("http adapter");
    let raw = adapter.fetch("rinkeby.network.json").expect("fetch");
    assert!(raw.contains("GatewayManager"));

    let err = adapter
        .fetch("polygonMumbai.network.json")
        .expect_err("missing");
    assert!(matches!(err, PortError::NotFound(_)));
    assert_eq!(
        adapter.fetched(),
        vec!["rinkeby.network.json", "polygonMumbai.network.json"]
    );
}

#[test]
fn plain_base_is_treated_as_directory() {
    let config = ConsoleAdapterConfig {
        descriptor_base: "./does-not-exist".to_owned(),
        ..ConsoleAdapterConfig::default()
    };
    let adapter = DescriptorAdapter::from_config(&config).expect("dir adapter");
    let err = adapter.fetch("rinkeby.network.json").expect_err("missing");
    assert!(matches!(err, PortError::NotFound(_)));
}
