mod common;

use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, U256};

use gateway_console_adapters::{AbiAdapter, DescriptorAdapter, Eip1193Adapter};
use gateway_console_core::{ConnectOutcome, Session, SessionEffect, SessionError};

use common::{account, new_session, word, ConsoleSession, MUMBAI_GATEWAY, RINKEBY_GATEWAY};

fn eth_call_count(provider: &Eip1193Adapter) -> usize {
    provider
        .debug_rpc_log()
        .iter()
        .filter(|r| r.method == "eth_call")
        .count()
}

#[test]
fn mumbai_session_loads_gateway_and_threshold() {
    let provider = Eip1193Adapter::deterministic(80001);
    provider.debug_set_stored_word(word(3)).expect("seed threshold");
    let mut session = new_session(provider.clone(), true);

    session.initialize().expect("initialize");

    assert_eq!(session.chain_id(), Some(80001));
    assert_eq!(session.descriptors.fetched(), vec!["polygonMumbai.network.json"]);
    let binding = session
        .contracts()
        .gateway_manager
        .as_ref()
        .expect("gateway manager");
    assert_eq!(binding.address, MUMBAI_GATEWAY.parse::<Address>().expect("address"));
    assert_eq!(
        session.gateway_manager_data().threshold,
        Some(DynSolValue::Uint(U256::from(3), 256))
    );
    assert!(session.is_subscribed());
    assert_eq!(provider.listener_count(), 1);
    assert_eq!(eth_call_count(&provider), 1);
}

#[test]
fn rinkeby_session_uses_rinkeby_descriptor() {
    let mut session = new_session(Eip1193Adapter::deterministic(4), true);
    session.initialize().expect("initialize");

    assert_eq!(session.descriptors.fetched(), vec!["rinkeby.network.json"]);
    assert_eq!(
        session.contracts().gateway_manager.as_ref().map(|b| b.address),
        Some(RINKEBY_GATEWAY.parse().expect("address"))
    );
}

#[test]
fn unsupported_chain_has_no_contract_and_never_reads() {
    let provider = Eip1193Adapter::deterministic(1);
    let mut session = new_session(provider.clone(), true);

    session.initialize().expect("initialize");

    assert!(session.contracts().gateway_manager.is_none());
    assert!(session.descriptors.fetched().is_empty());
    assert_eq!(session.gateway_manager_data().threshold, None);
    assert_eq!(eth_call_count(&provider), 0);

    let err = session.load_contract_data().expect_err("no contract");
    assert!(matches!(err, SessionError::NoContract));
    assert_eq!(eth_call_count(&provider), 0);
}

#[test]
fn missing_provider_stays_unconnected() {
    let mut session: ConsoleSession =
        Session::new(None, AbiAdapter, DescriptorAdapter::in_memory(Vec::new()));

    session.initialize().expect("initialize without provider");
    assert!(!session.is_connected());
    assert_eq!(session.chain_id(), None);
    assert_eq!(session.connect(), ConnectOutcome::NoProvider);
    assert!(session.poll_provider().is_empty());
}

#[test]
fn conflicting_provider_is_still_used() {
    let mut session = new_session(Eip1193Adapter::deterministic(80001), false);
    session.initialize().expect("initialize");
    assert_eq!(session.chain_id(), Some(80001));
    assert!(session.contracts().gateway_manager.is_some());
}

#[test]
fn connect_stores_returned_accounts() {
    let mut session = new_session(Eip1193Adapter::deterministic(80001), true);
    session.initialize().expect("initialize");
    assert!(!session.is_connected());

    assert_eq!(session.connect(), ConnectOutcome::Connected { accounts: 1 });
    assert!(session.is_connected());
    assert_eq!(session.first_account(), Some(Address::repeat_byte(0x10)));
}

#[test]
fn user_rejection_returns_quietly_to_unconnected() {
    let provider = Eip1193Adapter::deterministic(80001);
    provider
        .debug_reject_next_connection(4001)
        .expect("arm rejection");
    let mut session = new_session(provider, true);
    session.initialize().expect("initialize");

    assert_eq!(session.connect(), ConnectOutcome::Rejected);
    assert!(!session.is_connected());
    assert!(session.accounts().is_empty());
}

#[test]
fn other_connect_errors_are_only_logged() {
    let provider = Eip1193Adapter::deterministic(80001);
    provider
        .debug_reject_next_connection(-32603)
        .expect("arm failure");
    let mut session = new_session(provider, true);
    session.initialize().expect("initialize");

    assert_eq!(session.connect(), ConnectOutcome::Failed);
    assert!(!session.is_connected());
}

#[test]
fn empty_account_notification_disconnects() {
    let provider = Eip1193Adapter::deterministic(80001);
    let mut session = new_session(provider.clone(), true);
    session.initialize().expect("initialize");
    session.connect();
    assert!(session.is_connected());

    provider
        .debug_inject_accounts_changed(Vec::new())
        .expect("inject empty accounts");
    assert!(session.handle_provider_events().is_empty());

    assert!(session.accounts().is_empty());
    assert!(!session.is_connected());
}

#[test]
fn account_list_identity_decides_replacement() {
    let mut session = new_session(Eip1193Adapter::deterministic(80001), true);

    let first: Arc<[Address]> = Arc::from(vec![account(0xa1)]);
    session.handle_accounts_changed(Arc::clone(&first));
    assert!(Arc::ptr_eq(session.accounts(), &first));

    session.handle_accounts_changed(Arc::clone(&first));
    assert!(Arc::ptr_eq(session.accounts(), &first));

    let equal_copy: Arc<[Address]> = Arc::from(vec![account(0xa1)]);
    session.handle_accounts_changed(Arc::clone(&equal_copy));
    assert!(Arc::ptr_eq(session.accounts(), &equal_copy));

    let switched: Arc<[Address]> = Arc::from(vec![account(0xb2), account(0xa1)]);
    session.handle_accounts_changed(switched);
    assert_eq!(session.first_account(), Some(account(0xb2)));
}

#[test]
fn chain_change_requests_reload() {
    let provider = Eip1193Adapter::deterministic(80001);
    let mut session = new_session(provider.clone(), true);
    session.initialize().expect("initialize");

    provider.debug_inject_chain_changed(4).expect("inject chain");
    assert_eq!(
        session.handle_provider_events(),
        vec![SessionEffect::Reload { chain_id: 4 }]
    );
}

#[test]
fn dropping_session_tears_down_subscription() {
    let provider = Eip1193Adapter::deterministic(80001);
    let mut session = new_session(provider.clone(), true);
    session.initialize().expect("initialize");
    assert_eq!(provider.listener_count(), 1);

    drop(session);
    assert_eq!(provider.listener_count(), 0);

    provider
        .debug_inject_chain_changed(4)
        .expect("emit with no listeners");
}

#[test]
fn first_poll_after_connect_reports_accounts() {
    let provider = Eip1193Adapter::deterministic(80001);
    let mut session = new_session(provider, true);
    session.initialize().expect("initialize");
    session.connect();
    let before = Arc::clone(session.accounts());

    assert!(session.poll_provider().is_empty());
    assert!(!Arc::ptr_eq(session.accounts(), &before));
    assert_eq!(&session.accounts()[..], &before[..]);

    let again = Arc::clone(session.accounts());
    assert!(session.poll_provider().is_empty());
    assert!(Arc::ptr_eq(session.accounts(), &again));
}

#[test]
fn refresh_rereads_threshold() {
    let provider = Eip1193Adapter::deterministic(80001);
    let mut session = new_session(provider.clone(), true);
    session.initialize().expect("initialize");
    assert_eq!(
        session.gateway_manager_data().threshold,
        Some(DynSolValue::Uint(U256::ZERO, 256))
    );

    provider.debug_set_stored_word(word(9)).expect("update threshold");
    session.load_contract_data().expect("refresh");
    assert_eq!(
        session.gateway_manager_data().threshold,
        Some(DynSolValue::Uint(U256::from(9), 256))
    );
    assert_eq!(eth_call_count(&provider), 2);
}
