use alloy::primitives::B256;
use gateway_console_core::{StatusEvent, SubmissionStatus, TxEvent, TxReceipt};

fn hash() -> B256 {
    B256::repeat_byte(0x11)
}

#[test]
fn error_from_idle_is_label_and_message() {
    let status = SubmissionStatus::Idle.apply(StatusEvent::Error("boom".to_owned()));
    assert_eq!(status.lines(), vec!["Error.".to_owned(), "boom".to_owned()]);
}

#[test]
fn error_while_executing_without_hash_replaces_wholesale() {
    let status = SubmissionStatus::Idle
        .apply(StatusEvent::Submitted)
        .apply(StatusEvent::Error("out of gas".to_owned()));
    assert_eq!(status.lines(), vec!["Error.".to_owned(), "out of gas".to_owned()]);
    assert_eq!(status.transaction_hash(), None);
}

#[test]
fn error_after_hash_keeps_hash_line() {
    let status = SubmissionStatus::Idle
        .apply(StatusEvent::Submitted)
        .apply(StatusEvent::TransactionHash(hash()))
        .apply(StatusEvent::Error("reverted".to_owned()));
    let lines = status.lines();
    assert_eq!(lines[0], "Error.");
    assert_eq!(lines[1], format!("Tx: {}", hash()));
    assert_eq!(lines[2], "reverted");
    assert_eq!(status.transaction_hash(), Some(hash()));
}

#[test]
fn error_after_completion_keeps_hash_line() {
    let status = SubmissionStatus::Completed { hash: hash() }
        .apply(StatusEvent::Error("late failure".to_owned()));
    assert_eq!(
        status.lines(),
        vec![
            "Error.".to_owned(),
            format!("Tx: {}", hash()),
            "late failure".to_owned()
        ]
    );
}

#[test]
fn repeated_errors_append_details() {
    let status = SubmissionStatus::Idle
        .apply(StatusEvent::Error("first".to_owned()))
        .apply(StatusEvent::Error("second".to_owned()));
    assert_eq!(
        status.lines(),
        vec!["Error.".to_owned(), "first".to_owned(), "second".to_owned()]
    );
}

#[test]
fn hash_line_follows_executing_label() {
    let status = SubmissionStatus::Idle
        .apply(StatusEvent::Submitted)
        .apply(StatusEvent::TransactionHash(hash()));
    assert_eq!(
        status.lines(),
        vec!["Executing...".to_owned(), format!("Tx: {}", hash())]
    );
    assert!(!status.is_terminal());
}

#[test]
fn new_submission_after_failure_resets_to_executing() {
    let status = SubmissionStatus::Idle
        .apply(StatusEvent::Error("first".to_owned()))
        .apply(StatusEvent::Submitted);
    assert_eq!(status, SubmissionStatus::Executing { hash: None });
}

#[test]
fn tx_events_map_onto_status_events() {
    let receipt = TxEvent::Receipt(TxReceipt {
        transaction_hash: hash(),
        block_number: Some(7),
    });
    assert_eq!(StatusEvent::from(receipt), StatusEvent::Receipt(hash()));
    assert_eq!(
        StatusEvent::from(TxEvent::Error("x".to_owned())),
        StatusEvent::Error("x".to_owned())
    );
}
