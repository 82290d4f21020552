use alloy::primitives::B256;

use crate::domain::TxEvent;

/// Progress of the most recent form submission.
///
/// Rendered as a list of lines. `Failed` keeps any transaction hash that was
/// already shown so that late errors do not hide it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Executing {
        hash: Option<B256>,
    },
    Completed {
        hash: B256,
    },
    Failed {
        preserved_hash: Option<B256>,
        details: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    Submitted,
    TransactionHash(B256),
    Receipt(B256),
    Error(String),
}

impl From<TxEvent> for StatusEvent {
    fn from(event: TxEvent) -> Self {
        match event {
            TxEvent::TransactionHash(hash) => StatusEvent::TransactionHash(hash),
            TxEvent::Receipt(receipt) => StatusEvent::Receipt(receipt.transaction_hash),
            TxEvent::Error(message) => StatusEvent::Error(message),
        }
    }
}

impl SubmissionStatus {
    pub fn apply(self, event: StatusEvent) -> Self {
        match event {
            StatusEvent::Submitted => SubmissionStatus::Executing { hash: None },
            StatusEvent::TransactionHash(hash) => SubmissionStatus::Executing { hash: Some(hash) },
            StatusEvent::Receipt(hash) => SubmissionStatus::Completed { hash },
            StatusEvent::Error(message) => match self {
                SubmissionStatus::Idle | SubmissionStatus::Executing { hash: None } => {
                    SubmissionStatus::Failed {
                        preserved_hash: None,
                        details: vec![message],
                    }
                }
                SubmissionStatus::Executing { hash: Some(hash) }
                | SubmissionStatus::Completed { hash } => SubmissionStatus::Failed {
                    preserved_hash: Some(hash),
                    details: vec![message],
                },
                SubmissionStatus::Failed {
                    preserved_hash,
                    mut details,
                } => {
                    details.push(message);
                    SubmissionStatus::Failed {
                        preserved_hash,
                        details,
                    }
                }
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubmissionStatus::Idle => "None",
            SubmissionStatus::Executing { .. } => "Executing...",
            SubmissionStatus::Completed { .. } => "Completed.",
            SubmissionStatus::Failed { .. } => "Error.",
        }
    }

    pub fn transaction_hash(&self) -> Option<B256> {
        match self {
            SubmissionStatus::Idle => None,
            SubmissionStatus::Executing { hash } => *hash,
            SubmissionStatus::Completed { hash } => Some(*hash),
            SubmissionStatus::Failed { preserved_hash, .. } => *preserved_hash,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Completed { .. } | SubmissionStatus::Failed { .. }
        )
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.label().to_owned()];
        if let Some(hash) = self.transaction_hash() {
            lines.push(tx_line(hash));
        }
        if let SubmissionStatus::Failed { details, .. } = self {
            lines.extend(details.iter().cloned());
        }
        lines
    }
}

fn tx_line(hash: B256) -> String {
    format!("Tx: {hash}")
}
