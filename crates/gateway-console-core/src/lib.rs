pub mod domain;
pub mod feed;
pub mod form;
pub mod networks;
pub mod ports;
pub mod session;
pub mod status;

pub use domain::{
    display_value, ArgField, ContractArtifact, ContractBinding, InputKind, MethodCall,
    NetworkDescriptor, ProviderEvent, TxEvent, TxReceipt, GATEWAY_MANAGER,
};
pub use feed::{EventFeed, PendingTx, ProviderSubscription};
pub use form::{gas_limit_with_margin, MethodForm};
pub use networks::NetworkFile;
pub use ports::{
    AbiPort, ContractPort, DescriptorPort, PortError, ProviderPort, USER_REJECTED_REQUEST,
};
pub use session::{
    ConnectOutcome, Contracts, DetectedProvider, GatewayManagerData, Session, SessionEffect,
    SessionError,
};
pub use status::{StatusEvent, SubmissionStatus};
