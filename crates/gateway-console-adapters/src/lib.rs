pub mod abi;
pub mod config;
pub mod descriptor;
pub mod detect;
pub mod eip1193;

pub use abi::AbiAdapter;
pub use config::{ConsoleAdapterConfig, RuntimeProfile};
pub use descriptor::DescriptorAdapter;
pub use detect::detect_provider;
pub use eip1193::{Eip1193Adapter, RpcRecord};
