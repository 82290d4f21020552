//! Chain ID to network descriptor routing.

/// Networks that ship a descriptor file. Any other chain has no contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFile {
    PolygonMumbai,
    Rinkeby,
}

impl NetworkFile {
    pub const ALL: [NetworkFile; 2] = [NetworkFile::PolygonMumbai, NetworkFile::Rinkeby];

    pub fn for_chain(chain_id: u64) -> Option<Self> {
        match chain_id {
            80001 => Some(NetworkFile::PolygonMumbai),
            4 => Some(NetworkFile::Rinkeby),
            _ => None,
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            NetworkFile::PolygonMumbai => 80001,
            NetworkFile::Rinkeby => 4,
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            NetworkFile::PolygonMumbai => "polygonMumbai.network.json",
            NetworkFile::Rinkeby => "rinkeby.network.json",
        }
    }

    pub fn explorer_base(&self) -> &'static str {
        match self {
            NetworkFile::PolygonMumbai => "https://mumbai.polygonscan.com",
            NetworkFile::Rinkeby => "https://rinkeby.etherscan.io",
        }
    }

    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_base(), tx_hash)
    }
}
