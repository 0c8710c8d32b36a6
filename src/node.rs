use crate::api::{build_api_router, run_api_server, ApiState};
use crate::blockchain::ChainHead;
use crate::config::Config;
use crate::error::{LedgerError, Result};
use crate::mempool::Mempool;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// A running ledger: the chain head, the mempool and the API in front of them.
pub struct Node {
    pub config: Config,
    pub chain: Arc<ChainHead>,
    pub mempool: Arc<RwLock<Mempool>>,
}

impl Node {
    /// Builds the genesis block from config and installs it as the head.
    pub fn init(config: Config) -> Self {
        let genesis = config.genesis.build_block();
        info!(
            genesis = %genesis.hash(),
            genesis_scan = ?config.ledger.genesis_scan,
            "Starting hashledger node"
        );
        let chain = Arc::new(ChainHead::new(genesis));
        let mempool = Arc::new(RwLock::new(Mempool::new()));
        Node { config, chain, mempool }
    }

    fn api_state(&self) -> Arc<ApiState> {
        Arc::new(ApiState::new_shared(
            self.chain.clone(),
            self.mempool.clone(),
            self.config.ledger.genesis_scan,
        ))
    }

    pub fn router(&self) -> Router {
        build_api_router(self.api_state())
    }

    pub fn api_addr(&self) -> Result<SocketAddr> {
        let text = format!("{}:{}", self.config.api.bind, self.config.api.port);
        text.parse()
            .map_err(|e| LedgerError::Config(format!("Invalid API address {}: {}", text, e)))
    }

    pub async fn run(&self) -> Result<()> {
        let addr = self.api_addr()?;
        run_api_server(self.api_state(), addr).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_init_installs_configured_genesis() {
        let config = parse_config("[[genesis.outputs]]\namount = 9\nlocking_script = \"alice\"\n").unwrap();
        let node = Node::init(config);
        let head = node.chain.head();
        assert_eq!(head.chain_length(), 1);
        assert_eq!(head.gross_receipts("alice").total, 9);
    }

    #[test]
    fn test_api_addr() {
        let config = parse_config("[api]\nbind = \"127.0.0.1\"\nport = 5002\n").unwrap();
        let node = Node::init(config);
        assert_eq!(node.api_addr().unwrap(), "127.0.0.1:5002".parse::<SocketAddr>().unwrap());

        let config = parse_config("[api]\nbind = \"not an ip\"\n").unwrap();
        assert!(matches!(Node::init(config).api_addr(), Err(LedgerError::Config(_))));
    }
}
