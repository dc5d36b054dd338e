//! Business logic services

pub mod aptos;
pub mod catalog;
pub mod chain;
pub mod redis;
pub mod session;
pub mod status;

use std::sync::Arc;

use crate::{
    config::{ChainConfig, SessionBackend, SessionConfig},
    error::AppResult,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub chain: chain::ChainGateway,
    pub session: session::SessionGate,
}

impl Services {
    /// Wire services around an existing store and chain client
    pub fn new(
        chain_config: &ChainConfig,
        store: Arc<dyn session::SessionStore>,
        client: Arc<dyn chain::ChainClient>,
    ) -> AppResult<Self> {
        Ok(Self {
            catalog: catalog::CatalogService::new(catalog::Catalog::seed()),
            chain: chain::ChainGateway::new(client, chain_config.module()?),
            session: session::SessionGate::new(store),
        })
    }

    /// Services backed by the configured session store and the Aptos node
    pub async fn connect(chain_config: &ChainConfig, session_config: &SessionConfig) -> AppResult<Self> {
        let store: Arc<dyn session::SessionStore> = match session_config.backend {
            SessionBackend::Memory => Arc::new(session::MemorySessionStore::new()),
            SessionBackend::Redis => {
                let redis = redis::RedisService::new(&session_config.redis_url).await?;
                tracing::info!("Connected to Redis");
                Arc::new(redis)
            }
        };
        let client = Arc::new(aptos::AptosClient::new(chain_config)?);
        Self::new(chain_config, store, client)
    }
}
