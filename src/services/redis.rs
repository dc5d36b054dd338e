//! Redis-backed wallet session slot

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use crate::{
    error::{AppError, AppResult},
    models::SessionToken,
    services::session::{SessionStore, WALLET_ADDRESS_KEY},
};

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let service = Self { client };
        // Test connection
        service.ping().await?;
        Ok(service)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

/// `wallet_address:<token>`
fn slot_key(token: &SessionToken) -> String {
    format!("{}:{}", WALLET_ADDRESS_KEY, token)
}

#[async_trait]
impl SessionStore for RedisService {
    async fn load(&self, token: &SessionToken) -> AppResult<Option<String>> {
        let mut conn = self.connection().await?;
        let address: Option<String> = conn.get(slot_key(token)).await?;
        Ok(address)
    }

    /// Overwrites the slot; it never expires
    async fn save(&self, token: &SessionToken, address: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(slot_key(token), address).await?;
        Ok(())
    }

    async fn clear(&self, token: &SessionToken) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(slot_key(token)).await?;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}
