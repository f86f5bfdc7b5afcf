use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use services::services::{
    auth::AuthVerifier,
    config::{Config, ConfigError},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Everything a request handler needs from the running process.
#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    fn config(&self) -> &Arc<Config>;

    fn db(&self) -> &DBService;

    fn auth(&self) -> &AuthVerifier;

    /// Liveness plus a round trip to the database.
    async fn health_check(&self) -> Result<(), DeploymentError> {
        self.db().ping().await?;
        Ok(())
    }
}
