use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentError};
use services::services::{auth::AuthVerifier, config::Config};
use tracing::info;

#[derive(Clone)]
pub struct LocalDeployment {
    config: Arc<Config>,
    db: DBService,
    auth: AuthVerifier,
}

impl LocalDeployment {
    pub async fn from_config(config: Config) -> Result<Self, DeploymentError> {
        let db = DBService::new(&config.database_url).await?;
        let deployment = Self::with_db(config, db);
        info!(
            bind_address = %deployment.config.bind_address(),
            "Local deployment initialised"
        );
        Ok(deployment)
    }

    /// Assemble a deployment around an already opened database.
    pub fn with_db(config: Config, db: DBService) -> Self {
        let auth = AuthVerifier::new(&config.auth);
        Self {
            config: Arc::new(config),
            db,
            auth,
        }
    }
}

#[async_trait]
impl Deployment for LocalDeployment {
    fn config(&self) -> &Arc<Config> {
        &self.config
    }

    fn db(&self) -> &DBService {
        &self.db
    }

    fn auth(&self) -> &AuthVerifier {
        &self.auth
    }
}
