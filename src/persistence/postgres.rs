// ABOUTME: PostgreSQL implementation of the persistence gateway
// ABOUTME: Updates the asset row with the model URL and its workflow status

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::Client;
use tracing::{error, info};
use uuid::Uuid;

use super::PersistenceGateway;

const UPDATE_ASSET_MODEL: &str =
    "UPDATE ip_assets SET three_d_model_url = $1, status = $2 WHERE id = $3";

pub struct PostgresGateway {
    client: Client,
    status_marker: String,
}

impl PostgresGateway {
    /// Connects over TLS and drives the connection on a background task.
    pub async fn connect(connection_string: &str, status_marker: impl Into<String>) -> Result<Self> {
        let connector = TlsConnector::builder()
            .build()
            .context("Failed to build TLS connector")?;
        let tls = MakeTlsConnector::new(connector);

        let (client, connection) = tokio_postgres::connect(connection_string, tls)
            .await
            .context("Failed to connect to the asset database")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("Asset database connection error: {}", e);
            }
        });

        Ok(Self::from_client(client, status_marker))
    }

    pub fn from_client(client: Client, status_marker: impl Into<String>) -> Self {
        Self {
            client,
            status_marker: status_marker.into(),
        }
    }
}

#[async_trait]
impl PersistenceGateway for PostgresGateway {
    async fn update(&self, owner_id: Uuid, result_url: &str) -> Result<()> {
        let rows = self
            .client
            .execute(
                UPDATE_ASSET_MODEL,
                &[&result_url, &self.status_marker, &owner_id],
            )
            .await
            .with_context(|| format!("Failed to update asset {}", owner_id))?;

        if rows == 0 {
            bail!("Asset {} does not exist", owner_id);
        }

        info!(
            "Asset {} now points at {} ({})",
            owner_id, result_url, self.status_marker
        );
        Ok(())
    }
}
