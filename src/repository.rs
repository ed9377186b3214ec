use std::future::Future;

use anyhow::{Context as _, Result};
use sqlx::{PgPool, postgres::PgListener};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::{
    db,
    sensor::{Device, Reading},
    session::Session,
};

const SUBSCRIPTION_BUFFER: usize = 64;

/// Newly inserted readings, in notification order.
pub type ReadingStream = ReceiverStream<Result<Reading>>;

pub trait ReadingRepository {
    /// The latest readings, most recent first, optionally for one device.
    fn fetch_readings(
        &self,
        device_id: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Reading>>> + Send;

    fn subscribe_readings(&self) -> impl Future<Output = Result<ReadingStream>> + Send;

    fn fetch_devices(&self, session: &Session) -> impl Future<Output = Result<Vec<Device>>> + Send;
}

#[derive(Debug, Clone)]
pub struct PgReadingRepository {
    pool: PgPool,
}

impl PgReadingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ReadingRepository for PgReadingRepository {
    async fn fetch_readings(&self, device_id: Option<&str>) -> Result<Vec<Reading>> {
        db::fetch_readings(&self.pool, device_id).await
    }

    async fn subscribe_readings(&self) -> Result<ReadingStream> {
        let mut listener = PgListener::connect_with(&self.pool)
            .await
            .context("failed to connect listener")?;
        listener
            .listen(db::READING_INSERTED_CHANNEL)
            .await
            .with_context(|| format!("failed to listen on {}", db::READING_INSERTED_CHANNEL))?;

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let pool = self.pool.clone();

        tokio::spawn(async move {
            loop {
                let notification = match listener.recv().await {
                    Ok(n) => n,
                    Err(err) => {
                        let err = anyhow::Error::new(err).context("failed to receive notification");
                        if tx.send(Err(err)).await.is_err() {
                            break;
                        }
                        continue;
                    }
                };

                let payload = notification.payload();
                let id = match Uuid::parse_str(payload) {
                    Ok(id) => id,
                    Err(err) => {
                        tracing::warn!(payload, "ignoring notification with invalid id: {err}");
                        continue;
                    }
                };

                let reading = match db::fetch_reading(&pool, id).await {
                    Ok(Some(r)) => r,
                    Ok(None) => {
                        tracing::warn!(%id, "notified reading no longer exists");
                        continue;
                    }
                    Err(err) => {
                        tracing::warn!(%id, "skipping notified reading: {err:#}");
                        continue;
                    }
                };

                if tx.send(Ok(reading)).await.is_err() {
                    tracing::debug!("reading subscriber dropped, stopping listener");
                    break;
                }
            }
        });

        Ok(ReceiverStream::new(rx))
    }

    async fn fetch_devices(&self, session: &Session) -> Result<Vec<Device>> {
        db::fetch_devices(&self.pool, session.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>(_: &T) {}

    // Compiles only while every repository future can cross threads.
    #[allow(dead_code)]
    fn repository_futures_are_send(repository: &PgReadingRepository, session: &Session) {
        assert_send(&repository.fetch_readings(None));
        assert_send(&repository.subscribe_readings());
        assert_send(&repository.fetch_devices(session));
    }

    #[test]
    fn repository_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<PgReadingRepository>();
    }
}
