//! Access-grant events over AMQP: the publisher used by the nurse service
//! and the consuming side run by the `access-log` binary.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use lapin::{
    options::{
        BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicRejectOptions,
        ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
    },
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind,
};
use thiserror::Error;
use tokio::{sync::Mutex, time::timeout};

use crate::{config::AmqpConfig, errors::AppError, models::account::AccountSnapshot};

pub const DLX_EXCHANGE: &str = "dlx_exchange";
pub const ACCESS_QUEUE: &str = "nurse_access";
const CONSUMER_TAG: &str = "access-log";

const PERSISTENT: u8 = 2;
const PUBLISH_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(200);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[async_trait]
pub trait AccessGrantPublisher: Send + Sync {
    async fn publish(&self, snapshot: &AccountSnapshot) -> Result<(), AppError>;
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error(transparent)]
    Amqp(#[from] lapin::Error),

    #[error("broker did not answer within {0:?}")]
    TimedOut(Duration),
}

struct Link {
    _conn: Connection,
    channel: Channel,
}

impl Link {
    /// Connects, opens a channel and declares the topology, all under one deadline.
    async fn open(url: &str, limit: Duration) -> Result<Self, LinkError> {
        let handshake = async {
            let conn = Connection::connect(url, ConnectionProperties::default()).await?;
            let channel = conn.create_channel().await?;
            declare_topology(&channel).await?;
            Ok::<_, lapin::Error>(Self {
                _conn: conn,
                channel,
            })
        };
        match timeout(limit, handshake).await {
            Ok(link) => Ok(link?),
            Err(_) => Err(LinkError::TimedOut(limit)),
        }
    }
}

/// Exchange, durable queue and binding. Safe to repeat.
pub async fn declare_topology(channel: &Channel) -> Result<(), lapin::Error> {
    channel
        .exchange_declare(
            DLX_EXCHANGE,
            ExchangeKind::Direct,
            ExchangeDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;
    channel
        .queue_declare(
            ACCESS_QUEUE,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;
    channel
        .queue_bind(
            ACCESS_QUEUE,
            DLX_EXCHANGE,
            "",
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await
}

/// Publishes on one long-lived channel, reopened lazily after a failure.
pub struct AmqpPublisher {
    url: String,
    timeout: Duration,
    link: Mutex<Option<Link>>,
}

impl AmqpPublisher {
    pub fn new(cfg: &AmqpConfig) -> Self {
        Self {
            url: cfg.url.clone(),
            timeout: cfg.timeout,
            link: Mutex::new(None),
        }
    }

    async fn try_publish(&self, payload: &[u8]) -> Result<(), LinkError> {
        let mut guard = self.link.lock().await;

        let link = match guard.take() {
            Some(link) if link.channel.status().connected() => link,
            _ => Link::open(&self.url, self.timeout).await?,
        };

        let confirm = link
            .channel
            .basic_publish(
                "",
                ACCESS_QUEUE,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default()
                    .with_delivery_mode(PERSISTENT)
                    .with_content_type("application/json".into()),
            )
            .await?;
        *guard = Some(link);
        drop(guard);

        confirm.await?;
        Ok(())
    }

    async fn publish_with_retries(&self, payload: &[u8]) -> Result<(), LinkError> {
        let mut backoff = INITIAL_BACKOFF;
        let mut attempt = 1;
        loop {
            match self.try_publish(payload).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < PUBLISH_ATTEMPTS => {
                    tracing::warn!(error = %e, attempt, "publish failed, reconnecting");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl AccessGrantPublisher for AmqpPublisher {
    /// Gives up once `timeout` has elapsed, whatever attempt is in flight.
    async fn publish(&self, snapshot: &AccountSnapshot) -> Result<(), AppError> {
        let payload = serde_json::to_vec(snapshot)
            .map_err(|e| AppError::Internal(format!("failed to encode event: {e}")))?;

        let outcome = match timeout(self.timeout, self.publish_with_retries(&payload)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(LinkError::TimedOut(self.timeout)),
        };
        match outcome {
            Ok(()) => {
                tracing::debug!(user_id = %snapshot.id, "access grant published");
                Ok(())
            }
            Err(e) => Err(AppError::Upstream(format!(
                "failed to publish access grant: {e}"
            ))),
        }
    }
}

pub fn decode_event(body: &[u8]) -> Result<AccountSnapshot, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Consumes access grants forever, reconnecting with exponential backoff.
pub async fn run_access_log(cfg: AmqpConfig) {
    let mut backoff = INITIAL_BACKOFF;
    loop {
        match consume(&cfg, &mut backoff).await {
            Ok(()) => tracing::warn!("consumer stream ended, reconnecting"),
            Err(e) => tracing::error!(error = %e, retry_in = ?backoff, "access log consumer failed"),
        }
        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

async fn consume(cfg: &AmqpConfig, backoff: &mut Duration) -> Result<(), LinkError> {
    let link = Link::open(&cfg.url, cfg.timeout).await?;
    let mut consumer = link
        .channel
        .basic_consume(
            ACCESS_QUEUE,
            CONSUMER_TAG,
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;

    *backoff = INITIAL_BACKOFF;
    tracing::info!(queue = ACCESS_QUEUE, "waiting for access grants");

    loop {
        let delivery = match timeout(cfg.idle_tick, consumer.next()).await {
            Err(_) => {
                tracing::info!(queue = ACCESS_QUEUE, "no new access grants");
                continue;
            }
            Ok(None) => return Ok(()),
            Ok(Some(delivery)) => delivery?,
        };

        match decode_event(&delivery.data) {
            Ok(snapshot) => {
                tracing::info!(
                    user_id = %snapshot.id,
                    nip = %snapshot.nip,
                    name = %snapshot.name,
                    role = %snapshot.role,
                    access = snapshot.access,
                    "access granted"
                );
                delivery.ack(BasicAckOptions::default()).await?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "malformed access grant, rejecting");
                delivery
                    .reject(BasicRejectOptions { requeue: false })
                    .await?;
            }
        }
    }
}
