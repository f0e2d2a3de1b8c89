use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{Audience, Envelope, NotificationEvent, NotificationPort};

/// In-process transport backed by a broadcast channel. SSE subscribers
/// receive every envelope and filter by audience themselves.
pub struct BroadcastHub {
    tx: broadcast::Sender<Envelope>,
}

impl BroadcastHub {
    pub fn new(tx: broadcast::Sender<Envelope>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl NotificationPort for BroadcastHub {
    async fn notify_providers(&self, event: NotificationEvent) -> anyhow::Result<()> {
        // Ignore send errors; no subscribers just means nobody is listening
        let _ = self.tx.send(Envelope {
            audience: Audience::Providers,
            event,
        });
        Ok(())
    }

    async fn notify_user(&self, user_id: &str, event: NotificationEvent) -> anyhow::Result<()> {
        let _ = self.tx.send(Envelope {
            audience: Audience::User(user_id.to_string()),
            event,
        });
        Ok(())
    }
}
