//! Background eviction of peers that stopped signaling liveness.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::manager::SignalingManager;

/// Spawn the reaper. It runs until the returned handle is aborted and
/// outlives every individual connection.
pub fn spawn_reaper(manager: SignalingManager, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            reap_once(&manager).await;
        }
    })
}

/// One reaper pass. A pass that panics is logged and the loop carries on
/// with the next tick.
pub async fn reap_once(manager: &SignalingManager) {
    let pass_manager = manager.clone();
    match tokio::spawn(async move { pass_manager.reap_stale().await }).await {
        Ok(evicted) if !evicted.is_empty() => {
            tracing::info!(evicted = evicted.len(), "Reaped stale peers");
        }
        Ok(_) => {}
        Err(e) => {
            tracing::error!(error = %e, "Reaper pass failed");
        }
    }

    let rooms = manager.room_count().await;
    let peers = manager.total_peers().await;
    tracing::debug!(rooms, peers, "Reaper tick");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::ManagerConfig;
    use crate::outbound;

    #[tokio::test(start_paused = true)]
    async fn reaper_evicts_silent_peer_on_schedule() {
        let mgr = SignalingManager::new(ManagerConfig::default());
        let (link, mailbox) = outbound::channel(16);
        mgr.join_room("r1", link, "Alice").await.unwrap();

        let handle = spawn_reaper(mgr.clone(), Duration::from_secs(60));

        // First ticks at 60s and 120s see a peer that is not yet stale.
        tokio::time::sleep(Duration::from_secs(125)).await;
        assert_eq!(mgr.room_count().await, 1);

        // The 180s tick finds it 180s silent.
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(mgr.room_count().await, 0);
        mailbox.closed().await;

        handle.abort();
    }

    #[tokio::test]
    async fn reap_once_on_empty_manager_is_quiet() {
        let mgr = SignalingManager::new(ManagerConfig::default());
        reap_once(&mgr).await;
        assert_eq!(mgr.room_count().await, 0);
    }
}
