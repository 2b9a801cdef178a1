use log::{info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::FocusResult;
use crate::random::SharedRng;

use super::device::CaptureDevice;
use super::loop_worker::attention_loop;
use super::walk::{AttentionSample, AttentionWalk};

/// Starts and stops the periodic attention loop. Keeps no history; the
/// observer channel receives each sample exactly once.
pub struct AttentionController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl AttentionController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start(
        &mut self,
        device: &dyn CaptureDevice,
        walk: AttentionWalk,
        rng: SharedRng,
        interval: Duration,
        observer: mpsc::Sender<AttentionSample>,
    ) -> FocusResult<()> {
        if self.handle.is_some() {
            warn!("attention source already active, ignoring start");
            return Ok(());
        }

        if let Err(err) = device.acquire() {
            warn!("{} unavailable: {err}", device.name());
            return Err(err);
        }

        info!("Starting attention source on {}", device.name());
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(attention_loop(
            walk,
            rng,
            interval,
            observer,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                warn!("attention loop task failed to join: {err}");
            }
        }
    }
}

impl Default for AttentionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FocusError;
    use crate::sensing::device::VirtualCamera;

    fn walk() -> AttentionWalk {
        AttentionWalk::new(100.0, -3.0, 7.0)
    }

    #[tokio::test(start_paused = true)]
    async fn emits_every_interval_until_stopped() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut controller = AttentionController::new();
        controller
            .start(
                &VirtualCamera::available(),
                walk(),
                SharedRng::seeded(1),
                Duration::from_secs(2),
                tx,
            )
            .unwrap();

        tokio::time::sleep(Duration::from_millis(6_500)).await;
        let mut received = Vec::new();
        while let Ok(sample) = rx.try_recv() {
            received.push(sample);
        }
        assert_eq!(received.len(), 3);
        assert!(received.iter().all(|s| (0.0..=100.0).contains(&s.value)));

        controller.stop().await;
        assert!(!controller.is_active());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn denied_device_never_starts_and_can_retry() {
        let camera = VirtualCamera::denied();
        let mut controller = AttentionController::new();
        let (tx, _rx) = mpsc::channel(4);

        let err = controller
            .start(&camera, walk(), SharedRng::seeded(1), Duration::from_secs(2), tx.clone())
            .unwrap_err();
        assert!(matches!(err, FocusError::CaptureUnavailable(_)));
        assert!(!controller.is_active());

        camera.set_available(true);
        controller
            .start(&camera, walk(), SharedRng::seeded(1), Duration::from_secs(2), tx)
            .unwrap();
        assert!(controller.is_active());
        controller.stop().await;
    }
}
