use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::random::SharedRng;

use super::walk::{AttentionSample, AttentionWalk};

/// Emits one sample per `interval` until cancelled or the observer hangs up.
/// The first sample arrives one full interval after start. A full observer
/// queue drops the sample rather than stalling the loop.
pub async fn attention_loop(
    mut walk: AttentionWalk,
    rng: SharedRng,
    interval: Duration,
    observer: mpsc::Sender<AttentionSample>,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                info!("attention loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                let sample = AttentionSample {
                    value: walk.step(&rng),
                    taken_at: Utc::now(),
                };
                debug!("attention sample {:.1}", sample.value);
                match observer.try_send(sample) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        warn!("attention observer lagging, dropped sample {:.1}", sample.value);
                    }
                    Err(TrySendError::Closed(_)) => {
                        info!("attention observer dropped, stopping loop");
                        break;
                    }
                }
            }
        }
    }
}
