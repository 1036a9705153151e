//! Bounded-concurrency image relay with retries.

use crate::DeliveryConfig;
use futures_util::future::join_all;
use siphon_core::MediaRef;
use siphon_interface::ImageRelay;
use tokio::sync::Semaphore;
use tokio_retry2::strategy::FixedInterval;
use tokio_retry2::{Retry, RetryError};

/// Upload every local image, keeping the order of the successes.
///
/// At most `relay_concurrency` uploads run at once; each is attempted
/// `relay_attempts` times. Failed and non-local images are left out.
pub(crate) async fn relay_images(
    relay: &dyn ImageRelay,
    items: &[MediaRef],
    config: &DeliveryConfig,
) -> Vec<String> {
    let limiter = Semaphore::new((*config.relay_concurrency()).max(1));
    let retries = config.relay_attempts().saturating_sub(1);
    let delay = config.relay_retry_delay_ms();

    let uploads = items.iter().enumerate().map(|(index, media)| {
        let limiter = &limiter;
        async move {
            let Some(path) = media.path() else {
                tracing::debug!(index, "Skipping image without local file");
                return None;
            };
            let Ok(_permit) = limiter.acquire().await else {
                return None;
            };

            let strategy = FixedInterval::from_millis(*delay).take(retries);
            let uploaded = Retry::spawn(strategy, || async {
                relay.relay(path).await.map_err(|e| {
                    tracing::warn!(index, error = %e, "Image relay attempt failed");
                    RetryError::Transient {
                        err: e,
                        retry_after: None,
                    }
                })
            })
            .await;

            match uploaded {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Dropping image after failed relay");
                    None
                }
            }
        }
    });

    join_all(uploads).await.into_iter().flatten().collect()
}
