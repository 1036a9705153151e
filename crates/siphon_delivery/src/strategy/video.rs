//! Single video, optionally split into parts.

use super::Strategy;
use crate::dispatch::{Dispatcher, Job};
use siphon_core::{Delivered, MediaKind, MediaLocation, MediaRef};
use siphon_error::SiphonResult;
use siphon_interface::OutgoingMedia;

pub(crate) struct VideoStrategy;

impl Strategy for VideoStrategy {
    async fn deliver(&self, dispatcher: &Dispatcher, job: &mut Job<'_>) -> SiphonResult<Delivered> {
        let Some(media) = job.media().into_iter().next() else {
            return dispatcher.send_text(job).await;
        };

        match self.send_video(dispatcher, job, &media).await {
            Ok(delivered) => return Ok(delivered),
            Err(e) => tracing::warn!(error = %e, "Video upload failed, trying thumbnail"),
        }

        if let Some(thumbnail) = media.thumbnail() {
            let buttons = dispatcher.buttons(job);
            match dispatcher
                .transport
                .send_photo(
                    job.target,
                    &MediaLocation::Remote(thumbnail.clone()),
                    &dispatcher.caption(job),
                    buttons.as_ref(),
                )
                .await
            {
                Ok(message) => return Ok(Delivered::Message(message)),
                Err(e) => tracing::warn!(error = %e, "Thumbnail upload failed, sending text"),
            }
        }

        dispatcher.send_text(job).await
    }
}

impl VideoStrategy {
    async fn send_video(
        &self,
        dispatcher: &Dispatcher,
        job: &Job<'_>,
        media: &MediaRef,
    ) -> SiphonResult<Delivered> {
        let parts = self.split(dispatcher, media).await?;
        if parts.len() > 1 {
            tracing::info!(parts = parts.len(), "Sending split video");
            return super::groups_then_text(dispatcher, job, &parts).await;
        }

        let video = OutgoingMedia::from_media(media).with_caption(dispatcher.caption(job));
        let buttons = dispatcher.buttons(job);
        let message = dispatcher
            .transport
            .send_video(job.target, &video, buttons.as_ref())
            .await?;
        Ok(Delivered::Message(message))
    }

    /// Parts to send; a single element when no split is needed.
    async fn split(&self, dispatcher: &Dispatcher, media: &MediaRef) -> SiphonResult<Vec<MediaRef>> {
        let limit = *dispatcher.config.video_split_bytes();
        let Some(path) = media.path() else {
            return Ok(vec![media.clone()]);
        };
        let size = tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0);
        if size <= limit {
            return Ok(vec![media.clone()]);
        }

        tracing::debug!(size, limit, "Splitting oversized video");
        let parts = dispatcher.splitter.split(path, limit).await?;
        Ok(parts
            .into_iter()
            .map(|part| MediaRef::local(MediaKind::Video, part))
            .collect())
    }
}
