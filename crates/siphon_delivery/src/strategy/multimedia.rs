//! Mixed media: per-kind sends, animations kept out of albums.

use super::Strategy;
use crate::dispatch::{Dispatcher, Job};
use siphon_core::{Delivered, MediaKind, MediaRef};
use siphon_error::SiphonResult;
use siphon_interface::OutgoingMedia;

pub(crate) struct MultimediaStrategy;

impl Strategy for MultimediaStrategy {
    async fn deliver(&self, dispatcher: &Dispatcher, job: &mut Job<'_>) -> SiphonResult<Delivered> {
        let items = job.media();
        let sent = match items.as_slice() {
            [] => return dispatcher.send_text(job).await,
            [single] => self.single(dispatcher, job, single).await,
            _ => self.mixed(dispatcher, job, &items).await,
        };
        match sent {
            Ok(delivered) => Ok(delivered),
            Err(e) => {
                tracing::warn!(error = %e, "Media upload failed, sending text");
                dispatcher.send_text(job).await
            }
        }
    }
}

impl MultimediaStrategy {
    async fn single(&self, dispatcher: &Dispatcher, job: &Job<'_>, media: &MediaRef) -> SiphonResult<Delivered> {
        let caption = dispatcher.caption(job);
        let buttons = dispatcher.buttons(job);
        let transport = &dispatcher.transport;
        let message = match media.kind() {
            MediaKind::Image => {
                transport
                    .send_photo(job.target, media.location(), &caption, buttons.as_ref())
                    .await?
            }
            MediaKind::Video => {
                let video = OutgoingMedia::from_media(media).with_caption(caption);
                transport.send_video(job.target, &video, buttons.as_ref()).await?
            }
            MediaKind::Animation => {
                let animation = OutgoingMedia::from_media(media).with_caption(caption);
                transport
                    .send_animation(job.target, &animation, buttons.as_ref())
                    .await?
            }
        };
        Ok(Delivered::Message(message))
    }

    async fn mixed(&self, dispatcher: &Dispatcher, job: &Job<'_>, items: &[MediaRef]) -> SiphonResult<Delivered> {
        let count = items.len();
        let mut sent = Vec::new();

        for (index, media) in items.iter().enumerate() {
            if *media.kind() != MediaKind::Animation {
                continue;
            }
            let animation =
                OutgoingMedia::from_media(media).with_caption(format!("{}/{}", index + 1, count));
            let message = dispatcher
                .transport
                .send_animation(job.target, &animation, None)
                .await?;
            sent.push(Delivered::Message(message));
        }

        let grouped: Vec<MediaRef> = items
            .iter()
            .filter(|m| *m.kind() != MediaKind::Animation)
            .cloned()
            .collect();
        match super::groups_then_text(dispatcher, job, &grouped).await? {
            Delivered::Batch(rest) => sent.extend(rest),
            other => sent.push(other),
        }
        Ok(Delivered::Batch(sent))
    }
}
