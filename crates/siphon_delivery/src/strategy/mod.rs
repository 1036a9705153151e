//! One delivery strategy per content shape.

mod image;
mod multimedia;
mod video;

pub(crate) use image::ImageStrategy;
pub(crate) use multimedia::MultimediaStrategy;
pub(crate) use video::VideoStrategy;

use crate::dispatch::{Dispatcher, Job};
use siphon_core::{Delivered, MediaRef};
use siphon_error::SiphonResult;
use siphon_interface::OutgoingMedia;

/// Delivery for a single content shape.
pub(crate) trait Strategy {
    async fn deliver(&self, dispatcher: &Dispatcher, job: &mut Job<'_>) -> SiphonResult<Delivered>;
}

/// Send `items` as albums of at most `batch_size`.
pub(crate) async fn send_groups(
    dispatcher: &Dispatcher,
    job: &Job<'_>,
    items: &[MediaRef],
) -> SiphonResult<Vec<Delivered>> {
    let batch_size = (*dispatcher.config.batch_size()).max(1);
    let mut sent = Vec::new();
    for chunk in items.chunks(batch_size) {
        let group: Vec<OutgoingMedia> = chunk.iter().map(OutgoingMedia::from_media).collect();
        let messages = dispatcher
            .transport
            .send_media_group(job.target, &group)
            .await?;
        sent.push(Delivered::Group(messages));
    }
    Ok(sent)
}

/// Albums followed by the content text.
pub(crate) async fn groups_then_text(
    dispatcher: &Dispatcher,
    job: &Job<'_>,
    items: &[MediaRef],
) -> SiphonResult<Delivered> {
    let mut sent = send_groups(dispatcher, job, items).await?;
    let buttons = dispatcher.buttons(job);
    let text = dispatcher
        .transport
        .send_text(job.target, &dispatcher.caption(job), buttons.as_ref())
        .await?;
    sent.push(Delivered::Caption(text));
    Ok(Delivered::Batch(sent))
}
