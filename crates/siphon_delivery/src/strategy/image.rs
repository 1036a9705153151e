//! Image sets: photo, album or relayed article.

use super::Strategy;
use crate::dispatch::{Dispatcher, Job, RELAY_FAILED_TEXT};
use crate::relay::relay_images;
use siphon_core::{Delivered, MediaRef};
use siphon_error::SiphonResult;

pub(crate) struct ImageStrategy;

impl Strategy for ImageStrategy {
    async fn deliver(&self, dispatcher: &Dispatcher, job: &mut Job<'_>) -> SiphonResult<Delivered> {
        if let Some(article) = job.entry.parse.article().clone() {
            return self.publish_article(dispatcher, job, &article).await;
        }

        let items = job.media();
        let album_limit = *dispatcher.config.batch_size();
        match items.len() {
            0 => dispatcher.send_text(job).await,
            1 => self.photo(dispatcher, job, &items[0]).await,
            n if n < album_limit => self.album(dispatcher, job, &items).await,
            _ => self.relay(dispatcher, job, &items).await,
        }
    }
}

impl ImageStrategy {
    async fn photo(&self, dispatcher: &Dispatcher, job: &Job<'_>, media: &MediaRef) -> SiphonResult<Delivered> {
        let buttons = dispatcher.buttons(job);
        match dispatcher
            .transport
            .send_photo(job.target, media.location(), &dispatcher.caption(job), buttons.as_ref())
            .await
        {
            Ok(message) => Ok(Delivered::Message(message)),
            Err(e) => {
                tracing::warn!(error = %e, "Photo upload failed, sending text");
                dispatcher.send_text(job).await
            }
        }
    }

    async fn album(&self, dispatcher: &Dispatcher, job: &Job<'_>, items: &[MediaRef]) -> SiphonResult<Delivered> {
        match super::groups_then_text(dispatcher, job, items).await {
            Ok(delivered) => Ok(delivered),
            Err(e) => {
                tracing::warn!(error = %e, "Album upload failed, sending text");
                dispatcher.send_text(job).await
            }
        }
    }

    async fn relay(&self, dispatcher: &Dispatcher, job: &mut Job<'_>, items: &[MediaRef]) -> SiphonResult<Delivered> {
        let (Some(relay), Some(publisher)) = (&dispatcher.relay, &dispatcher.publisher) else {
            tracing::debug!("No image relay configured, sending albums");
            return self.album(dispatcher, job, items).await;
        };

        let urls = relay_images(relay.as_ref(), items, dispatcher.config()).await;
        if urls.is_empty() {
            tracing::warn!(items = items.len(), "Every image relay failed");
            return dispatcher.send_plain(job, RELAY_FAILED_TEXT).await;
        }

        let images: String = urls.iter().map(|url| format!("<img src=\"{url}\">")).collect();
        let html = format!("{}<br><br>{}", job.entry.parse.description(), images);
        match publisher.publish(&page_title(job), &html).await {
            Ok(page) => {
                tracing::info!(page = %page, images = urls.len(), "Published image article");
                job.entry.article_url = Some(page);
            }
            Err(e) => tracing::warn!(error = %e, "Article publish failed, sending text"),
        }
        dispatcher.send_text(job).await
    }

    async fn publish_article(&self, dispatcher: &Dispatcher, job: &mut Job<'_>, article: &str) -> SiphonResult<Delivered> {
        if job.entry.article_url.is_none() {
            match &dispatcher.publisher {
                Some(publisher) => match publisher.publish(&page_title(job), article).await {
                    Ok(page) => job.entry.article_url = Some(page),
                    Err(e) => tracing::warn!(error = %e, "Article publish failed, sending text"),
                },
                None => tracing::debug!("No publisher configured for article"),
            }
        }
        dispatcher.send_text(job).await
    }
}

fn page_title(job: &Job<'_>) -> String {
    let title = job.entry.parse.title();
    if title.is_empty() {
        "Untitled".to_string()
    } else {
        title.clone()
    }
}
