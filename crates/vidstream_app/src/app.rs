use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};
use vidstream_api::VideoApi;
use vidstream_catalog::VideoList;
use vidstream_contract::{ClientEvent, Notifier};
use vidstream_player::{MediaElement, VideoPlayer};
use vidstream_transfer::{
    PollConfig, UploadError, UploadReport, UploadSource, VideoUploader, SUCCESS_MESSAGE,
};

use crate::bus::EventBus;

/// Composition root. The uploader talks to the catalog only through the bus.
pub struct VideoApp<M> {
    api: Arc<dyn VideoApi>,
    bus: Arc<EventBus>,
    notifier: Arc<dyn Notifier>,
    list: VideoList<M>,
    uploader: VideoUploader,
    inbox: broadcast::Receiver<ClientEvent>,
}

impl<M: MediaElement> VideoApp<M> {
    pub fn new(api: Arc<dyn VideoApi>, notifier: Arc<dyn Notifier>, media: M) -> Self {
        let bus = Arc::new(EventBus::new());
        let inbox = bus.receiver();
        let player = VideoPlayer::new(api.clone(), notifier.clone(), media);
        let list = VideoList::new(api.clone(), bus.clone(), player);
        let uploader =
            VideoUploader::new(api.clone(), notifier.clone(), bus.clone()).defer_success_alert();
        Self {
            api,
            bus,
            notifier,
            list,
            uploader,
            inbox,
        }
    }

    pub fn with_poll_config(mut self, poll_config: PollConfig) -> Self {
        self.uploader = self.uploader.with_poll_config(poll_config);
        self
    }

    pub fn api(&self) -> &Arc<dyn VideoApi> {
        &self.api
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn list(&self) -> &VideoList<M> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut VideoList<M> {
        &mut self.list
    }

    pub fn uploader(&self) -> &VideoUploader {
        &self.uploader
    }

    pub async fn load_catalog(&mut self) {
        self.list.load_videos().await;
        self.pump().await;
    }

    /// Uploads `source`, then routes whatever the upload published. The
    /// success alert is raised only after the catalog has been refreshed.
    pub async fn upload(
        &mut self,
        source: Option<UploadSource>,
    ) -> Result<UploadReport, UploadError> {
        let result = self.uploader.start_upload(source).await;
        self.pump().await;
        if result.is_ok() {
            self.notifier.alert(SUCCESS_MESSAGE);
        }
        result
    }

    /// Drains queued bus events without waiting. Returns how many were handled.
    pub async fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.inbox.try_recv() {
                Ok(event) => {
                    self.handle_event(event).await;
                    handled += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "event inbox lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return handled,
            }
        }
    }

    /// Consumes `events` until the stream ends.
    pub async fn run_events<S>(&mut self, events: S)
    where
        S: Stream<Item = ClientEvent>,
    {
        futures::pin_mut!(events);
        while let Some(event) = events.next().await {
            self.handle_event(event).await;
        }
    }

    pub async fn handle_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::CatalogRefreshRequested => {
                info!("refreshing catalog");
                self.list.load_videos().await;
            }
            other => debug!(event_type = other.event_type(), "event needs no routing"),
        }
    }
}
