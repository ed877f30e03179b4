use std::sync::Arc;

use tracing::{error, info, warn};
use vidstream_api::VideoApi;
use vidstream_contract::{ClientEvent, EventSink, Video};
use vidstream_player::{MediaElement, VideoPlayer};

use crate::view::{CatalogView, LOAD_ERROR_MESSAGE};

/// Catalog region. Owns the player that ready cards dispatch to.
pub struct VideoList<M> {
    api: Arc<dyn VideoApi>,
    events: Arc<dyn EventSink>,
    player: VideoPlayer<M>,
    view: CatalogView,
}

impl<M: MediaElement> VideoList<M> {
    pub fn new(api: Arc<dyn VideoApi>, events: Arc<dyn EventSink>, player: VideoPlayer<M>) -> Self {
        Self {
            api,
            events,
            player,
            view: CatalogView::Loading,
        }
    }

    pub fn view(&self) -> &CatalogView {
        &self.view
    }

    pub fn player(&self) -> &VideoPlayer<M> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut VideoPlayer<M> {
        &mut self.player
    }

    pub async fn load_videos(&mut self) -> &CatalogView {
        info!("loading videos");
        self.view = match self.api.list_videos().await {
            Ok(videos) => {
                for video in &videos {
                    info!(video_id = %video.id, status = %video.status, "catalog entry");
                }
                self.events.publish(ClientEvent::CatalogLoaded {
                    count: videos.len(),
                });
                CatalogView::render(videos)
            }
            Err(err) => {
                error!(error = %err, "failed to load videos");
                CatalogView::Error(LOAD_ERROR_MESSAGE.to_string())
            }
        };
        &self.view
    }

    /// Click on the card at `index`. Non-clickable cards ignore it.
    pub async fn click(&mut self, index: usize) -> bool {
        let video = match self.view.cards().get(index) {
            Some(card) if card.clickable => card.video.clone(),
            Some(card) => {
                info!(video_id = %card.video.id, "card is not clickable");
                return false;
            }
            None => return false,
        };
        self.play_video(&video).await
    }

    /// Hands a ready video to the player and brings the playback region into
    /// view. Returns false when the video was rejected up front.
    pub async fn play_video(&mut self, video: &Video) -> bool {
        if video.id.trim().is_empty() {
            error!(title = %video.title, "invalid video object");
            return false;
        }
        if !video.status.is_ready() {
            error!(video_id = %video.id, status = %video.status, "video is not ready");
            return false;
        }

        info!(video_id = %video.id, "playing video");
        if let Err(err) = self.player.load_video(&video.id).await {
            warn!(video_id = %video.id, error = %err, "player rejected video");
        }
        self.events.publish(ClientEvent::PlaybackRegionFocused {
            video_id: video.id.clone(),
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use vidstream_api::{ApiCall, InMemoryVideoApi};
    use vidstream_contract::{endpoints, ClientEvent, EventSink, Notifier, Video, VideoStatus};
    use vidstream_player::{HeadlessMedia, MediaElement, VideoPlayer};

    use super::VideoList;
    use crate::view::{CatalogView, LOAD_ERROR_MESSAGE};

    #[derive(Default)]
    struct Recorder {
        alerts: Mutex<Vec<String>>,
        events: Mutex<Vec<ClientEvent>>,
    }

    impl Notifier for Recorder {
        fn alert(&self, message: &str) {
            self.alerts.lock().unwrap().push(message.to_string());
        }
    }

    impl EventSink for Recorder {
        fn publish(&self, event: ClientEvent) -> usize {
            self.events.lock().unwrap().push(event);
            1
        }
    }

    fn list_for(
        api: InMemoryVideoApi,
    ) -> (VideoList<HeadlessMedia>, Arc<InMemoryVideoApi>, Arc<Recorder>) {
        let api = Arc::new(api);
        let recorder = Arc::new(Recorder::default());
        let player = VideoPlayer::new(api.clone(), recorder.clone(), HeadlessMedia::new());
        (
            VideoList::new(api.clone(), recorder.clone(), player),
            api,
            recorder,
        )
    }

    fn catalog() -> InMemoryVideoApi {
        InMemoryVideoApi::new()
            .with_video(
                Video::new("ready-1", "Ready one", VideoStatus::Ready).with_qualities(["720p"]),
            )
            .with_video(Video::new("busy-1", "Busy one", VideoStatus::Processing))
    }

    #[tokio::test]
    async fn renders_one_clickable_and_one_overlayed_card() {
        let (mut list, _, _) = list_for(catalog());

        let view = list.load_videos().await;
        let cards = view.cards();
        assert_eq!(cards.len(), 2);

        let clickable: Vec<_> = cards.iter().filter(|card| card.clickable).collect();
        assert_eq!(clickable.len(), 1);
        assert_eq!(clickable[0].video.id, "ready-1");

        let overlayed: Vec<_> = cards.iter().filter(|card| card.overlay.is_some()).collect();
        assert_eq!(overlayed.len(), 1);
        assert_eq!(overlayed[0].overlay.as_deref(), Some("Processing"));
        assert!(!overlayed[0].clickable);
    }

    #[tokio::test]
    async fn failed_fetch_renders_error_state() {
        let (mut list, _, _) =
            list_for(InMemoryVideoApi::new().with_failing_endpoint(endpoints::VIDEOS));

        let view = list.load_videos().await;
        assert_eq!(view, &CatalogView::Error(LOAD_ERROR_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn clicking_ready_card_plays_and_focuses_player() {
        let (mut list, _, recorder) = list_for(catalog());
        list.load_videos().await;

        assert!(list.click(0).await);
        assert!(list
            .player()
            .media()
            .source()
            .is_some_and(|src| src.contains("/api/videos/ready-1/stream?quality=720p")));
        assert!(recorder
            .events
            .lock()
            .unwrap()
            .contains(&ClientEvent::PlaybackRegionFocused {
                video_id: "ready-1".to_string()
            }));
    }

    #[tokio::test]
    async fn clicking_non_ready_card_does_nothing() {
        let (mut list, api, _) = list_for(catalog());
        list.load_videos().await;

        assert!(!list.click(1).await);
        assert!(!list.click(7).await);
        assert!(list.player().media().source().is_none());
        assert_eq!(api.calls().await, vec![ApiCall::ListVideos]);
    }

    #[tokio::test]
    async fn play_guards_reject_bad_input() {
        let (mut list, api, _) = list_for(catalog());

        let nameless = Video::new("", "no id", VideoStatus::Ready);
        assert!(!list.play_video(&nameless).await);

        let pending = Video::new("busy-1", "Busy one", VideoStatus::Pending);
        assert!(!list.play_video(&pending).await);
        assert!(api.calls().await.is_empty());
    }
}
