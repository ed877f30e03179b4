use serde::Serialize;
use vidstream_contract::{Video, VideoStatus};

pub const LOAD_ERROR_MESSAGE: &str = "Failed to load videos";
pub const EMPTY_MESSAGE: &str = "No videos available";

pub fn status_label(status: &VideoStatus) -> &str {
    match status {
        VideoStatus::Ready => "Ready",
        VideoStatus::Processing => "Processing",
        VideoStatus::Error => "Error",
        VideoStatus::Pending => "Pending",
        VideoStatus::Other(raw) => raw,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoCard {
    pub video: Video,
    pub status_label: String,
    pub badge: BadgeTone,
    pub clickable: bool,
    pub dimmed: bool,
    pub overlay: Option<String>,
    pub tooltip: Option<String>,
    pub date_label: Option<String>,
}

impl VideoCard {
    pub fn from_video(video: Video) -> Self {
        let label = status_label(&video.status).to_string();
        let ready = video.status.is_ready();
        let badge = match video.status {
            VideoStatus::Ready => BadgeTone::Success,
            VideoStatus::Processing => BadgeTone::Warning,
            _ => BadgeTone::Danger,
        };

        Self {
            status_label: label.clone(),
            badge,
            clickable: ready,
            dimmed: !ready,
            overlay: (!ready).then(|| label.clone()),
            tooltip: (!ready).then(|| format!("Video status: {}", video.status)),
            date_label: video
                .created_at
                .map(|created| created.format("%Y-%m-%d").to_string()),
            video,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "body", rename_all = "snake_case")]
pub enum CatalogView {
    #[default]
    Loading,
    Empty,
    Error(String),
    Cards(Vec<VideoCard>),
}

impl CatalogView {
    pub fn render(videos: Vec<Video>) -> Self {
        if videos.is_empty() {
            return Self::Empty;
        }
        Self::Cards(videos.into_iter().map(VideoCard::from_video).collect())
    }

    pub fn cards(&self) -> &[VideoCard] {
        match self {
            Self::Cards(cards) => cards,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use vidstream_contract::{Video, VideoStatus};

    use super::{status_label, BadgeTone, CatalogView};

    #[test]
    fn labels_known_statuses_and_passes_unknown_through() {
        assert_eq!(status_label(&VideoStatus::Ready), "Ready");
        assert_eq!(status_label(&VideoStatus::Processing), "Processing");
        assert_eq!(status_label(&VideoStatus::Error), "Error");
        assert_eq!(status_label(&VideoStatus::Pending), "Pending");
        assert_eq!(status_label(&VideoStatus::from("failed")), "failed");
    }

    #[test]
    fn only_ready_cards_are_clickable() {
        let view = CatalogView::render(vec![
            Video::new("a", "ready one", VideoStatus::Ready)
                .with_created_at(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            Video::new("b", "busy one", VideoStatus::Processing),
        ]);

        let cards = view.cards();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards.iter().filter(|card| card.clickable).count(), 1);

        let ready = &cards[0];
        assert!(ready.clickable && !ready.dimmed);
        assert!(ready.overlay.is_none());
        assert_eq!(ready.badge, BadgeTone::Success);
        assert_eq!(ready.date_label.as_deref(), Some("2024-05-01"));

        let busy = &cards[1];
        assert!(!busy.clickable && busy.dimmed);
        assert_eq!(busy.overlay.as_deref(), Some("Processing"));
        assert_eq!(busy.tooltip.as_deref(), Some("Video status: processing"));
        assert_eq!(busy.badge, BadgeTone::Warning);
    }

    #[test]
    fn empty_catalog_renders_placeholder() {
        assert_eq!(CatalogView::render(Vec::new()), CatalogView::Empty);
    }
}
