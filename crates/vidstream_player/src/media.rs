use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("play() rejected: {0}")]
pub struct PlayRejected(pub String);

/// The single media element a player drives.
pub trait MediaElement: Send {
    fn source(&self) -> Option<&str>;
    fn set_source(&mut self, url: &str);
    fn load(&mut self);
    fn play(&mut self) -> Result<(), PlayRejected>;
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
}

/// Media element without a renderer: remembers what it was told so the CLI
/// can report it and tests can assert on it.
#[derive(Debug, Clone, Default)]
pub struct HeadlessMedia {
    source: Option<String>,
    history: Vec<String>,
    loads: u32,
    playing: bool,
    position: f64,
    reject_play: Option<String>,
}

impl HeadlessMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `play()` fail, like an autoplay policy would.
    pub fn rejecting_play(mut self, reason: impl Into<String>) -> Self {
        self.reject_play = Some(reason.into());
        self
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn loads(&self) -> u32 {
        self.loads
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Simulates playback progress.
    pub fn advance(&mut self, seconds: f64) {
        self.position += seconds;
    }
}

impl MediaElement for HeadlessMedia {
    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn set_source(&mut self, url: &str) {
        self.source = Some(url.to_string());
        self.history.push(url.to_string());
        self.playing = false;
        self.position = 0.0;
    }

    fn load(&mut self) {
        self.loads += 1;
    }

    fn play(&mut self) -> Result<(), PlayRejected> {
        if let Some(reason) = &self.reject_play {
            return Err(PlayRejected(reason.clone()));
        }
        self.playing = true;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.position = seconds;
    }
}
