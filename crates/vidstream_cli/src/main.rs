mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing::info;
use vidstream_api::{HttpVideoApi, VideoApi};
use vidstream_app::VideoApp;
use vidstream_catalog::{CatalogView, EMPTY_MESSAGE};
use vidstream_contract::{ClientEvent, Notifier};
use vidstream_player::{HeadlessMedia, MediaElement};
use vidstream_transfer::UploadSource;

use crate::config::ClientConfig;

#[derive(Debug, Parser)]
#[command(author, version, about = "Video catalog, playback and upload client")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides `http.base_url` from the config file.
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the rendered catalog.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print metadata for one video.
    Info { id: String },
    /// Resolve the playable source for a video.
    Play {
        id: String,
        #[arg(long)]
        quality: Option<String>,
    },
    /// Upload a video file in chunks and wait for processing.
    Upload { file: PathBuf },
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let base_url = cli.base_url.unwrap_or(config.http.base_url);
    let api: Arc<dyn VideoApi> = Arc::new(
        HttpVideoApi::new(&base_url).with_context(|| format!("invalid base url {base_url}"))?,
    );
    info!(base_url = %base_url, "vidstream client starting");

    let mut app = VideoApp::new(api, Arc::new(ConsoleNotifier), HeadlessMedia::new());
    match cli.command {
        Command::List { json } => list(&mut app, json).await,
        Command::Info { id } => show_info(&app, &id).await,
        Command::Play { id, quality } => play(&mut app, &id, quality.as_deref()).await,
        Command::Upload { file } => upload(&mut app, file).await,
    }
}

async fn list(app: &mut VideoApp<HeadlessMedia>, json: bool) -> Result<()> {
    app.load_catalog().await;
    let view = app.list().view();
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    match view {
        CatalogView::Loading => {}
        CatalogView::Empty => println!("{EMPTY_MESSAGE}"),
        CatalogView::Error(message) => bail!("{message}"),
        CatalogView::Cards(cards) => {
            for (index, card) in cards.iter().enumerate() {
                let marker = if card.clickable { '>' } else { ' ' };
                println!(
                    "{marker} {index:>3}  {:<38} {:<12} {}  {}",
                    card.video.id,
                    card.status_label,
                    card.date_label.as_deref().unwrap_or("-"),
                    card.video.title,
                );
            }
        }
    }
    Ok(())
}

async fn show_info(app: &VideoApp<HeadlessMedia>, id: &str) -> Result<()> {
    let video = app
        .api()
        .video_info(id)
        .await
        .with_context(|| format!("failed to fetch info for video {id}"))?;
    println!("{}", serde_json::to_string_pretty(&video)?);
    Ok(())
}

async fn play(app: &mut VideoApp<HeadlessMedia>, id: &str, quality: Option<&str>) -> Result<()> {
    let player = app.list_mut().player_mut();
    player.load_video(id).await?;

    if let Some(resolution) = quality {
        if !player.change_quality_to(resolution) {
            bail!("quality {resolution} is not offered for video {id}");
        }
    }

    let source = player
        .media()
        .source()
        .ok_or_else(|| anyhow!("player has no source after load"))?;
    println!("source:  {source}");
    if let Some(controls) = player.controls() {
        println!("quality: {} (offered: {})", controls.active, controls.labels().join(", "));
    }
    Ok(())
}

async fn upload(app: &mut VideoApp<HeadlessMedia>, file: PathBuf) -> Result<()> {
    let source = UploadSource::from_path(&file)
        .await
        .with_context(|| format!("failed to open {}", file.display()))?;

    let mut events = Box::pin(app.bus().subscribe());
    let printer = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            if let ClientEvent::UploadProgress { percent, .. } = event {
                eprintln!("uploading... {percent:.1}%");
            }
        }
    });

    let result = app.upload(Some(source)).await;
    printer.abort();

    let report = result?;
    println!(
        "uploaded {} as {} in {} chunk(s); status {}",
        file.display(),
        report.video.id,
        report.chunk_count,
        report.video.status
    );
    Ok(())
}
