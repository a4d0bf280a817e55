//! `yt_processor` -- desktop client for the video-processing backend.
//!
//! Opens a window with a single form by default. With `--headless` it
//! submits the job given on the command line, logs progress and prints
//! the download URL once the job succeeds.
//!
//! Configuration comes from the environment (see [`yt_processor::config`]);
//! `--api-url` overrides the backend base URL.

// egui front-end
mod app;

use std::sync::Arc;

use anyhow::{anyhow, Context as _};
use clap::Parser;
use eframe::egui::Visuals;
use once_cell::sync::OnceCell;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::ProcessorApp;
use yt_processor::api::HttpJobApi;
use yt_processor::cli::Cli;
use yt_processor::config::Config;
use yt_processor::controller::JobController;
use yt_processor::model::MediaType;
use yt_processor::progress::progress_label;

// Global Tokio runtime stored in a OnceCell for lazy init
static RUNTIME: OnceCell<Runtime> = OnceCell::new();

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yt_processor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url);
    }

    tracing::info!(
        api_url = %config.api_base_url,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        submit_timeout_secs = config.submit_timeout.as_secs(),
        headless = cli.headless,
        "Starting yt_processor",
    );

    let rt = RUNTIME
        .get_or_try_init(Runtime::new)
        .context("failed to start Tokio runtime")?;

    let http = reqwest::Client::new();
    let api = Arc::new(HttpJobApi::with_client(http.clone(), config.api_base_url.clone()));
    let controller = JobController::new(api, config.poll_settings());

    if cli.headless {
        let (url, media_type) = cli
            .initial_job()
            .ok_or_else(|| anyhow!("--headless needs --url or --video-id"))?;
        return rt.block_on(run_headless(controller, url, media_type));
    }

    let initial = cli.initial_job();
    let app = ProcessorApp::new(controller, rt.handle().clone(), http);
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "YouTube Video Processor",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(Visuals::dark());
            let mut app = app;
            if let Some((url, media_type)) = initial {
                app.auto_submit(&cc.egui_ctx, url, media_type);
            }
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow!("window failed: {e}"))
}

/// Submit one job and follow it until it is terminal.
async fn run_headless(
    controller: JobController<HttpJobApi>,
    url: String,
    media_type: MediaType,
) -> anyhow::Result<()> {
    let mut rx = controller.subscribe();
    let handle = controller.submit(&url, media_type).await?;
    tracing::info!(job_id = %handle.job_id, "Following job");

    loop {
        rx.changed().await.context("controller went away")?;
        let snap = rx.borrow_and_update().clone();

        if let Some(state) = &snap.status {
            tracing::info!(state = %state, progress = %progress_label(snap.progress), "Job progress");
        }
        if let Some(download_url) = snap.download_url {
            println!("{download_url}");
            return Ok(());
        }
        if let Some(err) = snap.error {
            return Err(err.into());
        }
    }
}
