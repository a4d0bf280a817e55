//! egui front-end: one form, one job, rendered from controller snapshots.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use eframe::{egui, App, Frame};
use egui::{Color32, ColorImage, TextureOptions};
use tokio::runtime::Handle;

use yt_processor::api::HttpJobApi;
use yt_processor::controller::JobController;
use yt_processor::model::{JobState, MediaType, Snapshot};
use yt_processor::progress::{progress_fraction, progress_label};
use yt_processor::thumbnail::fetch_thumbnail;
use yt_processor::youtube::extract_video_id;

/// Application state for the GUI
pub struct ProcessorApp {
    /// Input field for the video URL
    url_input: String,
    /// Selected output format
    media_type: MediaType,
    /// Owns the submitted job and its poll loop
    controller: Arc<JobController<HttpJobApi>>,
    /// Runtime the controller and thumbnail fetches run on
    runtime: Handle,
    /// Shared HTTP client for thumbnails
    http: reqwest::Client,
    /// Video id of the last submission, if the URL had one
    current_video_id: Option<String>,
    /// Cached textures for video thumbnails
    thumbnails: HashMap<String, egui::TextureHandle>,
    /// Incoming thumbnail fetch results (video_id, image)
    thumbnail_results: Arc<Mutex<Vec<(String, ColorImage)>>>,
}

impl ProcessorApp {
    pub fn new(controller: JobController<HttpJobApi>, runtime: Handle, http: reqwest::Client) -> Self {
        Self {
            url_input: String::new(),
            media_type: MediaType::default(),
            controller: Arc::new(controller),
            runtime,
            http,
            current_video_id: None,
            thumbnails: HashMap::new(),
            thumbnail_results: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fill the form and submit straight away, as the `/{videoId}` route
    /// of the web front-end did.
    pub fn auto_submit(&mut self, ctx: &egui::Context, url: String, media_type: MediaType) {
        self.url_input = url;
        self.media_type = media_type;
        self.start_job(ctx);
    }

    fn start_job(&mut self, ctx: &egui::Context) {
        let url = self.url_input.trim().to_string();
        let media_type = self.media_type;

        let controller = Arc::clone(&self.controller);
        let ctx_c = ctx.clone();
        self.runtime.spawn(async move {
            // Failures are already in the snapshot.
            let _ = controller.submit(&url, media_type).await;
            ctx_c.request_repaint();
        });

        self.current_video_id = extract_video_id(&self.url_input);
        if let Some(video_id) = self.current_video_id.clone() {
            if !self.thumbnails.contains_key(&video_id) {
                self.spawn_thumbnail_fetch(ctx, video_id);
            }
        }
    }

    fn spawn_thumbnail_fetch(&self, ctx: &egui::Context, video_id: String) {
        let results = Arc::clone(&self.thumbnail_results);
        let http = self.http.clone();
        let ctx_c = ctx.clone();
        self.runtime.spawn(async move {
            if let Some(img) = fetch_thumbnail(&http, &video_id).await {
                if let Ok(mut pending) = results.lock() {
                    pending.push((video_id, img));
                }
                ctx_c.request_repaint();
            }
        });
    }

    fn show_progress(&self, ui: &mut egui::Ui, snap: &Snapshot) {
        let Some(state) = &snap.status else {
            return;
        };
        if *state == JobState::Success {
            return;
        }
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            if let Some(tex) = self.current_thumbnail() {
                ui.add(egui::Image::new(tex).max_width(160.0));
            }
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    ui.label(state.as_str());
                    ui.label(progress_label(snap.progress));
                });
                ui.add(egui::ProgressBar::new(progress_fraction(snap.progress)));
            });
        });
    }

    fn show_result(&self, ui: &mut egui::Ui, snap: &Snapshot) {
        let Some(url) = &snap.download_url else {
            return;
        };
        ui.add_space(12.0);
        ui.group(|ui| {
            ui.horizontal(|ui| {
                if let Some(tex) = self.current_thumbnail() {
                    ui.add(egui::Image::new(tex).max_width(160.0));
                }
                ui.vertical(|ui| {
                    ui.label("✅ Processed media is ready");
                    ui.hyperlink_to(url.as_str(), url.as_str());
                    ui.horizontal(|ui| {
                        if ui.button("Open result").clicked() {
                            open_in_system(url.clone());
                        }
                        if ui.button("Copy link").clicked() {
                            ui.output_mut(|o| o.copied_text = url.clone());
                        }
                    });
                });
            });
        });
    }

    fn current_thumbnail(&self) -> Option<&egui::TextureHandle> {
        self.current_video_id
            .as_ref()
            .and_then(|id| self.thumbnails.get(id))
    }
}

/// GUI update loop: called each frame to redraw and handle interactions
impl App for ProcessorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // Handle completed thumbnail fetches
        if let Ok(mut pending) = self.thumbnail_results.lock() {
            for (vid, img) in pending.drain(..) {
                let tex = ctx.load_texture(&vid, img, TextureOptions::default());
                self.thumbnails.insert(vid, tex);
            }
        }

        let snap = self.controller.snapshot();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("YouTube Video Processor");
            ui.add_space(8.0);

            ui.label("YouTube URL");
            ui.add(
                egui::TextEdit::singleline(&mut self.url_input)
                    .hint_text("https://youtube.com/watch?v=...")
                    .desired_width(f32::INFINITY),
            );

            ui.horizontal(|ui| {
                ui.label("Media type:");
                egui::ComboBox::from_id_source("media_type")
                    .selected_text(self.media_type.label())
                    .show_ui(ui, |ui| {
                        for m in MediaType::ALL {
                            ui.selectable_value(&mut self.media_type, m, m.label());
                        }
                    });
            });

            let can_submit = !self.url_input.trim().is_empty()
                && snap.status != Some(JobState::Processing);
            if ui
                .add_enabled(can_submit, egui::Button::new("Process Video"))
                .clicked()
            {
                self.start_job(ctx);
            }

            self.show_progress(ui, &snap);
            self.show_result(ui, &snap);

            if let Some(err) = &snap.error {
                ui.add_space(12.0);
                ui.colored_label(Color32::RED, err.to_string());
            }
        });

        if snap.status.is_some() && !snap.is_terminal() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

/// Hand a URL to the platform opener without blocking the UI thread
fn open_in_system(target: String) {
    std::thread::spawn(move || {
        #[cfg(target_os = "windows")]
        let result = std::process::Command::new("explorer").arg(&target).spawn();
        #[cfg(target_os = "macos")]
        let result = std::process::Command::new("open").arg(&target).spawn();
        #[cfg(all(unix, not(target_os = "macos")))]
        let result = std::process::Command::new("xdg-open").arg(&target).spawn();

        if let Err(e) = result {
            tracing::warn!(target = %target, error = %e, "Could not open result");
        }
    });
}
