//! `yt_processor` library crate.
//!
//! Client side of the video-processing service: submit a video URL as a
//! job, poll its status until it finishes, expose the result. The binary
//! entrypoint and the egui front-end live in `main.rs`.

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod progress;
pub mod thumbnail;
pub mod youtube;
