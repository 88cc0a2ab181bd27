//! Stock image generator - turns a subject, a drawing style and a background
//! preference into a stock-ready image plus its planning notes and keywords.
//!
//! Text and image generation run against the Gemini API; results are rendered
//! to the terminal and saved as PNG files named after the subject.

pub mod ai;
pub mod app;
pub mod data_uri;
pub mod download;
pub mod error;
pub mod models;
pub mod prompts;
pub mod view;

pub use error::{Error, Result};
