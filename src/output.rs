use std::io::{self, Write};

use serde::Serialize;

use crate::plan::ArtifactPlan;
use crate::upload::UploadManifest;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValueResult {
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraitsResult {
    pub build: String,
    pub columns: Vec<String>,
    pub sampling_bias_correction: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrequencyWindowResult {
    pub build: String,
    pub min_date: Option<f64>,
    pub max_date: Option<f64>,
}

/// Plain-text rendering used when JSON is not requested.
pub trait TextRender {
    fn render_text(&self) -> String;
}

impl TextRender for ValueResult {
    fn render_text(&self) -> String {
        self.value.clone()
    }
}

impl TextRender for ArtifactPlan {
    fn render_text(&self) -> String {
        self.path().to_string()
    }
}

impl TextRender for TraitsResult {
    fn render_text(&self) -> String {
        let mut out = self.columns.join(" ");
        if let Some(correction) = self.sampling_bias_correction {
            out.push_str(&format!("\nsampling_bias_correction\t{correction}"));
        }
        out
    }
}

impl TextRender for FrequencyWindowResult {
    fn render_text(&self) -> String {
        format!(
            "min_date\t{}\nmax_date\t{}",
            render_date(self.min_date),
            render_date(self.max_date)
        )
    }
}

impl TextRender for UploadManifest {
    fn render_text(&self) -> String {
        self.iter()
            .map(|(remote, local)| format!("{remote}\t{local}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn render_date(value: Option<f64>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "unknown".to_string(),
    }
}

pub struct Output;

impl Output {
    pub fn print<T: Serialize + TextRender>(mode: OutputMode, value: &T) -> io::Result<()> {
        match mode {
            OutputMode::Json => Self::print_json(value),
            OutputMode::Text => Self::print_text(&value.render_text()),
        }
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        Self::print_text(&json)
    }

    fn print_text(text: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(text.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
