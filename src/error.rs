// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("storage error while {stage} `{collection}`: {source}")]
    Storage {
        stage: &'static str,
        collection: &'static str,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("could not process {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no usable rows left for {stage}: {dropped} of {total} rows failed coercion")]
    Data {
        stage: &'static str,
        total: usize,
        dropped: usize,
    },

    #[error("insufficient data for {stage}: need at least {required} points, got {actual}")]
    InsufficientData {
        stage: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("model error during {stage}: {message}")]
    Model { stage: &'static str, message: String },
}

impl PipelineError {
    pub fn storage(stage: &'static str, collection: &'static str) -> impl FnOnce(mongodb::error::Error) -> Self {
        move |source| PipelineError::Storage { stage, collection, source }
    }

    pub fn file(path: impl Into<PathBuf>) -> impl FnOnce(csv::Error) -> Self {
        let path = path.into();
        move |source| PipelineError::File { path, source }
    }

    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| PipelineError::Io { path, source }
    }

    pub fn model<E: std::fmt::Display>(stage: &'static str) -> impl FnOnce(E) -> Self {
        move |e| PipelineError::Model { stage, message: e.to_string() }
    }

    /// Errors raised by the forecast step, which callers may isolate.
    pub fn is_forecast_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Data { .. } | PipelineError::InsufficientData { .. } | PipelineError::Model { .. }
        )
    }
}
