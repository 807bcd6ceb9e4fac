//! 错误类型
//! Error types for the marker tracker

use thiserror::Error;

/// 顶层错误类型
#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),

    #[error("Overlay error: {0}")]
    Overlay(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stream worker panicked")]
    WorkerPanicked,
}

/// 配置相关错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Failed to write config file: {0}")]
    WriteFile(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid color `{name}`: {message}")]
    InvalidColor { name: String, message: String },

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },

    #[error("Unknown color: {0}")]
    UnknownColor(String),
}

/// 上游检测器错误 (摄像头不可用、回放文件损坏等)
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed frame #{frame}: {message}")]
    MalformedFrame { frame: u64, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrackError>;
