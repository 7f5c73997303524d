//! Centralized error types for the client.
//!
//! Event handlers never let these escape the dispatcher: a failed event is logged and dropped.
//! They exist so the pieces underneath (codec, transport, decoder, config) can use `?` and so
//! the binary can attach context at the top level.

use std::io;

/// Main error type for the client.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Network error: {0}")]
    Net(#[from] NetError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Errors produced while encoding or decoding wire messages.
#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Message has no action field")]
    MissingAction,

    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

/// Errors from the message channel.
#[derive(thiserror::Error, Debug)]
pub enum NetError {
    #[error("Connection closed")]
    Closed,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Errors from turning a frame identifier into a usable image.
#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

/// Errors raised while loading or validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
