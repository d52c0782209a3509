use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while scanning, resolving, and importing image archives.
#[derive(Error, Debug)]
pub enum FeederError {
    #[error("cannot parse image reference {reference:?}: {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("whitelisting images by tag is not supported: {0:?}")]
    WhitelistedTag(String),

    #[error("cannot scan {}: {source}", .path.display())]
    Scan { path: PathBuf, source: io::Error },

    #[error("malformed metadata file {}: {reason}", .path.display())]
    Metadata { path: PathBuf, reason: String },

    #[error("cannot load feeder configuration from {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("the {engine} engine is not usable: {reason}")]
    EngineUnavailable { engine: String, reason: String },

    #[error("failed to execute {program}: {source}")]
    CommandIo { program: String, source: io::Error },

    #[error("{program} exited with an error: {stderr}")]
    CommandFailed { program: String, stderr: String },

    #[error("unexpected output from {program}: {output:?}")]
    UnexpectedOutput { program: String, output: String },
}

/// Import failure of a single image, keyed by the repotag that was being
/// brought into the engine when the error occurred.
#[derive(Debug)]
pub struct FailedImport {
    pub image: String,
    pub error: FeederError,
}
