use crate::errors::UsageError;
use clap::Parser;

/// Bucket used when none is given on the command line.
pub const DEFAULT_BUCKET: &str = "umccr-fingerprint-local-dev-test";

/// Validated run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Slash-terminated key prefix holding the fingerprints.
    pub folder: String,
    pub bucket: String,
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "rename-to-url-encoded",
    author,
    version,
    about = "Converts hexencoded fingerprints to URL encoded fingerprints"
)]
pub struct Args {
    /// Folder (key prefix) containing the fingerprints, ending with `/`
    pub folder: String,

    /// Bucket holding the fingerprint folder
    #[arg(default_value = DEFAULT_BUCKET)]
    pub bucket: String,
}

impl AppConfig {
    /// Parse CLI args into a validated AppConfig.
    pub fn from_args() -> Result<Self, UsageError> {
        let args = Args::parse();
        Self::new(args.folder, args.bucket)
    }

    /// Validate a folder/bucket pair. The folder must end with `/` (which
    /// also rules out an empty folder).
    pub fn new(folder: impl Into<String>, bucket: impl Into<String>) -> Result<Self, UsageError> {
        let folder = folder.into();
        if !folder.ends_with('/') {
            return Err(UsageError::FolderMissingTrailingSlash);
        }

        Ok(Self {
            folder,
            bucket: bucket.into(),
        })
    }
}
