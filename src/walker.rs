use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::FeederError;
use crate::verifier::Verifier;

/// Lists the files of a directory that carry a given extension.
///
/// Only the top level is inspected, subdirectories are never entered. The
/// extension includes the leading dot (".metadata") and is matched case
/// insensitively; an empty extension matches every file.
#[derive(Debug)]
pub struct Walker {
    root: PathBuf,
    extension: String,
}

impl Walker {
    pub fn new<P: Into<PathBuf>>(root: P, extension: &str) -> Self {
        Walker {
            root: root.into(),
            extension: extension.to_string(),
        }
    }

    /// Returns the file names found under the root directory.
    ///
    /// When a verifier is given, every candidate is checked and the ones
    /// that do not pass are left out. A verifier that errors out only
    /// excludes the file it was looking at, with a warning.
    pub fn scan(&self, verifier: Option<&dyn Verifier>) -> Result<Vec<String>, FeederError> {
        let entries = fs::read_dir(&self.root).map_err(|source| FeederError::Scan {
            path: self.root.clone(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| FeederError::Scan {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() || !self.matches_extension(&path) {
                continue;
            }

            if let Some(verifier) = verifier {
                match verifier.verify(&path) {
                    Ok(true) => {}
                    Ok(false) => {
                        debug!("file {} did not pass verification", path.display());
                        continue;
                    }
                    Err(error) => {
                        warn!(
                            "ignoring {} because it cannot be verified: {}",
                            path.display(),
                            error
                        );
                        continue;
                    }
                }
            }

            if let Some(name) = path.file_name().and_then(OsStr::to_str) {
                files.push(name.to_string());
            }
        }

        Ok(files)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        if self.extension.is_empty() {
            return true;
        }
        match path.extension().and_then(OsStr::to_str) {
            Some(extension) => format!(".{extension}").eq_ignore_ascii_case(&self.extension),
            None => false,
        }
    }
}
