//! Orchestration of a full import run.
//!
//! A run scans a directory for packaged images, asks the engine what it
//! already carries, imports whatever is missing and reports both outcomes.
//! Failures of single images never abort the run: they are collected and
//! the remaining images keep flowing in.

use std::path::Path;

use log::{debug, warn};

use crate::config::FeederConfig;
use crate::engines::{self, Engine};
use crate::error::{FailedImport, FeederError};
use crate::metadata::find_images;
use crate::reconcile::images_to_import;
use crate::verifier::{RpmVerifier, Verifier};

/// Outcome of an import run.
#[derive(Debug, Default)]
pub struct FeederLoadResponse {
    /// Repotags that were loaded and tagged.
    pub successful_imports: Vec<String>,
    /// Images that could not be brought in, with the error each one hit.
    pub failed_imports: Vec<FailedImport>,
}

/// Feeds packaged container images into a container engine.
pub struct Feeder {
    engine: Box<dyn Engine>,
    config: FeederConfig,
    verifier: Option<Box<dyn Verifier>>,
}

impl Feeder {
    /// Creates a feeder for the engine the configuration selects, with RPM
    /// verification of the metadata files.
    pub fn new(config: FeederConfig) -> Result<Self, FeederError> {
        let target = config.target.unwrap_or_default();
        debug!("configured feeder target: {target}");
        let engine = engines::for_target(target)?;
        debug!("feeding the {} engine", engine.name());

        Ok(Feeder {
            engine,
            config,
            verifier: Some(Box::new(RpmVerifier)),
        })
    }

    /// Creates a feeder around an explicit engine and verifier, bypassing
    /// backend selection.
    pub fn with_engine(
        config: FeederConfig,
        engine: Box<dyn Engine>,
        verifier: Option<Box<dyn Verifier>>,
    ) -> Self {
        Feeder {
            engine,
            config,
            verifier,
        }
    }

    /// Imports the images packaged under `dir` that the engine is missing.
    ///
    /// Each missing image is loaded from its archive and then tagged with
    /// its additional tags. An image failing either step lands in
    /// `failed_imports` and the run carries on with the next one.
    pub fn import(&self, dir: &Path) -> Result<FeederLoadResponse, FeederError> {
        debug!("trying to import images from {}", dir.display());

        let desired = find_images(dir, self.verifier.as_deref())?;
        let known = self.engine.images()?;
        debug!("the engine already carries {} images", known.len());

        let (to_import, failed_imports) =
            images_to_import(desired, &self.config.whitelist, &known);

        let mut response = FeederLoadResponse {
            successful_imports: Vec::new(),
            failed_imports,
        };

        for (repotag, image) in to_import {
            let loaded = match self.engine.load_image(&image.archive_path) {
                Ok(loaded) => loaded,
                Err(error) => {
                    warn!(
                        "could not load image from {}: {}",
                        image.archive_path.display(),
                        error
                    );
                    response.failed_imports.push(FailedImport {
                        image: repotag,
                        error,
                    });
                    continue;
                }
            };

            match self.engine.tag_image(&loaded, &image.additional_tags) {
                Ok(()) => response.successful_imports.push(repotag),
                Err(error) => {
                    warn!("could not tag image {repotag}: {error}");
                    response.failed_imports.push(FailedImport {
                        image: repotag,
                        error,
                    });
                }
            }
        }

        Ok(response)
    }
}
