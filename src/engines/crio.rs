use std::ffi::OsStr;
use std::path::Path;

use log::debug;

use super::{parse_loaded_image, run, Engine};
use crate::error::FeederError;

/// CRI-O implementation of the Engine trait.
///
/// CRI-O has no image-loading surface of its own; podman manages the same
/// containers/storage area, so the images it loads and tags are the ones
/// CRI-O serves to the kubelet.
pub struct CrioEngine;

impl CrioEngine {
    pub fn new() -> Result<Self, FeederError> {
        run("podman", ["--version"]).map_err(|error| FeederError::EngineUnavailable {
            engine: "cri-o".to_string(),
            reason: error.to_string(),
        })?;
        Ok(Self)
    }
}

impl Engine for CrioEngine {
    fn name(&self) -> &str {
        "cri-o"
    }

    fn images(&self) -> Result<Vec<String>, FeederError> {
        let output = run("podman", ["images", "--format", "{{.Repository}}:{{.Tag}}"])?;

        // podman reports fully qualified names already; dangling entries
        // are dropped rather than normalized
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.contains("<none>"))
            .map(str::to_string)
            .collect())
    }

    fn load_image(&self, archive: &Path) -> Result<String, FeederError> {
        debug!("loading image archive {}", archive.display());
        let output = run(
            "podman",
            [OsStr::new("load"), OsStr::new("-i"), archive.as_os_str()],
        )?;
        parse_loaded_image("podman", &output)
    }

    fn tag_image(&self, image: &str, tags: &[String]) -> Result<(), FeederError> {
        for tag in tags {
            debug!("tagging image {image} as {tag}");
            run("podman", ["tag", image, tag.as_str()])?;
        }
        Ok(())
    }
}
