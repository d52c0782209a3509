use std::ffi::OsStr;
use std::path::Path;

use log::debug;

use super::{parse_loaded_image, run, Engine};
use crate::error::FeederError;
use crate::reference::normalize_name_tag;

/// Docker implementation of the Engine trait, backed by the docker CLI.
pub struct DockerEngine;

impl DockerEngine {
    pub fn new() -> Result<Self, FeederError> {
        // asking for the server version touches the daemon, not just the
        // client binary
        run("docker", ["version", "--format", "{{.Server.Version}}"]).map_err(|error| {
            FeederError::EngineUnavailable {
                engine: "docker".to_string(),
                reason: error.to_string(),
            }
        })?;
        Ok(Self)
    }
}

impl Engine for DockerEngine {
    fn name(&self) -> &str {
        "docker"
    }

    fn images(&self) -> Result<Vec<String>, FeederError> {
        let output = run("docker", ["image", "ls", "--format", "{{.Repository}}:{{.Tag}}"])?;

        let mut repotags = Vec::new();
        for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
            // docker prints short names, dangling entries show up as
            // "<none>:<none>"
            let (name, tag) = normalize_name_tag(line)?;
            repotags.push(format!("{name}:{tag}"));
        }
        Ok(repotags)
    }

    fn load_image(&self, archive: &Path) -> Result<String, FeederError> {
        debug!("loading image archive {}", archive.display());
        let output = run(
            "docker",
            [OsStr::new("load"), OsStr::new("-i"), archive.as_os_str()],
        )?;
        parse_loaded_image("docker", &output)
    }

    fn tag_image(&self, image: &str, tags: &[String]) -> Result<(), FeederError> {
        for tag in tags {
            debug!("tagging image {image} as {tag}");
            run("docker", ["tag", image, tag.as_str()])?;
        }
        Ok(())
    }
}
