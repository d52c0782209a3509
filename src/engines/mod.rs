use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use crate::config::Target;
use crate::error::FeederError;

mod crio;
mod docker;

pub use crio::CrioEngine;
pub use docker::DockerEngine;

/// Container engine the images are fed into.
///
/// Implementations wrap the engine's own CLI instead of its API socket, so
/// the feeder works against whatever engine version the host ships.
pub trait Engine {
    /// Name of the engine for identification purposes.
    fn name(&self) -> &str;

    /// Returns the repotags of all images the engine currently carries,
    /// in their normalized form.
    fn images(&self) -> Result<Vec<String>, FeederError>;

    /// Loads the archive into the engine and returns the identifier the
    /// engine reported for the loaded image, usable as a tag source.
    fn load_image(&self, archive: &Path) -> Result<String, FeederError>;

    /// Applies each of `tags` to the given image.
    fn tag_image(&self, image: &str, tags: &[String]) -> Result<(), FeederError>;
}

/// Builds the engine backend selected by the configuration.
pub fn for_target(target: Target) -> Result<Box<dyn Engine>, FeederError> {
    match target {
        Target::Docker => Ok(Box::new(DockerEngine::new()?)),
        Target::Crio => Ok(Box::new(CrioEngine::new()?)),
    }
}

/// Runs an engine CLI command, returning its stdout. A non-zero exit
/// becomes an error that carries the command's stderr.
pub(crate) fn run<I, S>(program: &str, args: I) -> Result<String, FeederError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| FeederError::CommandIo {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(FeederError::CommandFailed {
            program: program.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Extracts the loaded image identifier from the output of a
/// `docker load` / `podman load` invocation. The interesting line looks
/// like one of:
///
/// ```text
/// Loaded image: docker.io/library/opensuse:42.3
/// Loaded image ID: sha256:9a21251bd0b3...
/// Loaded image(s): localhost/foo:latest,localhost/bar:latest
/// ```
///
/// With several images in one archive only the first identifier is
/// returned.
pub(crate) fn parse_loaded_image(program: &str, output: &str) -> Result<String, FeederError> {
    const PREFIXES: [&str; 3] = ["Loaded image ID:", "Loaded image(s):", "Loaded image:"];

    for line in output.lines() {
        let line = line.trim();
        for prefix in PREFIXES {
            if let Some(rest) = line.strip_prefix(prefix) {
                let first = rest.split(',').next().unwrap_or(rest).trim();
                if !first.is_empty() {
                    return Ok(first.to_string());
                }
            }
        }
    }

    Err(FeederError::UnexpectedOutput {
        program: program.to_string(),
        output: output.to_string(),
    })
}
