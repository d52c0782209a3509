use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use crate::error::FeederError;

/// Integrity check applied to files before they are trusted as image
/// sources.
pub trait Verifier {
    /// Returns `Ok(true)` when `path` passes the check and `Ok(false)` when
    /// it is cleanly rejected. Any inability to decide is an error.
    fn verify(&self, path: &Path) -> Result<bool, FeederError>;
}

/// Accepts only files that are owned by an installed RPM package and still
/// match that package's recorded state.
#[derive(Debug, Default)]
pub struct RpmVerifier;

impl Verifier for RpmVerifier {
    fn verify(&self, path: &Path) -> Result<bool, FeederError> {
        // rpm exits non-zero when no package owns the file
        let package = run_rpm([OsStr::new("-qf"), path.as_os_str()])?;
        let package = package.trim();
        // and again when the owning package fails its consistency check
        run_rpm(["--verify", package])?;
        Ok(true)
    }
}

fn run_rpm<I, S>(args: I) -> Result<String, FeederError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new("rpm")
        .args(args)
        .output()
        .map_err(|source| FeederError::CommandIo {
            program: "rpm".to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(FeederError::CommandFailed {
            program: "rpm".to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
