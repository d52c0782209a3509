use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::error::FeederError;
use crate::reference::normalize_name_tag;
use crate::verifier::Verifier;
use crate::walker::Walker;

/// Extension of the descriptor files that announce packaged images.
pub const METADATA_EXTENSION: &str = ".metadata";

/// On-disk descriptor shipped next to each image archive:
///
/// ```json
/// {
///   "image": {
///     "name": "opensuse/salt-api",
///     "tags": ["13", "13.0.1", "latest"],
///     "file": "salt-api.tar.xz"
///   }
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct Metadata {
    pub image: ImageDescriptor,
}

#[derive(Debug, Deserialize)]
pub struct ImageDescriptor {
    pub name: String,
    pub tags: Vec<String>,
    pub file: String,
}

/// A packaged image whose descriptor and archive were both found on disk.
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    /// Normalized name combined with the first declared tag.
    pub repotag: String,
    /// Normalized repotags for the remaining declared tags.
    pub additional_tags: Vec<String>,
    /// Location of the image archive.
    pub archive_path: PathBuf,
}

/// Scans `root` for image descriptors and resolves them into the images
/// available for import, keyed by their primary repotag.
///
/// Descriptors whose archive is missing are skipped silently: the package
/// may legitimately ship metadata ahead of the payload. A descriptor that
/// cannot be parsed aborts the scan instead, since it points to a broken
/// package.
pub fn find_images(
    root: &Path,
    verifier: Option<&dyn Verifier>,
) -> Result<HashMap<String, ResolvedImage>, FeederError> {
    debug!("searching for packaged images in {}", root.display());

    let walker = Walker::new(root, METADATA_EXTENSION);
    let mut images = HashMap::new();

    for file in walker.scan(verifier)? {
        let descriptor_path = root.join(&file);
        let (repotag, additional_tags, archive) = resolve_descriptor(&descriptor_path)?;

        let archive_path = root.join(&archive);
        if !archive_path.exists() {
            debug!(
                "image archive {} does not exist, skipping {}",
                archive_path.display(),
                repotag
            );
            continue;
        }

        images.insert(
            repotag.clone(),
            ResolvedImage {
                repotag,
                additional_tags,
                archive_path,
            },
        );
    }

    debug!(
        "found the following packaged images: {:?}",
        images.keys().collect::<Vec<_>>()
    );
    Ok(images)
}

/// Reads a descriptor and turns its declared name and tags into normalized
/// repotags. The first tag forms the primary repotag, the rest become
/// additional tags of the same image.
fn resolve_descriptor(path: &Path) -> Result<(String, Vec<String>, String), FeederError> {
    let malformed = |reason: String| FeederError::Metadata {
        path: path.to_path_buf(),
        reason,
    };

    let contents = fs::read_to_string(path).map_err(|error| malformed(error.to_string()))?;
    let metadata: Metadata =
        serde_json::from_str(&contents).map_err(|error| malformed(error.to_string()))?;
    let descriptor = metadata.image;

    let (first_tag, rest) = match descriptor.tags.split_first() {
        Some(split) => split,
        None => return Err(malformed("no tags declared".to_string())),
    };

    let (name, _) = normalize_name_tag(&descriptor.name)?;
    let repotag = format!("{name}:{first_tag}");
    let additional_tags = rest.iter().map(|tag| format!("{name}:{tag}")).collect();

    Ok((repotag, additional_tags, descriptor.file))
}
