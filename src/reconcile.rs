use std::collections::HashMap;
use std::iter;

use log::{debug, warn};

use crate::error::{FailedImport, FeederError};
use crate::metadata::ResolvedImage;
use crate::whitelist::is_whitelisted;

/// Decides which of the packaged images actually need to be imported.
///
/// An image is kept when it passes the whitelist and at least one of its
/// repotags is unknown to the engine. Images the engine already carries
/// under every tag are dropped. A whitelist check that cannot be evaluated
/// sidelines that image as a failed import and the reconciliation moves on.
pub fn images_to_import(
    desired: HashMap<String, ResolvedImage>,
    whitelist: &[String],
    engine_images: &[String],
) -> (HashMap<String, ResolvedImage>, Vec<FailedImport>) {
    let mut to_import = HashMap::new();
    let mut failed_imports = Vec::new();

    for (repotag, image) in desired {
        match is_whitelisted(&repotag, whitelist) {
            Ok(false) => {
                debug!("image {repotag} is not whitelisted: ignoring it");
            }
            Err(error) => {
                warn!("cannot evaluate the whitelist for {repotag}: {error}");
                failed_imports.push(FailedImport {
                    image: repotag,
                    error,
                });
            }
            Ok(true) => {
                if needs_import(&image, engine_images) {
                    debug!("image {repotag} is whitelisted: marking it for import");
                    to_import.insert(repotag, image);
                } else {
                    debug!("image {repotag} has already been imported");
                }
            }
        }
    }

    (to_import, failed_imports)
}

/// True when any of the image's repotags is missing from the engine.
fn needs_import(image: &ResolvedImage, engine_images: &[String]) -> bool {
    iter::once(image.repotag.as_str())
        .chain(image.additional_tags.iter().map(String::as_str))
        .any(|tag| !engine_images.iter().any(|known| known == tag))
}
