use crate::error::FeederError;
use crate::reference::normalize_name_tag;

/// Normalizes the configured whitelist entries into fully qualified image
/// names. Entries carrying a tag are rejected: whitelisting works on whole
/// images, never on single tags.
pub fn parse_whitelist(entries: &[String]) -> Result<Vec<String>, FeederError> {
    let mut whitelist = Vec::with_capacity(entries.len());
    for entry in entries {
        let (name, tag) = normalize_name_tag(entry)?;
        if !tag.is_empty() {
            return Err(FeederError::WhitelistedTag(entry.clone()));
        }
        whitelist.push(name);
    }
    Ok(whitelist)
}

/// Tells whether `repotag` may be imported. An empty whitelist admits
/// everything; otherwise the normalized name must appear in the list.
pub fn is_whitelisted(repotag: &str, whitelist: &[String]) -> Result<bool, FeederError> {
    if whitelist.is_empty() {
        return Ok(true);
    }
    let (name, _) = normalize_name_tag(repotag)?;
    Ok(whitelist.iter().any(|entry| *entry == name))
}
