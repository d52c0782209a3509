//! Normalization of docker-style image references.
//!
//! Engines and metadata files name images in the short forms users type
//! (`opensuse:latest`, `localhost:5000/foo`). Comparing such names only
//! works once they are expanded to their canonical form, the same way the
//! docker CLI expands them: `docker.io/library/opensuse:latest`.

use crate::error::FeederError;

/// Registry assumed when a reference does not name one.
const DEFAULT_REGISTRY: &str = "docker.io";

/// Historic alias of [`DEFAULT_REGISTRY`], folded into it on normalization.
const LEGACY_REGISTRY: &str = "index.docker.io";

/// Namespace of official images on the default registry.
const OFFICIAL_NAMESPACE: &str = "library";

/// Expands `raw` to a fully qualified `(name, tag)` pair.
///
/// The name always carries a registry and, on the default registry, a
/// namespace. The tag is returned separately and is empty when the
/// reference has none (a digest suffix is validated but not reported as a
/// tag). Engines list dangling images as `<none>:<none>`; the angle
/// brackets are stripped before parsing, so such entries normalize to
/// `docker.io/library/none` rather than failing the whole listing.
pub fn normalize_name_tag(raw: &str) -> Result<(String, String), FeederError> {
    let err = |reason: &str| FeederError::InvalidReference {
        reference: raw.to_string(),
        reason: reason.to_string(),
    };

    let cleaned: String = raw.chars().filter(|c| *c != '<' && *c != '>').collect();
    if cleaned.is_empty() {
        return Err(err("empty reference"));
    }

    let name_and_tag = match cleaned.split_once('@') {
        Some((head, digest)) => {
            if !is_valid_digest(digest) {
                return Err(err("invalid digest"));
            }
            head
        }
        None => cleaned.as_str(),
    };

    // The tag starts at the last ':', unless that ':' belongs to a registry
    // port (in which case a '/' follows it somewhere).
    let (name, tag) = match name_and_tag.rsplit_once(':') {
        Some((head, rest)) if !rest.contains('/') => {
            if rest.is_empty() {
                return Err(err("missing tag after ':'"));
            }
            if !is_valid_tag(rest) {
                return Err(err("invalid tag"));
            }
            (head, rest)
        }
        _ => (name_and_tag, ""),
    };

    let (registry, repository) = match name.split_once('/') {
        Some((first, rest)) if is_registry_host(first) => (Some(first), rest),
        _ => (None, name),
    };

    if let Some(host) = registry {
        if !is_valid_host(host) {
            return Err(err("invalid registry host"));
        }
    }
    if !is_valid_repository(repository) {
        return Err(err("invalid repository name"));
    }

    let name = match registry {
        Some(host) => {
            let host = if host == LEGACY_REGISTRY {
                DEFAULT_REGISTRY
            } else {
                host
            };
            if host == DEFAULT_REGISTRY && !repository.contains('/') {
                format!("{host}/{OFFICIAL_NAMESPACE}/{repository}")
            } else {
                format!("{host}/{repository}")
            }
        }
        None if repository.contains('/') => format!("{DEFAULT_REGISTRY}/{repository}"),
        None => format!("{DEFAULT_REGISTRY}/{OFFICIAL_NAMESPACE}/{repository}"),
    };

    Ok((name, tag.to_string()))
}

/// A leading path component names a registry when it looks like a host:
/// it contains a dot or a port, or is exactly `localhost`.
fn is_registry_host(component: &str) -> bool {
    component == "localhost" || component.contains('.') || component.contains(':')
}

fn is_valid_host(host: &str) -> bool {
    let (domain, port) = match host.split_once(':') {
        Some((domain, port)) => (domain, Some(port)),
        None => (host, None),
    };
    if let Some(port) = port {
        if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    !domain.is_empty()
        && domain.split('.').all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-')
        })
}

/// Repository names are lowercase path components separated by '/'.
fn is_valid_repository(repository: &str) -> bool {
    !repository.is_empty() && repository.split('/').all(is_valid_path_component)
}

fn is_valid_path_component(component: &str) -> bool {
    fn edge(b: u8) -> bool {
        b.is_ascii_lowercase() || b.is_ascii_digit()
    }
    fn inner(b: u8) -> bool {
        edge(b) || matches!(b, b'.' | b'_' | b'-')
    }
    let bytes = component.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(&first), Some(&last)) => {
            edge(first) && edge(last) && bytes.iter().all(|&b| inner(b))
        }
        _ => false,
    }
}

/// Tags are up to 128 characters from `[A-Za-z0-9_.-]`, not starting with
/// a dot or a dash.
fn is_valid_tag(tag: &str) -> bool {
    let mut bytes = tag.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphanumeric() || first == b'_' => {
            tag.len() <= 128
                && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'))
        }
        _ => false,
    }
}

fn is_valid_digest(digest: &str) -> bool {
    match digest.split_once(':') {
        Some((algorithm, hex)) => {
            !algorithm.is_empty()
                && algorithm.bytes().all(|b| b.is_ascii_alphanumeric())
                && hex.len() >= 32
                && hex.bytes().all(|b| b.is_ascii_hexdigit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(raw: &str) -> (String, String) {
        normalize_name_tag(raw).unwrap()
    }

    #[test]
    fn test_bare_names_gain_registry_and_namespace() {
        assert_eq!(
            normalized("opensuse:latest"),
            ("docker.io/library/opensuse".to_string(), "latest".to_string())
        );
        assert_eq!(
            normalized("opensuse"),
            ("docker.io/library/opensuse".to_string(), String::new())
        );
    }

    #[test]
    fn test_namespaced_names_gain_only_the_registry() {
        assert_eq!(
            normalized("opensuse/with/path:latest"),
            ("docker.io/opensuse/with/path".to_string(), "latest".to_string())
        );
    }

    #[test]
    fn test_explicit_registries_are_kept_verbatim() {
        assert_eq!(
            normalized("registry.suse.com/sles12/foo:bar"),
            ("registry.suse.com/sles12/foo".to_string(), "bar".to_string())
        );
        assert_eq!(
            normalized("localhost:5000/notag"),
            ("localhost:5000/notag".to_string(), String::new())
        );
    }

    #[test]
    fn test_legacy_registry_is_folded_into_the_default_one() {
        assert_eq!(
            normalized("index.docker.io/library/opensuse:42.3"),
            ("docker.io/library/opensuse".to_string(), "42.3".to_string())
        );
    }

    #[test]
    fn test_already_normalized_references_are_stable() {
        for reference in [
            "docker.io/library/opensuse:latest",
            "docker.io/opensuse/with/path:latest",
            "registry.suse.com/sles12/foo:bar",
            "localhost:5000/notag",
        ] {
            let (name, tag) = normalized(reference);
            let rejoined = if tag.is_empty() {
                name.clone()
            } else {
                format!("{name}:{tag}")
            };
            assert_eq!(normalized(&rejoined), (name, tag));
        }
    }

    #[test]
    fn test_placeholder_markers_are_stripped() {
        assert_eq!(
            normalized("<none>:<none>"),
            ("docker.io/library/none".to_string(), "none".to_string())
        );
    }

    #[test]
    fn test_digests_are_validated_but_not_reported_as_tags() {
        assert_eq!(
            normalized("opensuse@sha256:075f8ab617a19e617e6f22dd3377d83b6d63eb61d1673f371b2eb2bcbddcf2b6"),
            ("docker.io/library/opensuse".to_string(), String::new())
        );
        assert!(normalize_name_tag("opensuse@sha256:xyz").is_err());
        assert!(normalize_name_tag("opensuse@075f8ab6").is_err());
    }

    #[test]
    fn test_malformed_references_are_rejected() {
        for reference in [
            "",
            "<>",
            "invalidtag:",
            "un:expected:format",
            "UPPERCASE:latest",
            "trailing/",
            "/leading",
            "-dash:latest",
            "name:.tag",
            "registry.suse.com:port/foo",
        ] {
            assert!(
                normalize_name_tag(reference).is_err(),
                "expected {reference:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_ports_are_not_confused_with_tags() {
        assert_eq!(
            normalized("localhost:5000/foo:bar"),
            ("localhost:5000/foo".to_string(), "bar".to_string())
        );
    }
}
