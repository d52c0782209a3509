pub mod config;
pub mod engines;
pub mod error;
pub mod feeder;
pub mod metadata;
pub mod reconcile;
pub mod reference;
pub mod verifier;
pub mod walker;
pub mod whitelist;

// Re-exports for easy access
pub use config::{FeederConfig, Target};
pub use engines::CrioEngine;
pub use engines::DockerEngine;
pub use engines::Engine;
pub use error::{FailedImport, FeederError};
pub use feeder::{Feeder, FeederLoadResponse};
pub use metadata::{find_images, ResolvedImage};
pub use reference::normalize_name_tag;
pub use verifier::{RpmVerifier, Verifier};
pub use walker::Walker;
pub use whitelist::{is_whitelisted, parse_whitelist};
