// ABOUTME: Validated domain types shared across the crate.
// ABOUTME: Environment colors and release version labels.

mod environment;
mod version;

pub use environment::{Environment, ParseEnvironmentError};
pub use version::{Version, VersionError};
