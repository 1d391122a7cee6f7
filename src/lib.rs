pub mod artifact;
pub mod config;
pub mod fetcher;
pub mod http;
pub mod installer;
pub mod launcher;
pub mod package;
pub mod report;
pub mod session;
pub mod staging;
pub mod utils;

extern crate log;

pub use installer::Installer;
pub use session::{AbortReason, InstallationOutcome};

#[cfg(test)]
mod test_utils;
