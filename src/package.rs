use serde::Serialize;
use std::fmt;

/// Identity of the package being installed.
///
/// Only carried for logging and reporting, nothing in the pipeline branches
/// on it. The version is an opaque label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    vendor: String,
    name: String,
    version: String,
    compatibility_level: i32,
}

impl PackageDescriptor {
    pub fn new(vendor: &str, name: &str, version: &str, compatibility_level: i32) -> Self {
        Self {
            vendor: vendor.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            compatibility_level,
        }
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn compatibility_level(&self) -> i32 {
        self.compatibility_level
    }
}

impl From<&crate::config::Config> for PackageDescriptor {
    fn from(config: &crate::config::Config) -> Self {
        Self::new(
            &config.vendor,
            &config.name,
            &config.package_version,
            config.compatibility_level,
        )
    }
}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{} {}", self.vendor, self.name, self.version)
    }
}
