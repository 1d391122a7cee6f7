use clap::{Parser, ValueEnum};
use log::LevelFilter;
use once_cell::sync::Lazy;

// Returns a reference to a lazily created Config object.
static CONFIG: Lazy<Config> = Lazy::new(|| {
    if cfg!(test) {
        Config {
            log_level: LevelFilter::Error,
            vendor: String::from("Acme"),
            name: String::from("Widget"),
            package_version: String::from("1.0"),
            compatibility_level: 1,
            url: String::from("http://127.0.0.1:8000/widget-1.0-setup.exe"),
            staging_category: String::from("temporary"),
            connect_timeout: 5,
            fetch_timeout: 30,
            report: ReportFormat::Text,
        }
    } else {
        Config::parse()
    }
});

pub fn get_config() -> &'static Config {
    &CONFIG
}

/// How the final outcome is printed on stdout.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Log level (error, warn, info, debug and trace), defaults to info
    #[arg(short, long, default_value("info"), env("LOG_LEVEL"))]
    pub log_level: LevelFilter,

    /// Vendor (publisher) of the package
    #[arg(long, env("SI_VENDOR"))]
    pub vendor: String,

    /// Package name
    #[arg(long, env("SI_NAME"))]
    pub name: String,

    /// Opaque version label, only used for identification
    #[arg(long, env("SI_PACKAGE_VERSION"))]
    pub package_version: String,

    #[arg(long, default_value("1"), env("SI_COMPATIBILITY_LEVEL"))]
    pub compatibility_level: i32,

    /// Where the installer executable is downloaded from (http or https)
    #[arg(short, long, env("SI_URL"))]
    pub url: String,

    /// Folder category used for staging (temporary or home)
    #[arg(long, default_value("temporary"), env("SI_STAGING_CATEGORY"))]
    pub staging_category: String,

    /// Seconds allowed to establish the connection
    #[arg(long, default_value("30"), env("SI_CONNECT_TIMEOUT"))]
    pub connect_timeout: u64,

    /// Seconds allowed for the whole download
    #[arg(long, default_value("600"), env("SI_FETCH_TIMEOUT"))]
    pub fetch_timeout: u64,

    #[arg(long, value_enum, default_value("text"), env("SI_REPORT"))]
    pub report: ReportFormat,
}
