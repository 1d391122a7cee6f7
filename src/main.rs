use lib::config::{get_config, ReportFormat};
use lib::installer::Installer;
use lib::report::{exit_status, json_report, text_report};
use lib::utils::initialize_logger;
use log::{error, info};
use std::process::ExitCode;

extern crate log;

#[tokio::main]
async fn main() -> ExitCode {
    let config = get_config();
    initialize_logger(config);

    let installer = match Installer::from_config(config) {
        Ok(installer) => installer,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        }
    };

    let (outcome, session) = installer.run_session().await;
    match config.report {
        ReportFormat::Text if outcome.is_committed() => info!("{}", text_report(&outcome, &session)),
        ReportFormat::Text => error!("{}", text_report(&outcome, &session)),
        ReportFormat::Json => println!("{}", json_report(&outcome, &session)),
    }

    ExitCode::from(exit_status(&outcome))
}
