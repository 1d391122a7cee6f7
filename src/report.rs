use crate::session::{InstallationOutcome, Session};
use serde_json::{json, Value};

/// Process exit status for an outcome: 0 committed, 1 aborted.
pub fn exit_status(outcome: &InstallationOutcome) -> u8 {
    match outcome {
        InstallationOutcome::Committed => 0,
        InstallationOutcome::Aborted(_) => 1,
    }
}

/// One human readable line.
pub fn text_report(outcome: &InstallationOutcome, session: &Session) -> String {
    match outcome {
        InstallationOutcome::Committed => format!("{} installer launched", session.descriptor()),
        InstallationOutcome::Aborted(reason) => {
            format!("{} not installed: {}", session.descriptor(), reason)
        }
    }
}

/// The `--report json` object.
pub fn json_report(outcome: &InstallationOutcome, session: &Session) -> Value {
    let (label, reason) = match outcome {
        InstallationOutcome::Committed => ("committed", None),
        InstallationOutcome::Aborted(reason) => ("aborted", Some(reason.to_string())),
    };

    json!({
        "run_id": session.id(),
        "package": session.descriptor(),
        "outcome": label,
        "reason": reason,
        "staged_file": session.staged_file().map(|path| path.display().to_string()),
    })
}
