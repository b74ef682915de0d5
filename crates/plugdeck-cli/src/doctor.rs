use anyhow::Result;
use plugdeck_store::{GuardStatus, MarkerFileGuard, StateLayout};

use crate::dispatch::OutputLine;

pub(crate) fn guard_health_line(status: GuardStatus) -> String {
    match status {
        GuardStatus::Free => "transaction lock: free".to_string(),
        GuardStatus::Held(holder) => format!("transaction lock: held ({holder})"),
        GuardStatus::Stale(holder) => {
            format!("transaction lock: stale ({holder}); the next mutating command reclaims it")
        }
        GuardStatus::Unreadable => {
            "transaction lock: unreadable; remove it manually if no plugdeck command is running"
                .to_string()
        }
    }
}

pub(crate) fn doctor_lines(layout: &StateLayout, guard: &MarkerFileGuard) -> Result<Vec<OutputLine>> {
    let status = guard.inspect()?;
    let mut lines = vec![
        OutputLine::Plain(format!("home: {}", layout.home().display())),
        OutputLine::Plain(format!("state: {}", layout.state_path().display())),
        OutputLine::Plain(format!("lock: {}", guard.path().display())),
    ];
    lines.push(match status {
        GuardStatus::Free => OutputLine::Info(guard_health_line(status)),
        _ => OutputLine::Warn(guard_health_line(status)),
    });
    Ok(lines)
}
