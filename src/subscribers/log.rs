//! # LogWriter: human-readable status lines
//!
//! A subscriber that prints incoming [`Event`]s to stdout.
//!
//! ## Example output
//! ```text
//! [Pid]: 4242
//! [Command]: sleep
//! [Args]: [5]
//! [Cwd]: /srv/app
//! [Tty]: ??
//! [death] pid=4242
//! [hook] cmd="notify-send died"
//! [hook-done] cmd="notify-send died"
//! [restarted] pid=4250 cmd="sleep 5" strategy=respawn-new-session
//! [replacement-exited] pid=4250 status="exit status: 0"
//! [restart-disabled]
//! [shutdown-requested]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Renders one event as its status line, or `None` for events that print nothing.
pub(crate) fn render(e: &Event) -> Option<String> {
    let pid = e.pid.map(|p| p.as_raw());
    let line = match e.kind {
        EventKind::TargetResolved => e.descriptor.as_ref()?.to_string(),
        EventKind::DeathDetected => format!("[death] pid={}", pid?),
        EventKind::HookStarting => format!("[hook] cmd={:?}", e.command.as_deref()?),
        EventKind::HookFinished => format!("[hook-done] cmd={:?}", e.command.as_deref()?),
        EventKind::Restarted => format!(
            "[restarted] pid={} cmd={:?} strategy={}",
            pid?,
            e.command.as_deref().unwrap_or(""),
            e.strategy.map(|s| s.as_label()).unwrap_or("unknown"),
        ),
        EventKind::ReplacementExited => format!(
            "[replacement-exited] pid={} status={:?}",
            pid?,
            e.reason.as_deref().unwrap_or("unknown"),
        ),
        EventKind::RestartDisabled => "[restart-disabled]".to_string(),
        EventKind::RestartFailed => format!(
            "[restart-failed] err={:?}",
            e.reason.as_deref().unwrap_or("unknown")
        ),
        EventKind::ShutdownRequested => "[shutdown-requested]".to_string(),
        EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => return None,
    };
    Some(line)
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        if let Some(line) = render(e) {
            println!("{line}");
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

#[cfg(test)]
mod tests {
    use nix::unistd::Pid;

    use super::*;
    use crate::process::{ProcessDescriptor, Terminal};
    use crate::restart::{Placement, Strategy};

    #[test]
    fn restart_line_names_pid_command_and_strategy() {
        let ev = Event::new(EventKind::Restarted)
            .with_pid(Pid::from_raw(77))
            .with_command("sleep 5")
            .with_strategy(Strategy::Respawn(Placement::NewSession));
        assert_eq!(
            render(&ev).unwrap(),
            r#"[restarted] pid=77 cmd="sleep 5" strategy=respawn-new-session"#
        );
    }

    #[test]
    fn resolved_target_prints_descriptor_block() {
        let d = ProcessDescriptor {
            pid: Pid::from_raw(9),
            executable: "vim".into(),
            arguments: vec!["main.go".into()],
            working_dir: None,
            terminal: Terminal::Device("pts/3".into()),
        };
        let out = render(&Event::new(EventKind::TargetResolved).with_descriptor(&d)).unwrap();
        assert!(out.contains("[Pid]: 9"));
        assert!(out.contains("pts/3"));
    }

    #[test]
    fn subscriber_events_are_silent() {
        let ev = Event::subscriber_overflow("log-writer", "full");
        assert!(render(&ev).is_none());
    }
}
