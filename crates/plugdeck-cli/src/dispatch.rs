use std::collections::BTreeMap;

use crate::profile_flows::{
    run_add, run_destroy, run_get, run_new, run_rm, run_set, run_show, ProfileContext,
};
use crate::render::{render_status_line, OutputStyle, Status};

pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_PARSE_FAILURE: u8 = 10;
pub(crate) const EXIT_HANDLER_FAILURE: u8 = 11;

pub(crate) const PROFILE_USAGE: &str = "\
Usage
  profile [get]
    Get current profile name

  profile set {name}
    Set profile name

  profile show {name}
    Show profile info

  profile new {name}
    Create new profile

  profile destroy {name}
    Delete profile

  profile add {name} {repository} [{repository2} ...]
    Add one or more repositories to profile

  profile rm {name} {repository} [{repository2} ...]
    Remove one or more repositories from profile

Description
  Subcommands about profile feature";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OutputLine {
    Plain(String),
    Info(String),
    Warn(String),
}

/// Result of one command invocation.
///
/// `UsageProblem` prints usage plus the message and still exits successfully;
/// `InvalidArguments` and `Fatal` exit non-zero with distinct codes.
#[derive(Debug)]
pub(crate) enum CommandOutcome {
    Ok(Vec<OutputLine>),
    UsageProblem(String),
    InvalidArguments(String),
    Fatal(anyhow::Error),
}

impl CommandOutcome {
    pub(crate) fn from_result(result: anyhow::Result<Vec<OutputLine>>) -> Self {
        match result {
            Ok(lines) => Self::Ok(lines),
            Err(err) => Self::Fatal(err),
        }
    }
}

pub(crate) fn exit_code(outcome: &CommandOutcome) -> u8 {
    match outcome {
        CommandOutcome::Ok(_) | CommandOutcome::UsageProblem(_) => EXIT_SUCCESS,
        CommandOutcome::InvalidArguments(_) => EXIT_PARSE_FAILURE,
        CommandOutcome::Fatal(_) => EXIT_HANDLER_FAILURE,
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct RenderedOutput {
    pub(crate) stdout: Vec<String>,
    pub(crate) stderr: Vec<String>,
}

pub(crate) fn render_outcome(outcome: &CommandOutcome, style: OutputStyle) -> RenderedOutput {
    let mut rendered = RenderedOutput::default();
    match outcome {
        CommandOutcome::Ok(lines) => {
            rendered.stdout = lines
                .iter()
                .map(|line| match line {
                    OutputLine::Plain(text) => text.clone(),
                    OutputLine::Info(text) => render_status_line(style, Status::Info, text),
                    OutputLine::Warn(text) => render_status_line(style, Status::Warn, text),
                })
                .collect();
        }
        CommandOutcome::UsageProblem(message) => {
            rendered.stdout.extend(PROFILE_USAGE.lines().map(str::to_string));
            rendered.stdout.push(String::new());
            rendered
                .stdout
                .push(render_status_line(style, Status::Error, message));
        }
        CommandOutcome::InvalidArguments(message) => {
            rendered
                .stderr
                .push(render_status_line(style, Status::Error, message));
        }
        CommandOutcome::Fatal(err) => {
            rendered
                .stderr
                .push(render_status_line(style, Status::Error, &format!("{err:#}")));
        }
    }
    rendered
}

pub(crate) fn emit_outcome(outcome: &CommandOutcome, style: OutputStyle) {
    let rendered = render_outcome(outcome, style);
    for line in rendered.stdout {
        println!("{line}");
    }
    for line in rendered.stderr {
        eprintln!("{line}");
    }
}

pub(crate) type ProfileHandler = fn(&ProfileContext<'_>, &[String]) -> CommandOutcome;

/// Immutable subcommand-name to handler mapping, built once per process.
pub(crate) struct ProfileCommandTable {
    handlers: BTreeMap<&'static str, ProfileHandler>,
}

impl ProfileCommandTable {
    pub(crate) fn standard() -> Self {
        let entries: [(&'static str, ProfileHandler); 7] = [
            ("get", run_get),
            ("set", run_set),
            ("show", run_show),
            ("new", run_new),
            ("destroy", run_destroy),
            ("add", run_add),
            ("rm", run_rm),
        ];
        Self {
            handlers: entries.into_iter().collect(),
        }
    }

    pub(crate) fn handler(&self, name: &str) -> Option<ProfileHandler> {
        self.handlers.get(name).copied()
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }
}

fn is_help_token(arg: &str) -> bool {
    matches!(arg, "-h" | "-help" | "--help")
}

pub(crate) fn dispatch_profile(
    table: &ProfileCommandTable,
    ctx: &ProfileContext<'_>,
    args: &[String],
) -> CommandOutcome {
    let Some((subcommand, rest)) = args.split_first() else {
        return match table.handler("get") {
            Some(handler) => handler(ctx, &[]),
            None => CommandOutcome::InvalidArguments("unknown subcommand: get".to_string()),
        };
    };

    if is_help_token(subcommand) {
        return CommandOutcome::Ok(
            PROFILE_USAGE
                .lines()
                .map(|line| OutputLine::Plain(line.to_string()))
                .collect(),
        );
    }

    match table.handler(subcommand) {
        Some(handler) => {
            tracing::debug!(subcommand = subcommand.as_str(), "dispatching profile command");
            handler(ctx, rest)
        }
        None => CommandOutcome::InvalidArguments(format!(
            "unknown subcommand: {subcommand} (expected one of: {})",
            table.names().collect::<Vec<_>>().join(", ")
        )),
    }
}
