use anstyle::{AnsiColor, Effects, Style};

use crate::config::ColorChoice;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Status {
    Info,
    Warn,
    Error,
}

impl Status {
    fn badge(self) -> &'static str {
        match self {
            Self::Info => "[INFO]",
            Self::Warn => "[WARN]",
            Self::Error => "[ERROR]",
        }
    }

    fn style(self) -> Style {
        let color = match self {
            Self::Info => AnsiColor::BrightGreen,
            Self::Warn => AnsiColor::BrightYellow,
            Self::Error => AnsiColor::BrightRed,
        };
        Style::new()
            .fg_color(Some(color.into()))
            .effects(Effects::BOLD)
    }
}

pub(crate) fn resolve_output_style(
    choice: ColorChoice,
    stdout_is_tty: bool,
    no_color: bool,
) -> OutputStyle {
    match choice {
        ColorChoice::Always => OutputStyle::Rich,
        ColorChoice::Never => OutputStyle::Plain,
        ColorChoice::Auto if stdout_is_tty && !no_color => OutputStyle::Rich,
        ColorChoice::Auto => OutputStyle::Plain,
    }
}

/// The badge is part of the output contract in both styles; only `Rich` colours it.
pub(crate) fn render_status_line(style: OutputStyle, status: Status, message: &str) -> String {
    match style {
        OutputStyle::Plain => format!("{} {message}", status.badge()),
        OutputStyle::Rich => format!("{} {message}", colorize(status.style(), status.badge())),
    }
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
