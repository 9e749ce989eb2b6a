// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal output: color selection, log formatting and stdout capture.

use clap::{
    Args, ValueEnum,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use miette::{GraphicalTheme, MietteHandlerOpts, ThemeCharacters, ThemeStyles};
use owo_colors::{OwoColorize, Style, style};
use std::{
    fmt,
    io::{self, BufWriter, Write},
    sync::Once,
};
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    level_filters::LevelFilter,
    warn,
};
use tracing_subscriber::{
    Layer,
    filter::Targets,
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// The log target for messages that are printed without an `error:`/`warning:` heading.
pub(crate) const NO_HEADING: &str = "railsync::no_heading";

/// The environment variable holding a log filter, in `tracing_subscriber::filter::Targets` syntax.
const LOG_ENV: &str = "RAILSYNC_LOG";

pub(crate) const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default())
    .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
    .valid(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .invalid(AnsiColor::Yellow.on_default().effects(Effects::BOLD));

#[derive(Copy, Clone, Debug, Args)]
#[must_use]
pub(crate) struct OutputOpts {
    /// Verbose output
    #[arg(long, short, global = true, env = "RAILSYNC_VERBOSE")]
    verbose: bool,

    /// Produce color output: auto, always, never
    #[arg(
        long,
        value_enum,
        default_value_t,
        hide_possible_values = true,
        global = true,
        value_name = "WHEN",
        env = "RAILSYNC_COLOR"
    )]
    color: Color,
}

impl OutputOpts {
    /// Installs the log subscriber and the miette hook, and returns the resulting context.
    pub(crate) fn init(self) -> OutputContext {
        static INIT: Once = Once::new();

        let colorize_stderr = self.color.should_colorize(supports_color::Stream::Stderr);
        let verbose = self.verbose;
        INIT.call_once(|| {
            init_logging(colorize_stderr, verbose);
            install_miette_hook(colorize_stderr);
        });

        OutputContext { color: self.color }
    }
}

fn init_logging(colorize: bool, verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let filter = std::env::var(LOG_ENV).ok().filter(|s| !s.is_empty());
    let (targets, invalid_filter) = match filter.as_deref().map(str::parse::<Targets>) {
        Some(Ok(targets)) => (targets, None),
        Some(Err(error)) => (Targets::new().with_default(default_level), Some(error)),
        None => (Targets::new().with_default(default_level), None),
    };

    let layer = tracing_subscriber::fmt::layer()
        .event_format(HeadingFormatter {
            headings: LevelHeadings::new(colorize),
        })
        .with_writer(io::stderr)
        .with_filter(targets);
    tracing_subscriber::registry().with(layer).init();

    if let Some(error) = invalid_filter {
        warn!("ignoring invalid {LOG_ENV} value: {error}");
    }
}

fn install_miette_hook(colorize: bool) {
    let result = miette::set_hook(Box::new(move |_| {
        let characters = if supports_unicode::on(supports_unicode::Stream::Stderr) {
            ThemeCharacters::unicode()
        } else {
            ThemeCharacters::ascii()
        };
        let styles = if colorize {
            ThemeStyles::ansi()
        } else {
            ThemeStyles::none()
        };
        let theme = GraphicalTheme {
            characters: ThemeCharacters {
                error: "error:".into(),
                ..characters
            },
            styles,
        };
        Box::new(MietteHandlerOpts::new().graphical_theme(theme).build())
    }));
    if result.is_err() {
        warn!("a diagnostic hook was already installed");
    }
}

/// The output settings chosen on the command line.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct OutputContext {
    pub(crate) color: Color,
}

impl OutputContext {
    /// Returns styles for errors printed to stderr.
    pub fn stderr_styles(&self) -> StderrStyles {
        StderrStyles::new(self.color.should_colorize(supports_color::Stream::Stderr))
    }

    /// Returns styles for records printed to stdout.
    pub(crate) fn record_styles(&self) -> RecordStyles {
        RecordStyles::new(self.color.should_colorize(supports_color::Stream::Stdout))
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
#[must_use]
pub enum Color {
    #[default]
    Auto,
    Always,
    Never,
}

impl Color {
    fn should_colorize(self, stream: supports_color::Stream) -> bool {
        match self {
            Color::Auto => supports_color::on_cached(stream).is_some(),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

/// Formats each event on a single line, prefixed with its level unless it targets [`NO_HEADING`].
struct HeadingFormatter {
    headings: LevelHeadings,
}

impl<S, N> FormatEvent<S, N> for HeadingFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        if metadata.target() != NO_HEADING {
            let (heading, style) = self.headings.for_level(*metadata.level());
            write!(writer, "{}: ", heading.style(style))?;
        }

        let mut message = MessageWriter {
            writer: &mut writer,
            result: Ok(()),
        };
        event.record(&mut message);
        message.result?;

        writeln!(writer)
    }
}

/// Writes the `message` field of an event, ignoring all other fields.
struct MessageWriter<'a, 'w> {
    writer: &'a mut format::Writer<'w>,
    result: fmt::Result,
}

impl Visit for MessageWriter<'_, '_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" && self.result.is_ok() {
            self.result = write!(self.writer, "{value:?}");
        }
    }
}

#[derive(Debug, Default)]
struct LevelHeadings {
    error: Style,
    warning: Style,
    info: Style,
    debug: Style,
    trace: Style,
}

impl LevelHeadings {
    fn new(colorize: bool) -> Self {
        if !colorize {
            return Self::default();
        }
        Self {
            error: style().red().bold(),
            warning: style().yellow().bold(),
            info: style().bold(),
            debug: style().bold(),
            trace: style().dimmed(),
        }
    }

    fn for_level(&self, level: Level) -> (&'static str, Style) {
        match level {
            Level::ERROR => ("error", self.error),
            Level::WARN => ("warning", self.warning),
            Level::INFO => ("info", self.info),
            Level::DEBUG => ("debug", self.debug),
            Level::TRACE => ("trace", self.trace),
        }
    }
}

/// Styles for errors printed to stderr.
#[derive(Debug, Default)]
pub struct StderrStyles {
    pub(crate) bold: Style,
    pub(crate) hint: Style,
}

impl StderrStyles {
    fn new(colorize: bool) -> Self {
        if colorize {
            Self {
                bold: style().bold(),
                hint: style().cyan(),
            }
        } else {
            Self::default()
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordStyles {
    pub(crate) case_id: Style,
    pub(crate) passed: Style,
    pub(crate) failed: Style,
}

impl RecordStyles {
    fn new(colorize: bool) -> Self {
        if colorize {
            Self {
                case_id: style().bold(),
                passed: style().green().bold(),
                failed: style().red().bold(),
            }
        } else {
            Self::default()
        }
    }
}

/// Where command output goes.
///
/// Tests capture output into a buffer instead of writing to the process's stdout.
#[derive(Debug, Default)]
pub enum OutputWriter {
    /// Write to stdout.
    #[default]
    Stdout,

    /// Append to an in-memory buffer.
    #[cfg(test)]
    Buffer(Vec<u8>),
}

impl OutputWriter {
    pub(crate) fn stdout_writer(&mut self) -> Box<dyn Write + '_> {
        match self {
            Self::Stdout => Box::new(BufWriter::new(io::stdout().lock())),
            #[cfg(test)]
            Self::Buffer(buf) => Box::new(buf),
        }
    }
}
