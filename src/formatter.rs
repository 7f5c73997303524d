//! Log line formatter that stamps each event with the wall clock and the render tick.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

/// Rendered frames since startup.
static RENDER_TICKS: AtomicU64 = AtomicU64::new(0);

/// Only the low 16 bits are printed.
const TICK_MASK: u64 = 0xFFFF;

const TIMESTAMP: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:5]");

/// `HH:MM:SS.sssss 0xTICK LEVEL spans: target: fields`
pub struct CustomFormatter;

#[derive(Clone, Copy)]
enum Style {
    Dim,
    Bold,
    Color(&'static str),
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Dim => "\x1b[2m",
            Style::Bold => "\x1b[1m",
            Style::Color(code) => code,
        }
    }
}

fn styled(writer: &mut Writer<'_>, style: Style, value: impl fmt::Display) -> fmt::Result {
    if writer.has_ansi_escapes() {
        write!(writer, "{}{}\x1b[0m", style.code(), value)
    } else {
        write!(writer, "{}", value)
    }
}

fn level_style(level: &Level) -> (Style, &'static str) {
    match *level {
        Level::TRACE => (Style::Color("\x1b[35m"), "TRACE"),
        Level::DEBUG => (Style::Color("\x1b[34m"), "DEBUG"),
        Level::INFO => (Style::Color("\x1b[32m"), " INFO"),
        Level::WARN => (Style::Color("\x1b[33m"), " WARN"),
        Level::ERROR => (Style::Color("\x1b[31m"), "ERROR"),
    }
}

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();

        let timestamp = OffsetDateTime::now_utc().format(&TIMESTAMP).map_err(|_| fmt::Error)?;
        styled(&mut writer, Style::Dim, timestamp)?;
        writer.write_char(' ')?;

        styled(&mut writer, Style::Dim, format_args!("0x{:04X}", get_tick_count() & TICK_MASK))?;
        writer.write_char(' ')?;

        let (style, label) = level_style(meta.level());
        styled(&mut writer, style, label)?;
        writer.write_char(' ')?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                styled(&mut writer, Style::Bold, span.metadata().name())?;
                if let Some(fields) = span.extensions().get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        styled(&mut writer, Style::Bold, format_args!("{{{}}}", fields))?;
                    }
                }
                styled(&mut writer, Style::Dim, ":")?;
                writer.write_char(' ')?;
            }
        }

        styled(&mut writer, Style::Dim, format_args!("{}:", meta.target()))?;
        writer.write_char(' ')?;

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Advances the render tick. Called once per rendered frame.
pub fn increment_tick() {
    RENDER_TICKS.fetch_add(1, Ordering::Relaxed);
}

pub fn get_tick_count() -> u64 {
    RENDER_TICKS.load(Ordering::Relaxed)
}
