use std::fmt::{self as stdfmt, Write as _};
use std::path::Path;

use anyhow::Result;
use brabbel_config::{LogFormat, LoggingConfig};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::DefaultFields;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

// ---------------------------------------------------------------------------
// FileFields: separate field cache for the file layer
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FileFields(DefaultFields);

impl<'writer> fmt::FormatFields<'writer> for FileFields {
    fn format_fields<R: tracing_subscriber::field::RecordFields>(
        &self,
        writer: fmt::format::Writer<'writer>,
        fields: R,
    ) -> stdfmt::Result {
        self.0.format_fields(writer, fields)
    }
}

// ---------------------------------------------------------------------------
// DomainFormat: `domain` field rendered as a `[domain]` prefix
// ---------------------------------------------------------------------------

/// Plain-text formatter:
/// ```text
/// 2026-10-17T09:12:44.118Z  WARN [eval] rule evaluation failed rule=$age >= 18 error=unknown variable $age
/// ```
/// Events without a `domain` field are rendered without the prefix.
struct DomainFormat {
    timer: SystemTime,
    with_time: bool,
}

impl DomainFormat {
    fn new() -> Self {
        Self {
            timer: SystemTime,
            with_time: true,
        }
    }

    #[cfg(test)]
    fn without_time() -> Self {
        Self {
            timer: SystemTime,
            with_time: false,
        }
    }
}

impl<S, N> FormatEvent<S, N> for DomainFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> fmt::FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: fmt::format::Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        let ansi = writer.has_ansi_escapes();

        if self.with_time {
            if ansi {
                write!(writer, "\x1b[2m")?;
            }
            if self.timer.format_time(&mut writer).is_err() {
                write!(writer, "<unknown time>")?;
            }
            if ansi {
                write!(writer, "\x1b[0m")?;
            }
            write!(writer, " ")?;
        }

        let level = *event.metadata().level();
        if ansi {
            let color = match level {
                Level::ERROR => "31",
                Level::WARN => "33",
                Level::INFO => "32",
                Level::DEBUG => "34",
                Level::TRACE => "35",
            };
            write!(writer, "\x1b[{color}m{level:>5}\x1b[0m ")?;
        } else {
            write!(writer, "{level:>5} ")?;
        }

        let mut visitor = DomainExtractor::default();
        event.record(&mut visitor);

        if let Some(ref domain) = visitor.domain {
            if ansi {
                write!(writer, "\x1b[1;36m[{domain}]\x1b[0m ")?;
            } else {
                write!(writer, "[{domain}] ")?;
            }
        }

        write!(writer, "{}", visitor.message)?;
        if !visitor.other_fields.is_empty() {
            write!(writer, " {}", visitor.other_fields)?;
        }
        writeln!(writer)
    }
}

// ---------------------------------------------------------------------------
// DomainExtractor
// ---------------------------------------------------------------------------

#[derive(Default)]
struct DomainExtractor {
    domain: Option<String>,
    message: String,
    other_fields: String,
}

impl DomainExtractor {
    fn push_field(&mut self, name: &str, value: impl stdfmt::Display) {
        if !self.other_fields.is_empty() {
            self.other_fields.push(' ');
        }
        write!(&mut self.other_fields, "{name}={value}").ok();
    }
}

impl Visit for DomainExtractor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "domain" => self.domain = Some(value.to_string()),
            "message" => self.message = value.to_string(),
            name => self.push_field(name, format_args!("{value:?}")),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn stdfmt::Debug) {
        match field.name() {
            "domain" => {
                let s = format!("{value:?}");
                self.domain = Some(s.trim_matches('"').to_string());
            }
            "message" => {
                write!(&mut self.message, "{value:?}").ok();
            }
            name => self.push_field(name, format_args!("{value:?}")),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push_field(field.name(), value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push_field(field.name(), value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push_field(field.name(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push_field(field.name(), value);
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Initialise tracing with default settings, for commands run without a
/// rules file.
pub fn init_default() -> Result<Option<WorkerGuard>> {
    let cwd = std::env::current_dir()?;
    init_tracing(&LoggingConfig::default(), &cwd)
}

/// Initialise the `tracing` subscriber stack from [`LoggingConfig`].
///
/// The returned guard must be held until exit; dropping it flushes the
/// non-blocking file writer. `RUST_LOG` overrides the configured levels.
pub fn init_tracing(config: &LoggingConfig, base_dir: &Path) -> Result<Option<WorkerGuard>> {
    let env_directives = std::env::var("RUST_LOG").ok();
    let (layers, guard) = build_layers(config, base_dir, env_directives.as_deref())?;
    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(guard)
}

/// One filter per output layer; both apply the same directives.
fn build_filter(config: &LoggingConfig, env_directives: Option<&str>) -> Result<EnvFilter> {
    let directives = match env_directives {
        Some(d) => d.to_string(),
        None => config.directives(),
    };
    EnvFilter::try_new(&directives)
        .map_err(|e| anyhow::anyhow!("invalid log filter '{directives}': {e}"))
}

fn build_layers(
    config: &LoggingConfig,
    base_dir: &Path,
    env_directives: Option<&str>,
) -> Result<(Vec<BoxedLayer>, Option<WorkerGuard>)> {
    let is_json = config.format == LogFormat::Json;

    let filter = build_filter(config, env_directives)?;
    let stderr_layer: BoxedLayer = if is_json {
        fmt::layer()
            .json()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .event_format(DomainFormat::new())
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    };
    let mut layers = vec![stderr_layer];

    let mut guard = None;
    if let Some(ref file_path) = config.file {
        let resolved = if file_path.is_relative() {
            base_dir.join(file_path)
        } else {
            file_path.clone()
        };
        let dir = resolved
            .parent()
            .ok_or_else(|| anyhow::anyhow!("log file path has no parent directory"))?;
        std::fs::create_dir_all(dir)?;
        let file_name = resolved
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("log file path has no file name"))?
            .to_os_string();

        let (non_blocking, file_guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
        guard = Some(file_guard);

        let filter = build_filter(config, env_directives)?;
        let file_layer: BoxedLayer = if is_json {
            fmt::layer()
                .json()
                .fmt_fields(FileFields::default())
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .event_format(DomainFormat::new())
                .fmt_fields(FileFields::default())
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_filter(filter)
                .boxed()
        };
        layers.push(file_layer);
    }

    Ok((layers, guard))
}
