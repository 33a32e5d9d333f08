use crate::configs::logging::LoggingConfig;
use crate::error::RelayError;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::{info, trace, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Layer, Registry};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const EARLY_LEVEL: &str = "info";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;
type LayerReloadHandle = reload::Handle<BoxedLayer, Registry>;
type FilterReloadHandle = reload::Handle<EnvFilter, Layered<Vec<BoxedLayer>, Registry>>;

// Keeps events emitted before the log file is known, so they can be replayed into it.
#[derive(Clone, Default)]
struct EarlyLogBuffer(Arc<Mutex<Vec<String>>>);

impl EarlyLogBuffer {
    fn dump_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut lines = self.0.lock().map_err(|_| poisoned())?;
        for line in lines.drain(..) {
            writer.write_all(line.as_bytes())?;
        }
        writer.flush()
    }

    fn clear(&self) {
        if let Ok(mut lines) = self.0.lock() {
            lines.clear();
        }
    }
}

struct EarlyLogWriter(Arc<Mutex<Vec<String>>>);

impl Write for EarlyLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut lines = self.0.lock().map_err(|_| poisoned())?;
        lines.push(String::from_utf8_lossy(buf).into_owned());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for EarlyLogBuffer {
    type Writer = EarlyLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        EarlyLogWriter(self.0.clone())
    }
}

fn poisoned() -> io::Error {
    io::Error::other("early log buffer is poisoned")
}

/// Process wide tracing setup, done in two steps.
///
/// [`Logging::early_init`] installs the subscriber before the configuration is
/// loaded: events go to stdout at `info` and are also kept in memory.
/// [`Logging::late_init`] applies the configured level and, when `path` is set,
/// opens the daily rolling log file and replays the kept events into it.
///
/// Keep the value alive for the lifetime of the process, dropping it stops the
/// background file writer.
pub struct Logging {
    early_logs: EarlyLogBuffer,
    file_reload_handle: Option<LayerReloadHandle>,
    filter_reload_handle: Option<FilterReloadHandle>,
    _file_guard: Option<WorkerGuard>,
}

impl Logging {
    pub fn new() -> Self {
        Self {
            early_logs: EarlyLogBuffer::default(),
            file_reload_handle: None,
            filter_reload_handle: None,
            _file_guard: None,
        }
    }

    pub fn early_init(&mut self) -> Result<(), RelayError> {
        self.subscriber()?
            .try_init()
            .map_err(|error| RelayError::LoggingInitFailure(error.to_string()))
    }

    pub fn late_init(
        &mut self,
        component: &str,
        config: &LoggingConfig,
    ) -> Result<(), RelayError> {
        trace!("Logging config: {config}");
        let filter = Self::get_filter(&config.level)?;
        self.filter_reload_handle
            .as_ref()
            .ok_or_else(|| reload_failure("filter", "early_init was not called"))?
            .modify(|layer| *layer = filter)
            .map_err(|error| reload_failure("filter", error))?;

        let file_layer: BoxedLayer = if config.path.is_empty() {
            self.early_logs.clear();
            fmt::Layer::default().with_writer(io::sink).boxed()
        } else {
            let file_appender = tracing_appender::rolling::daily(&config.path, &config.file_prefix);
            let (mut non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            self.early_logs
                .dump_to(&mut non_blocking)
                .map_err(|error| RelayError::LoggingInitFailure(error.to_string()))?;
            self._file_guard = Some(guard);
            fmt::Layer::default()
                .with_target(true)
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed()
        };
        self.file_reload_handle
            .as_ref()
            .ok_or_else(|| reload_failure("file", "early_init was not called"))?
            .modify(|layer| *layer = file_layer)
            .map_err(|error| reload_failure("file", error))?;

        info!("{component} version: {VERSION}, logging config: {config}");
        Ok(())
    }

    fn subscriber(&mut self) -> Result<impl Subscriber + Send + Sync + 'static, RelayError> {
        let early_file_layer: BoxedLayer = fmt::Layer::default()
            .with_target(true)
            .with_ansi(false)
            .with_writer(self.early_logs.clone())
            .boxed();
        let (file_layer, file_reload_handle) = reload::Layer::new(early_file_layer);
        self.file_reload_handle = Some(file_reload_handle);

        let layers: Vec<BoxedLayer> = vec![
            fmt::Layer::default().with_target(true).boxed(),
            file_layer.boxed(),
        ];

        let (filter, filter_reload_handle) = reload::Layer::new(Self::get_filter(EARLY_LEVEL)?);
        self.filter_reload_handle = Some(filter_reload_handle);

        Ok(Registry::default().with(layers).with(filter))
    }

    // RUST_LOG always takes precedence over config.
    fn get_filter(level: &str) -> Result<EnvFilter, RelayError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(level).map_err(|error| {
                RelayError::LoggingInitFailure(format!("invalid log level: {level}, {error}"))
            }),
        }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self::new()
    }
}

fn reload_failure(layer: &str, error: impl std::fmt::Display) -> RelayError {
    RelayError::LoggingInitFailure(format!("cannot reload {layer} layer: {error}"))
}
