//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Library code only emits events. The binary builds one subscriber from
//! [`LogOptions`] and installs it at startup.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::errors::IterateError;

/// Where log lines go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogSink {
    #[default]
    Stderr,
    /// Appended to; created if absent.
    File(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Lower the threshold from INFO to DEBUG.
    pub debug: bool,
    pub sink: LogSink,
}

impl LogOptions {
    pub fn level(&self) -> Level {
        if self.debug { Level::DEBUG } else { Level::INFO }
    }
}

/// Build a subscriber for `options` without installing it.
pub fn subscriber(
    options: &LogOptions,
) -> Result<impl tracing::Subscriber + Send + Sync + 'static, IterateError> {
    let (writer, ansi) = match &options.sink {
        LogSink::Stderr => (
            BoxMakeWriter::new(std::io::stderr),
            std::io::stderr().is_terminal(),
        ),
        LogSink::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| IterateError::LogFile {
                    path: path.clone(),
                    source,
                })?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };

    Ok(fmt()
        .with_max_level(options.level())
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(ansi)
        .with_writer(writer)
        .finish())
}

/// Install the subscriber for `options` as the process-wide default.
///
/// Call once at startup.
pub fn init_logging(options: &LogOptions) -> anyhow::Result<()> {
    let subscriber = subscriber(options)?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
