//! Log session
//!
//! Every event goes to the console and to an append-only, colourless log
//! file. The session is installed as the thread's default subscriber and
//! flushes the file when closed or dropped.
//!
//! A session can start before the log file is known (the path comes from
//! the configuration being loaded). Events emitted until then are held in
//! memory and written out once a file is attached.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::dispatcher::DefaultGuard;
use tracing_subscriber::field::RecordFields;
use tracing_subscriber::fmt::format::{DefaultFields, Writer};
use tracing_subscriber::fmt::FormatFields;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

type SharedSink = Arc<Mutex<Sink>>;

/// Console + file logging for the lifetime of one executable run
pub struct LogSession {
    path: Option<PathBuf>,
    sink: SharedSink,
    _guard: DefaultGuard,
}

impl LogSession {
    /// Install console logging and buffer file output until [`attach`](Self::attach).
    ///
    /// `RUST_LOG` is honoured; the default level is `info`.
    pub fn start() -> Self {
        let sink: SharedSink = Arc::new(Mutex::new(Sink::Pending(Vec::new())));

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let writer = sink.clone();

        let subscriber = Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .fmt_fields(PlainFields::default())
                    .with_writer(move || SinkWriter(writer.clone())),
            );

        LogSession {
            path: None,
            sink,
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }

    /// Start a session writing to `path` right away
    pub fn open(path: &Path) -> io::Result<Self> {
        let mut session = Self::start();
        session.attach(path)?;
        Ok(session)
    }

    /// Open (or create) `path` in append mode and route file output to it.
    ///
    /// Buffered events are written first. Attaching again switches files.
    pub fn attach(&mut self, path: &Path) -> io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut file = BufWriter::new(file);

        let mut sink = self.sink.lock().map_err(poisoned)?;
        match &mut *sink {
            Sink::Pending(pending) => file.write_all(pending)?,
            Sink::File(current) => current.flush()?,
        }
        *sink = Sink::File(file);
        drop(sink);

        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Attached log file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Push buffered lines to disk
    pub fn flush(&self) -> io::Result<()> {
        self.sink.lock().map_err(poisoned)?.flush()
    }

    /// Flush and uninstall the session
    pub fn close(self) -> io::Result<()> {
        self.flush()
    }
}

impl Drop for LogSession {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Destination of the file layer
enum Sink {
    /// Output recorded before a file was attached
    Pending(Vec<u8>),
    File(BufWriter<File>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Pending(pending) => {
                pending.extend_from_slice(buf);
                Ok(buf.len())
            }
            Sink::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Pending(_) => Ok(()),
            Sink::File(file) => file.flush(),
        }
    }
}

/// Per-event handle onto the shared sink
struct SinkWriter(SharedSink);

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().map_err(poisoned)?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().map_err(poisoned)?.flush()
    }
}

/// Field formatter of the file layer.
///
/// Formatted span fields are cached per formatter type, so the file layer
/// needs a type of its own or it reuses the console's coloured fields.
#[derive(Debug, Default)]
struct PlainFields(DefaultFields);

impl<'writer> FormatFields<'writer> for PlainFields {
    fn format_fields<R: RecordFields>(&self, writer: Writer<'writer>, fields: R) -> std::fmt::Result {
        self.0.format_fields(writer, fields)
    }
}

fn poisoned<T>(_: T) -> io::Error {
    io::Error::new(io::ErrorKind::Other, "log file lock poisoned")
}
