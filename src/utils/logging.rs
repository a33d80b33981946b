//! Tracing setup and the process-wide diagnostic sink.
//!
//! Diagnostics never go to the terminal while the chat UI owns it. The chat
//! session writes to the `--log` file, or to `agentchat.log` in the local
//! data directory when no file is given.

use std::cell::Cell;
use std::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use directories::ProjectDirs;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding a tracing filter directive.
pub const LOG_FILTER_ENV: &str = "AGENTCHAT_LOG";
const DEFAULT_FILTER: &str = "agentchat=info";
const DEFAULT_LOG_FILE: &str = "agentchat.log";

/// Where diagnostic output goes for this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    File(PathBuf),
    Stderr,
    /// No platform data directory could be found.
    Discard,
}

impl LogSink {
    /// The interactive UI cannot share the terminal with log output, so it
    /// always logs to a file.
    pub fn for_interactive(log_file: Option<&Path>) -> Self {
        match log_file {
            Some(path) => LogSink::File(path.to_path_buf()),
            None => default_log_path()
                .map(LogSink::File)
                .unwrap_or(LogSink::Discard),
        }
    }

    pub fn for_batch(log_file: Option<&Path>) -> Self {
        log_file
            .map(|path| LogSink::File(path.to_path_buf()))
            .unwrap_or(LogSink::Stderr)
    }
}

pub fn default_log_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "agentchat", "agentchat")
        .map(|dirs| dirs.data_local_dir().join(DEFAULT_LOG_FILE))
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init_tracing(sink: LogSink) -> Result<(), Box<dyn Error>> {
    match sink {
        LogSink::File(path) => {
            let file = open_log_file(&path)?;
            tracing_subscriber::registry()
                .with(env_filter())
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(true)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()?;
        }
        LogSink::Stderr => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init()?;
        }
        LogSink::Discard => {}
    }
    Ok(())
}

thread_local! {
    static CONTAINED: Cell<bool> = const { Cell::new(false) };
}

/// Run `f`, catching any panic it raises.
///
/// While `f` runs the diagnostic sink only logs the panic; it does not
/// restore the terminal or print to stderr, since the caller recovers.
pub fn contain_panics<R>(f: impl FnOnce() -> R) -> std::thread::Result<R> {
    let previous = CONTAINED.with(|flag| flag.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CONTAINED.with(|flag| flag.set(previous));
    result
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = info
        .payload()
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| info.payload().downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<non-string panic payload>".to_string());
    match info.location() {
        Some(location) => format!("{payload} at {location}"),
        None => payload,
    }
}

static SINK: Once = Once::new();

/// The UI runs on the main thread, so a panic there ends the process.
/// Panics on runtime worker threads only fail the task they occur in.
fn is_fatal_thread() -> bool {
    std::thread::current().name() == Some("main")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanicRoute {
    /// Record through tracing only.
    Log,
    /// Record, then hand to the previously installed hook.
    Forward,
    /// Leave raw mode first, then forward.
    RestoreAndForward,
}

/// `recorded` is whether a tracing subscriber will capture the log event.
fn route_panic(contained: bool, fatal_thread: bool, recorded: bool) -> PanicRoute {
    if contained {
        PanicRoute::Log
    } else if fatal_thread {
        PanicRoute::RestoreAndForward
    } else if recorded {
        PanicRoute::Log
    } else {
        PanicRoute::Forward
    }
}

/// Register the process-wide panic hook. Later calls are no-ops.
///
/// Every panic is logged. A panic that ends the process runs `restore` (used
/// to leave raw mode) and then the previously installed hook. Other
/// uncaught panics reach the previous hook only when no subscriber records
/// them.
pub fn install_diagnostic_sink(restore: fn()) {
    SINK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let message = panic_message(info);
            let contained = CONTAINED.with(Cell::get);
            let route = route_panic(
                contained,
                is_fatal_thread(),
                tracing::dispatcher::has_been_set(),
            );
            match route {
                PanicRoute::Log if contained => error!(panic = %message, "Contained panic"),
                PanicRoute::Log => error!(panic = %message, "Panic in background task"),
                PanicRoute::Forward => {
                    error!(panic = %message, "Panic in background task");
                    previous(info);
                }
                PanicRoute::RestoreAndForward => {
                    error!(panic = %message, "Unhandled panic");
                    restore();
                    previous(info);
                }
            }
        }));
    });
}
