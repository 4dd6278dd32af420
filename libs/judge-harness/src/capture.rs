/// Capture Context - Scoped Output and Panic Containment
///
/// **Core Responsibility:**
/// Give each case invocation its own output buffer and make sure nothing the
/// candidate does during that invocation leaks into the next case or into
/// the report channel.
///
/// **Pieces:**
/// - `Capture`: fresh per-case buffer handed explicitly to the callable
/// - `CaseScope`: guard alive for exactly one invocation; while it lives,
///   panics on this thread are recorded instead of printed
/// - `truncate_stdout`: the 10KB cut applied to every captured buffer
///
/// The panic hook is process-wide but only diverts panics raised on a thread
/// that currently holds a `CaseScope`. Everything else goes to the hook that
/// was installed before ours.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::io;
use std::marker::PhantomData;
use std::panic;
use std::sync::Once;

/// Captured output above this many bytes is truncated
pub const STDOUT_LIMIT_BYTES: usize = 10240;

/// Appended after truncated output
pub const TRUNCATION_MARKER: &str = "\n[stdout truncated at 10KB]";

/// Bytes kept from a case's output; anything past this is dropped on write.
/// The slack past the limit lets a char that starts before the cut decode whole.
const CAPTURE_KEEP_BYTES: usize = STDOUT_LIMIT_BYTES + 4;

/// Per-case standard output buffer
///
/// Candidates write to it with `write!`/`writeln!` (via `std::io::Write`) or
/// the `print`/`println` helpers. Memory stays bounded no matter how much a
/// candidate prints.
#[derive(Debug, Default)]
pub struct Capture {
    buf: Vec<u8>,
    written: usize,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print(&mut self, text: impl AsRef<str>) {
        self.push(text.as_ref().as_bytes());
    }

    pub fn println(&mut self, text: impl AsRef<str>) {
        self.print(text);
        self.push(b"\n");
    }

    /// Total bytes written, including any that were dropped
    pub fn len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Consume the buffer into the `stdout` value of an outcome
    pub fn into_stdout(self) -> String {
        truncate_stdout(String::from_utf8_lossy(&self.buf).into_owned())
    }

    fn push(&mut self, data: &[u8]) {
        self.written = self.written.saturating_add(data.len());
        let room = CAPTURE_KEEP_BYTES.saturating_sub(self.buf.len());
        self.buf.extend_from_slice(&data[..data.len().min(room)]);
    }
}

impl io::Write for Capture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.push(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Cut captured text to `STDOUT_LIMIT_BYTES` and append the marker
///
/// The cut lands on the nearest char boundary at or below the limit so the
/// result stays valid UTF-8. ASCII output is cut at exactly the limit.
pub fn truncate_stdout(mut text: String) -> String {
    if text.len() <= STDOUT_LIMIT_BYTES {
        return text;
    }

    let mut cut = STDOUT_LIMIT_BYTES;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    text.push_str(TRUNCATION_MARKER);
    text
}

/// A panic raised by a candidate inside a `CaseScope`
#[derive(Debug)]
pub struct PanicReport {
    pub message: String,
    pub location: Option<String>,
    pub backtrace: Backtrace,
}

impl PanicReport {
    /// Fallback when the hook did not get to see the panic
    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        Self {
            message: payload_message(payload),
            location: None,
            backtrace: Backtrace::disabled(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = format!("Panic: {}", self.message);
        if let Some(location) = &self.location {
            out.push_str(&format!("\n  at {}", location));
        }
        out.push_str(&format!("\n\nstack backtrace:\n{}", self.backtrace));
        out
    }
}

thread_local! {
    static IN_CASE: Cell<bool> = const { Cell::new(false) };
    static LAST_PANIC: RefCell<Option<PanicReport>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if IN_CASE.with(Cell::get) {
                let report = PanicReport {
                    message: payload_message(info.payload()),
                    location: info.location().map(|l| l.to_string()),
                    backtrace: Backtrace::force_capture(),
                };
                LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(report));
            } else {
                previous(info);
            }
        }));
    });
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Guard covering exactly one candidate invocation
///
/// Entering clears any stale panic record and diverts panics on this thread;
/// dropping restores normal panic reporting on every exit path. The guard is
/// tied to the thread that created it.
pub struct CaseScope {
    _thread_bound: PhantomData<*const ()>,
}

impl CaseScope {
    pub fn enter() -> Self {
        install_panic_hook();
        LAST_PANIC.with(|slot| slot.borrow_mut().take());
        IN_CASE.with(|flag| flag.set(true));
        Self {
            _thread_bound: PhantomData,
        }
    }

    /// Panic details recorded during this scope, if the invocation panicked
    pub fn take_panic(&self, payload: &(dyn Any + Send)) -> PanicReport {
        LAST_PANIC
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_else(|| PanicReport::from_payload(payload))
    }
}

impl Drop for CaseScope {
    fn drop(&mut self) {
        IN_CASE.with(|flag| flag.set(false));
        LAST_PANIC.with(|slot| slot.borrow_mut().take());
    }
}
