use std::{
    fs::File,
    io::{self, IsTerminal, Write},
    sync::{Arc, Mutex, PoisonError},
};

pub const CLEAR_LINE: &str = "\x1b[2K";
pub const CURSOR_UP: &str = "\x1b[1A";

/// An output destination a spinner can render to.
///
/// Only sinks that report themselves as interactive ever receive animation
/// frames or control sequences. The default answer is `false`, so in-memory
/// buffers and wrappers stay free of escape codes unless they opt in.
pub trait Sink: Write + Send + 'static {
    fn is_interactive(&self) -> bool {
        false
    }
}

impl Sink for io::Stdout {
    fn is_interactive(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl Sink for io::Stderr {
    fn is_interactive(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl Sink for File {
    fn is_interactive(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl Sink for Vec<u8> {}

impl Sink for io::Sink {}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn is_interactive(&self) -> bool {
        (**self).is_interactive()
    }
}

/// True only when the sink is a handle attached to a terminal device.
pub fn is_terminal(sink: &dyn Sink) -> bool {
    sink.is_interactive()
}

/// Clears the current line and parks the cursor at its start, so the next
/// write overwrites it. Does nothing for non-interactive sinks.
pub fn erase_line(sink: &mut dyn Sink, interactive: bool) {
    if interactive {
        emit(sink, &format!("{CLEAR_LINE}\n{CURSOR_UP}"));
    }
}

/// Writes and flushes `text`. Write failures are logged and otherwise ignored.
pub fn emit(sink: &mut dyn Sink, text: &str) {
    if let Err(e) = sink.write_all(text.as_bytes()).and_then(|_| sink.flush()) {
        tracing::debug!("spinner write failed: {}", e);
    }
}

/// Cloneable in-memory sink. Every clone appends to the same buffer, so a
/// caller can hand one clone to a spinner and read the output through another.
#[derive(Clone, Default, Debug)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for SharedBuffer {}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeTty(SharedBuffer);

    impl Write for FakeTty {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink for FakeTty {
        fn is_interactive(&self) -> bool {
            true
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink for Broken {}

    #[cfg(test)]
    mod terminal_check {
        use super::*;

        #[test]
        fn test_buffers_are_not_terminals() {
            assert!(!is_terminal(&Vec::<u8>::new()));
            assert!(!is_terminal(&SharedBuffer::new()));
            assert!(!is_terminal(&io::sink()));
        }

        #[test]
        fn test_regular_file_is_not_terminal() {
            let file = tempfile::tempfile().unwrap();
            assert!(!is_terminal(&file));
        }

        #[test]
        fn test_boxed_sink_forwards_answer() {
            let boxed: Box<dyn Sink> = Box::new(FakeTty(SharedBuffer::new()));
            assert!(is_terminal(&boxed));
            let boxed: Box<dyn Sink> = Box::new(SharedBuffer::new());
            assert!(!is_terminal(&boxed));
        }
    }

    #[cfg(test)]
    mod erasing {
        use super::*;

        #[test]
        fn test_erase_line_on_terminal() {
            let buffer = SharedBuffer::new();
            let mut tty = FakeTty(buffer.clone());
            erase_line(&mut tty, true);
            assert_eq!(buffer.contents(), "\x1b[2K\n\x1b[1A");
        }

        #[test]
        fn test_erase_line_skipped_for_non_terminal() {
            let buffer = SharedBuffer::new();
            let mut sink = buffer.clone();
            erase_line(&mut sink, false);
            assert!(buffer.is_empty());
        }

        #[test]
        fn test_emit_swallows_write_errors() {
            let mut sink = Broken;
            emit(&mut sink, "lost");
        }
    }

    #[test]
    fn test_shared_buffer_clones_share_bytes() {
        let buffer = SharedBuffer::new();
        let mut writer = buffer.clone();
        write!(writer, "hello").unwrap();
        assert_eq!(buffer.contents(), "hello");
        assert_eq!(buffer.len(), 5);
    }
}
