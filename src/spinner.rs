use std::{
    io,
    sync::{Mutex, MutexGuard, Once, PoisonError},
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{debug, trace, warn};

use crate::{
    charset::Charset,
    signal::CancelSignal,
    term::{self, Sink},
};

pub const DEFAULT_CONCLUDED_GLYPH: &str = "✔";
pub const DEFAULT_FRAME_RATE: Duration = Duration::from_millis(150);

/// Collects spinner options. Each call overwrites the field it sets, so when the
/// same option is given twice the later one wins.
pub struct SpinnerBuilder {
    label: String,
    glyphs: Vec<String>,
    concluded_glyph: String,
    frame_rate: Duration,
    sink: Box<dyn Sink>,
}

impl SpinnerBuilder {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            glyphs: Charset::Braille.glyphs(),
            concluded_glyph: DEFAULT_CONCLUDED_GLYPH.to_string(),
            frame_rate: DEFAULT_FRAME_RATE,
            sink: Box::new(io::stdout()),
        }
    }

    /// Replaces the animation frames. An empty sequence is accepted; such a
    /// spinner never animates but still prints its concluded line.
    pub fn charset<I, S>(mut self, glyphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.glyphs = glyphs.into_iter().map(Into::into).collect();
        self
    }

    pub fn preset(self, charset: Charset) -> Self {
        self.charset(charset.frames().iter().copied())
    }

    pub fn classic_charset(self) -> Self {
        self.preset(Charset::Classic)
    }

    pub fn arrows_charset(self) -> Self {
        self.preset(Charset::Arrows)
    }

    pub fn circles_charset(self) -> Self {
        self.preset(Charset::Circles)
    }

    pub fn blocks_charset(self) -> Self {
        self.preset(Charset::Blocks)
    }

    pub fn concluded_glyph(mut self, glyph: impl Into<String>) -> Self {
        self.concluded_glyph = glyph.into();
        self
    }

    pub fn frame_rate(mut self, frame_rate: Duration) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn writer<S: Sink>(mut self, sink: S) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Finalizes the spinner. Terminal detection runs here, once, against the
    /// sink that survived all the options.
    pub fn build(self) -> Spinner {
        let interactive = term::is_terminal(self.sink.as_ref());
        debug!(label = %self.label, interactive, "spinner built");
        Spinner {
            label: self.label,
            glyphs: self.glyphs,
            concluded_glyph: self.concluded_glyph,
            frame_rate: self.frame_rate,
            interactive,
            cancel: CancelSignal::new(),
            start_once: Once::new(),
            stop_once: Once::new(),
            state: Mutex::new(State {
                sink: Some(self.sink),
                animation: None,
            }),
        }
    }
}

/// A single-use, single-line progress indicator.
///
/// `start` and `stop` both take `&self` and may be called from any thread, any
/// number of times; only the first call of each has an effect. Once stopped a
/// spinner cannot be restarted.
pub struct Spinner {
    label: String,
    glyphs: Vec<String>,
    concluded_glyph: String,
    frame_rate: Duration,
    interactive: bool,
    cancel: CancelSignal,
    start_once: Once,
    stop_once: Once,
    state: Mutex<State>,
}

// The sink lives in exactly one place: here, or inside the animation thread
// which returns it through its join handle.
struct State {
    sink: Option<Box<dyn Sink>>,
    animation: Option<JoinHandle<Box<dyn Sink>>>,
}

impl Spinner {
    /// A spinner with the default braille frames, `✔`, 150ms and stdout.
    pub fn new(label: impl Into<String>) -> Self {
        SpinnerBuilder::new(label).build()
    }

    pub fn builder(label: impl Into<String>) -> SpinnerBuilder {
        SpinnerBuilder::new(label)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn glyphs(&self) -> &[String] {
        &self.glyphs
    }

    pub fn concluded_glyph(&self) -> &str {
        &self.concluded_glyph
    }

    pub fn frame_rate(&self) -> Duration {
        self.frame_rate
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_fired() && self.lock_state().animation.is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_fired()
    }

    /// Launches the animation thread and returns immediately. Does nothing on a
    /// non-interactive sink, with no glyphs, after `stop`, or the second time.
    pub fn start(&self) {
        if !self.interactive {
            debug!(label = %self.label, "sink is not a terminal, animation skipped");
            return;
        }
        if self.glyphs.is_empty() {
            debug!(label = %self.label, "no glyphs configured, animation skipped");
            return;
        }
        self.start_once.call_once(|| {
            let mut state = self.lock_state();
            if self.cancel.is_fired() {
                debug!(label = %self.label, "start after stop ignored");
                return;
            }
            let Some(sink) = state.sink.take() else {
                return;
            };
            let animation = Animation {
                glyphs: self.glyphs.clone(),
                label: self.label.clone(),
                frame_rate: self.frame_rate,
                cancel: self.cancel.clone(),
                sink,
            };
            state.animation = Some(thread::spawn(move || animation.run()));
            debug!(label = %self.label, frame_rate = ?self.frame_rate, "animation started");
        });
    }

    /// Halts the animation, clears its line and writes `<concluded> <label>`.
    ///
    /// The animation thread is joined before the final write, so no frame can
    /// land after the concluded line. The thread wakes as soon as the signal
    /// fires, so this only waits on a frame write already in flight.
    pub fn stop(&self) {
        self.stop_once.call_once(|| {
            self.cancel.fire();
            let mut state = self.lock_state();
            if let Some(handle) = state.animation.take() {
                match handle.join() {
                    Ok(sink) => state.sink = Some(sink),
                    Err(_) => warn!(label = %self.label, "animation thread panicked, output lost"),
                }
            }
            let Some(sink) = state.sink.as_mut() else {
                return;
            };
            term::erase_line(sink.as_mut(), self.interactive);
            term::emit(
                sink.as_mut(),
                &format!("{} {}\n", self.concluded_glyph, self.label),
            );
            debug!(label = %self.label, "spinner stopped");
        });
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Spinner {
    // A spinner dropped without `stop` still shuts its thread down, but leaves
    // the last frame on screen.
    fn drop(&mut self) {
        self.cancel.fire();
    }
}

struct Animation {
    glyphs: Vec<String>,
    label: String,
    frame_rate: Duration,
    cancel: CancelSignal,
    sink: Box<dyn Sink>,
}

impl Animation {
    fn run(mut self) -> Box<dyn Sink> {
        let mut frames = 0u64;
        for glyph in self.glyphs.iter().cycle() {
            if self.cancel.is_fired() {
                break;
            }
            term::emit(self.sink.as_mut(), &format!("{} {}", glyph, self.label));
            frames += 1;
            if self.cancel.wait_timeout(self.frame_rate) {
                break;
            }
            term::erase_line(self.sink.as_mut(), true);
        }
        trace!(label = %self.label, frames, "animation finished");
        self.sink
    }
}
