//! Terminal components.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cithrus_core::{
    Accepts, Component, InputPort, InputPorts, PipelineError, Result, Sink, short_type_name,
};
use parking_lot::Mutex;
use serde::Serialize;

/// Counters shared between a [`FrameCounter`] and its observers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    /// Ticks that delivered a frame.
    pub frames: u64,
    /// Ticks that delivered the empty view.
    pub empty: u64,
    /// Total payload bytes seen.
    pub bytes: u64,
    /// Size of the most recent frame.
    pub last_len: usize,
}

/// Counts the frames reaching the end of a pipeline.
///
/// The counters live behind a shared handle so they can be read from another
/// thread while the pipeline runs.
pub struct FrameCounter {
    inputs: InputPorts<1>,
    stats: Arc<Mutex<FrameStats>>,
}

impl FrameCounter {
    /// Creates a counter accepting any format.
    pub fn new() -> Self {
        Self {
            inputs: InputPorts::accepting("FrameCounter", &Accepts::Any),
            stats: Arc::default(),
        }
    }

    /// A handle onto the live counters.
    pub fn stats(&self) -> StatsHandle {
        StatsHandle(Arc::clone(&self.stats))
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for FrameCounter {
    fn process(&mut self) -> Result<()> {
        let frame = self.inputs[0].read()?;
        let mut stats = self.stats.lock();
        if frame.is_empty() {
            stats.empty += 1;
        } else {
            stats.frames += 1;
            stats.bytes += frame.len() as u64;
            stats.last_len = frame.len();
        }
        Ok(())
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }
}

impl Sink<1> for FrameCounter {}

impl Drop for FrameCounter {
    fn drop(&mut self) {
        let stats = self.stats.lock();
        tracing::info!(
            "FrameCounter: {} frames ({} bytes), {} empty ticks",
            stats.frames,
            stats.bytes,
            stats.empty
        );
    }
}

/// Read access to a [`FrameCounter`]'s counters.
#[derive(Debug, Clone)]
pub struct StatsHandle(Arc<Mutex<FrameStats>>);

impl StatsHandle {
    /// A copy of the counters as of now.
    pub fn snapshot(&self) -> FrameStats {
        *self.0.lock()
    }
}

/// Appends every non-empty frame to a file, back to back.
///
/// Raw `yuv420` output written this way plays directly in tools that take a
/// frame size and pixel format on the command line.
pub struct FileSink {
    inputs: InputPorts<1>,
    path: PathBuf,
    out: BufWriter<File>,
    frames: u64,
}

impl FileSink {
    /// Creates (truncating) `path` and returns a sink writing to it.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let out = BufWriter::new(File::create(&path)?);
        tracing::debug!("FileSink: writing to {}", path.display());
        Ok(Self {
            inputs: InputPorts::accepting("FileSink", &Accepts::Any),
            path,
            out,
            frames: 0,
        })
    }

    /// Destination file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frames written so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Component for FileSink {
    fn process(&mut self) -> Result<()> {
        let frame = self.inputs[0].read()?;
        if frame.is_empty() {
            return Ok(());
        }
        self.out
            .write_all(frame.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|e| {
                PipelineError::component("FileSink", format!("{}: {e}", self.path.display()))
            })?;
        self.frames += 1;
        Ok(())
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }
}

impl Sink<1> for FileSink {}

/// Accepts anything on `N` inputs and discards it.
pub struct NullSink<const N: usize> {
    inputs: InputPorts<N>,
}

impl<const N: usize> NullSink<N> {
    /// Creates a sink with `N` wildcard inputs.
    pub fn new() -> Self {
        Self {
            inputs: InputPorts::accepting(short_type_name::<Self>(), &Accepts::Any),
        }
    }
}

impl<const N: usize> Default for NullSink<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Component for NullSink<N> {
    fn process(&mut self) -> Result<()> {
        for input in self.inputs.iter() {
            input.read()?;
        }
        Ok(())
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }
}

impl<const N: usize> Sink<N> for NullSink<N> {}
