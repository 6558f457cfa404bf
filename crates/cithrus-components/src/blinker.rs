//! Black/white alternating test source.
//!
//! Useful for measuring end-to-end latency: point a camera at a screen showing
//! the blinker output and compare the logged switch times with what arrives
//! downstream.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use cithrus_core::{
    BufferView, Component, Format, OutputPort, OutputPorts, PipelineError, Result, Source,
};

const NAME: &str = "BlinkerSource";

/// Alternates a fully black and a fully white image.
///
/// A full black-white cycle takes `1 / frequency` seconds, so each color is
/// shown for half of that. Only 8-bit packed formats are produced.
pub struct BlinkerSource {
    outputs: OutputPorts<1>,
    frames: [BufferView; 2],
    half_period: Duration,
    started: Instant,
    showing: Option<usize>,
    log: Option<BufWriter<File>>,
}

impl BlinkerSource {
    /// Creates a blinker producing `format` images of `width` x `height`.
    ///
    /// # Errors
    ///
    /// `UnsupportedFormat` for anything but `rgba` or `bgra`, and
    /// `InvalidArgument` for a frequency that is not positive and finite, or
    /// so low that half a period does not fit in a `Duration`.
    pub fn new(width: u16, height: u16, format: Format, frequency: f64) -> Result<Self> {
        if format != Format::RGBA && format != Format::BGRA {
            return Err(PipelineError::unsupported_format(NAME, format));
        }
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(PipelineError::invalid_argument(format!(
                "{NAME}: frequency must be positive, got {frequency}"
            )));
        }
        let half_period = Duration::try_from_secs_f64(0.5 / frequency).map_err(|_| {
            PipelineError::invalid_argument(format!(
                "{NAME}: frequency {frequency} gives a period out of range"
            ))
        })?;

        let pixels = usize::from(width) * usize::from(height);
        // Black and white are symmetric in R and B, so both formats share them.
        let black = BufferView::from_vec([0, 0, 0, 255].repeat(pixels));
        let white = BufferView::from_vec([255; 4].repeat(pixels));

        Ok(Self {
            outputs: OutputPorts::declared(NAME, &format),
            frames: [black, white],
            half_period,
            started: Instant::now(),
            showing: None,
            log: None,
        })
    }

    /// Appends a timestamped line to `path` every time the color switches.
    pub fn with_log(mut self, path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::options().create(true).append(true).open(path)?;
        self.log = Some(BufWriter::new(file));
        Ok(self)
    }

    /// Time each color stays on screen.
    pub fn half_period(&self) -> Duration {
        self.half_period
    }

    fn phase_at(&self, elapsed: Duration) -> usize {
        let step = self.half_period.as_nanos().max(1);
        (elapsed.as_nanos() / step % 2) as usize
    }

    fn show(&mut self, phase: usize) -> Result<()> {
        self.outputs[0].set_view(self.frames[phase].clone());
        if self.showing == Some(phase) {
            return Ok(());
        }
        self.showing = Some(phase);

        let color = if phase == 1 { "white" } else { "black" };
        tracing::trace!("{NAME}: now {color}");
        if let Some(log) = self.log.as_mut() {
            let stamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis();
            writeln!(log, "{stamp} now {color}")
                .and_then(|()| log.flush())
                .map_err(|e| PipelineError::component(NAME, format!("switch log: {e}")))?;
        }
        Ok(())
    }
}

impl Component for BlinkerSource {
    fn process(&mut self) -> Result<()> {
        let phase = self.phase_at(self.started.elapsed());
        self.show(phase)
    }

    fn output_ports(&self) -> &[OutputPort] {
        &self.outputs
    }
}

impl Source<1> for BlinkerSource {}
