//! Constant-color image source.

use cithrus_core::{BufferView, Component, Format, OutputPort, OutputPorts, Result, Source};

const NAME: &str = "SolidColorSource";

/// Emits the same single-color image every tick.
///
/// Packed formats fill every pixel with four bytes; `yuv420` fills the full
/// luma plane followed by the two quarter-size chroma planes.
pub struct SolidColorSource {
    outputs: OutputPorts<1>,
    frame: BufferView,
}

impl SolidColorSource {
    /// An `rgba` image filled with `[r, g, b, a]`.
    pub fn rgba(width: u16, height: u16, color: [u8; 4]) -> Self {
        Self::packed(Format::RGBA, width, height, color)
    }

    /// A `bgra` image of the color given as `[r, g, b, a]`.
    pub fn bgra(width: u16, height: u16, color: [u8; 4]) -> Self {
        let [r, g, b, a] = color;
        Self::packed(Format::BGRA, width, height, [b, g, r, a])
    }

    /// A `yuv420` image filled with `[y, u, v]`.
    pub fn yuv(width: u16, height: u16, color: [u8; 3]) -> Self {
        let luma = usize::from(width) * usize::from(height);
        let chroma = luma / 4;
        let mut frame = Vec::with_capacity(luma + 2 * chroma);
        frame.resize(luma, color[0]);
        frame.resize(luma + chroma, color[1]);
        frame.resize(luma + 2 * chroma, color[2]);
        Self::with_frame(Format::YUV420, frame)
    }

    fn packed(format: Format, width: u16, height: u16, pixel: [u8; 4]) -> Self {
        let pixels = usize::from(width) * usize::from(height);
        Self::with_frame(format, pixel.repeat(pixels))
    }

    fn with_frame(format: Format, frame: Vec<u8>) -> Self {
        tracing::debug!("{NAME}: {} byte {format} frame", frame.len());
        Self {
            outputs: OutputPorts::declared(NAME, &format),
            frame: BufferView::from_vec(frame),
        }
    }
}

impl Component for SolidColorSource {
    fn process(&mut self) -> Result<()> {
        self.outputs[0].set_view(self.frame.clone());
        Ok(())
    }

    fn output_ports(&self) -> &[OutputPort] {
        &self.outputs
    }
}

impl Source<1> for SolidColorSource {}
