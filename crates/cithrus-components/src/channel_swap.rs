//! Red/blue channel swap between the two packed 8-bit layouts.

use cithrus_core::{
    Accepts, Component, Filter, Format, FrameSlab, InputPort, InputPorts, OutputPort,
    OutputPorts, PipelineError, Result,
};

const NAME: &str = "BgraToRgbaConverter";

/// Converts `bgra` to `rgba` and back.
///
/// The output format is the opposite of whatever the input is bound to, so
/// one converter type serves both directions. Alpha is forced opaque.
pub struct BgraToRgbaConverter {
    inputs: InputPorts<1>,
    outputs: OutputPorts<1>,
    slab: FrameSlab,
}

impl BgraToRgbaConverter {
    /// Creates an unbound converter.
    pub fn new() -> Self {
        Self {
            inputs: InputPorts::accepting(NAME, &Accepts::any_of([Format::RGBA, Format::BGRA])),
            outputs: OutputPorts::new(),
            slab: FrameSlab::new(),
        }
    }
}

impl Default for BgraToRgbaConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for BgraToRgbaConverter {
    fn on_inputs_connected(&mut self) -> Result<()> {
        let output = match self.inputs[0].format()? {
            f if f == Format::BGRA => Format::RGBA,
            f if f == Format::RGBA => Format::BGRA,
            other => return Err(PipelineError::unsupported_format(NAME, other)),
        };
        self.outputs.initialize_all(NAME, &output)
    }

    fn process(&mut self) -> Result<()> {
        let input = self.inputs[0].read()?;
        if input.is_empty() {
            self.outputs[0].clear();
            return Ok(());
        }

        let src = input.as_bytes();
        let dst = self.slab.write(src.len() / 4 * 4);
        for (out, px) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
            out.copy_from_slice(&[px[2], px[1], px[0], 255]);
        }
        self.outputs[0].set_view(self.slab.view());
        Ok(())
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }

    fn output_ports(&self) -> &[OutputPort] {
        &self.outputs
    }
}

impl Filter<1, 1> for BgraToRgbaConverter {}

#[cfg(test)]
mod tests {
    use super::*;
    use cithrus_core::wire;

    fn bound(format: Format) -> (OutputPort, BgraToRgbaConverter) {
        let upstream = OutputPort::declared(0, "Camera", format);
        let mut converter = BgraToRgbaConverter::new();
        wire::bind_inputs(&mut converter, &[upstream.handle()]).unwrap();
        (upstream, converter)
    }

    #[test]
    fn output_format_is_the_opposite_layout() {
        let (_up, converter) = bound(Format::BGRA);
        assert_eq!(converter.output_ports()[0].format(), Some(Format::RGBA));
        let (_up, converter) = bound(Format::RGBA);
        assert_eq!(converter.output_ports()[0].format(), Some(Format::BGRA));
    }

    #[test]
    fn swaps_channels_and_forces_alpha() {
        let (mut upstream, mut converter) = bound(Format::BGRA);
        upstream.set_view(cithrus_core::BufferView::from_vec(vec![1, 2, 3, 4, 5, 6, 7, 8]));
        converter.process().unwrap();
        assert_eq!(
            converter.output_ports()[0].view().as_bytes(),
            &[3, 2, 1, 255, 7, 6, 5, 255]
        );
    }

    #[test]
    fn empty_input_clears_output() {
        let (mut upstream, mut converter) = bound(Format::RGBA);
        upstream.set_view(cithrus_core::BufferView::from_vec(vec![9; 4]));
        converter.process().unwrap();
        upstream.clear();
        converter.process().unwrap();
        assert!(converter.output_ports()[0].view().is_empty());
    }

    #[test]
    fn yuv_input_is_refused_at_bind_time() {
        let upstream = OutputPort::declared(0, "Decoder", Format::YUV420);
        let mut converter = BgraToRgbaConverter::new();
        let err = wire::bind_inputs(&mut converter, &[upstream.handle()]).unwrap_err();
        assert!(matches!(err, PipelineError::FormatMismatch { .. }));
        assert!(!upstream.is_connected());
    }
}
