//! Vertical stacking of YUV 4:2:0 images.

use cithrus_core::{
    Accepts, Component, Filter, Format, FrameSlab, InputPort, InputPorts, OutputPort,
    OutputPorts, PipelineError, Result, short_type_name,
};

use crate::yuv::yuv420_len;

/// Stacks `N` equally sized `yuv420` images into one `yuv420` image `N` times
/// as tall.
///
/// Each plane is concatenated separately, so the result is itself a valid
/// 4:2:0 frame. An input whose size does not match keeps last tick's region
/// in place; when every input is empty the output is empty too.
pub struct ImageConcatenator<const N: usize> {
    inputs: InputPorts<N>,
    outputs: OutputPorts<1>,
    frame_len: usize,
    slab: FrameSlab,
}

impl<const N: usize> ImageConcatenator<N> {
    /// Creates a concatenator for inputs of `width` x `height`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for odd or zero dimensions.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        const { assert!(N > 0, "a concatenator needs at least one input") };
        let owner = short_type_name::<Self>();
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(PipelineError::invalid_argument(format!(
                "{owner}: 4:2:0 frames need even, non-zero dimensions, got {width}x{height}"
            )));
        }
        let frame_len = usize::from(width) * usize::from(height);
        Ok(Self {
            inputs: InputPorts::accepting(owner, &Accepts::one(Format::YUV420)),
            outputs: OutputPorts::declared(owner, &Format::YUV420),
            frame_len,
            slab: FrameSlab::with_len(yuv420_len(frame_len, N)),
        })
    }

    /// Byte size of the stacked output frame.
    pub fn output_len(&self) -> usize {
        self.slab.len()
    }
}

impl<const N: usize> Component for ImageConcatenator<N> {
    fn process(&mut self) -> Result<()> {
        let luma = self.frame_len;
        let chroma = luma / 4;
        let mut any = false;

        let mut frames = Vec::with_capacity(N);
        for input in self.inputs.iter() {
            frames.push(input.read()?);
        }

        let out = self.slab.write(yuv420_len(luma, N));
        for (i, frame) in frames.iter().enumerate() {
            if frame.is_empty() {
                continue;
            }
            any = true;
            if frame.len() != yuv420_len(luma, 1) {
                tracing::trace!("concat: input {i} has {} bytes, skipping", frame.len());
                continue;
            }
            let src = frame.as_bytes();
            out[luma * i..][..luma].copy_from_slice(&src[..luma]);
            out[luma * N + chroma * i..][..chroma].copy_from_slice(&src[luma..luma + chroma]);
            out[luma * N * 5 / 4 + chroma * i..][..chroma].copy_from_slice(&src[luma + chroma..]);
        }

        if any {
            self.outputs[0].set_view(self.slab.view());
        } else {
            self.outputs[0].clear();
        }
        Ok(())
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }

    fn output_ports(&self) -> &[OutputPort] {
        &self.outputs
    }
}

impl<const N: usize> Filter<N, 1> for ImageConcatenator<N> {}

#[cfg(test)]
mod tests {
    use super::*;
    use cithrus_core::{BufferView, wire};

    fn plane_frame(y: u8, u: u8, v: u8) -> BufferView {
        // 2x2 image: four luma bytes, one U, one V.
        BufferView::from_vec(vec![y, y, y, y, u, v])
    }

    #[test]
    fn planes_are_stacked_separately() {
        let mut upstream = [
            OutputPort::declared(0, "A", Format::YUV420),
            OutputPort::declared(1, "B", Format::YUV420),
        ];
        let mut concat = ImageConcatenator::<2>::new(2, 2).unwrap();
        let handles: Vec<_> = upstream.iter().map(OutputPort::handle).collect();
        wire::bind_inputs(&mut concat, &handles).unwrap();
        assert_eq!(concat.output_len(), 12);

        upstream[0].set_view(plane_frame(1, 2, 3));
        upstream[1].set_view(plane_frame(4, 5, 6));
        concat.process().unwrap();

        assert_eq!(
            concat.output_ports()[0].view().as_bytes(),
            &[1, 1, 1, 1, 4, 4, 4, 4, 2, 5, 3, 6]
        );
    }

    #[test]
    fn mismatched_input_keeps_previous_region() {
        let mut upstream = [
            OutputPort::declared(0, "A", Format::YUV420),
            OutputPort::declared(1, "B", Format::YUV420),
        ];
        let mut concat = ImageConcatenator::<2>::new(2, 2).unwrap();
        let handles: Vec<_> = upstream.iter().map(OutputPort::handle).collect();
        wire::bind_inputs(&mut concat, &handles).unwrap();

        upstream[0].set_view(plane_frame(1, 2, 3));
        upstream[1].set_view(plane_frame(4, 5, 6));
        concat.process().unwrap();

        upstream[0].set_view(plane_frame(7, 8, 9));
        upstream[1].set_view(BufferView::from_vec(vec![0; 3]));
        concat.process().unwrap();
        assert_eq!(
            concat.output_ports()[0].view().as_bytes(),
            &[7, 7, 7, 7, 4, 4, 4, 4, 8, 5, 9, 6]
        );

        upstream[0].clear();
        upstream[1].clear();
        concat.process().unwrap();
        assert!(concat.output_ports()[0].view().is_empty());
    }

    #[test]
    fn odd_size_is_rejected() {
        assert!(ImageConcatenator::<3>::new(5, 4).is_err());
    }
}
