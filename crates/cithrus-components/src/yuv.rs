//! Conversion between packed 8-bit RGB layouts and planar YUV 4:2:0.
//!
//! Both directions use BT.601 full-range coefficients in 8.8 fixed point.
//! A `yuv420` frame of `w` x `h` is the full-resolution Y plane followed by
//! the U and V planes, each subsampled 2x2 to `w/2` x `h/2`.

use cithrus_core::{
    Accepts, Component, Filter, Format, FrameSlab, InputPort, InputPorts, OutputPort,
    OutputPorts, PipelineError, Result,
};

/// Byte size of a `yuv420` frame.
pub fn yuv420_len(width: usize, height: usize) -> usize {
    width * height * 3 / 2
}

fn geometry(component: &str, width: u16, height: u16) -> Result<(usize, usize)> {
    if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
        return Err(PipelineError::invalid_argument(format!(
            "{component}: 4:2:0 frames need even, non-zero dimensions, got {width}x{height}"
        )));
    }
    Ok((usize::from(width), usize::from(height)))
}

/// Positions of R, G and B within a packed pixel.
fn channel_order(format: &Format) -> Option<[usize; 3]> {
    if *format == Format::RGBA {
        Some([0, 1, 2])
    } else if *format == Format::BGRA {
        Some([2, 1, 0])
    } else {
        None
    }
}

fn clamp(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

fn luma(r: i32, g: i32, b: i32) -> u8 {
    clamp((76 * r + 150 * g + 29 * b) >> 8)
}

fn chroma(r: i32, g: i32, b: i32) -> (u8, u8) {
    let u = (-43 * r - 84 * g + 127 * b + (128 << 8)) >> 8;
    let v = (127 * r - 106 * g - 21 * b + (128 << 8)) >> 8;
    (clamp(u), clamp(v))
}

fn rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let y = i32::from(y);
    let u = i32::from(u) - 128;
    let v = i32::from(v) - 128;
    [
        clamp(y + ((358 * v) >> 8)),
        clamp(y + ((-88 * u - 182 * v) >> 8)),
        clamp(y + ((452 * u) >> 8)),
    ]
}

// ---------------------------------------------------------------------------
// RGBA / BGRA -> YUV 4:2:0
// ---------------------------------------------------------------------------

const TO_YUV: &str = "RgbaToYuvConverter";

/// Converts `rgba` or `bgra` frames of a fixed size to `yuv420`.
///
/// Chroma is the average of each 2x2 pixel block. Frames whose size does not
/// match the configured dimensions are skipped: the output is empty for that
/// tick.
pub struct RgbaToYuvConverter {
    inputs: InputPorts<1>,
    outputs: OutputPorts<1>,
    width: usize,
    height: usize,
    order: [usize; 3],
    slab: FrameSlab,
}

impl RgbaToYuvConverter {
    /// Creates a converter for `width` x `height` frames.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless both dimensions are even and non-zero.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        let (width, height) = geometry(TO_YUV, width, height)?;
        Ok(Self {
            inputs: InputPorts::accepting(TO_YUV, &Accepts::any_of([Format::RGBA, Format::BGRA])),
            outputs: OutputPorts::declared(TO_YUV, &Format::YUV420),
            width,
            height,
            order: [0, 1, 2],
            slab: FrameSlab::with_len(yuv420_len(width, height)),
        })
    }

    fn convert(&mut self, src: &[u8]) {
        let (w, h, order) = (self.width, self.height, self.order);
        let luma_len = w * h;
        let chroma_len = luma_len / 4;
        let (y_plane, chroma_planes) = self.slab.write(yuv420_len(w, h)).split_at_mut(luma_len);
        let (u_plane, v_plane) = chroma_planes.split_at_mut(chroma_len);

        for y in 0..h {
            for x in 0..w {
                let [r, g, b] = pixel(src, order, w, x, y);
                y_plane[y * w + x] = luma(r, g, b);
            }
        }

        for by in 0..h / 2 {
            for bx in 0..w / 2 {
                let mut sum = [0i32; 3];
                for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                    let px = pixel(src, order, w, 2 * bx + dx, 2 * by + dy);
                    for c in 0..3 {
                        sum[c] += px[c];
                    }
                }
                let [r, g, b] = sum.map(|s| (s + 2) / 4);
                let (u, v) = chroma(r, g, b);
                let at = by * (w / 2) + bx;
                u_plane[at] = u;
                v_plane[at] = v;
            }
        }
    }
}

fn pixel(src: &[u8], order: [usize; 3], width: usize, x: usize, y: usize) -> [i32; 3] {
    let at = (y * width + x) * 4;
    order.map(|c| i32::from(src[at + c]))
}

impl Component for RgbaToYuvConverter {
    fn on_inputs_connected(&mut self) -> Result<()> {
        let format = self.inputs[0].format()?;
        self.order =
            channel_order(&format).ok_or_else(|| PipelineError::unsupported_format(TO_YUV, format))?;
        Ok(())
    }

    fn process(&mut self) -> Result<()> {
        let input = self.inputs[0].read()?;
        if input.len() != self.width * self.height * 4 {
            if !input.is_empty() {
                tracing::trace!("{TO_YUV}: skipping {} byte frame", input.len());
            }
            self.outputs[0].clear();
            return Ok(());
        }
        // Drop the port's reference so the slab can be written in place.
        self.outputs[0].clear();
        self.convert(input.as_bytes());
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

impl Filter<1, 1> for RgbaToYuvConverter {}

// ---------------------------------------------------------------------------
// YUV 4:2:0 -> RGBA / BGRA
// ---------------------------------------------------------------------------

const FROM_YUV: &str = "YuvToRgbaConverter";

/// Converts `yuv420` frames of a fixed size to `rgba` or `bgra`.
///
/// Frames of the wrong size are skipped. Alpha is always opaque.
pub struct YuvToRgbaConverter {
    inputs: InputPorts<1>,
    outputs: OutputPorts<1>,
    width: usize,
    height: usize,
    order: [usize; 3],
    slab: FrameSlab,
}

impl YuvToRgbaConverter {
    /// Creates a converter for `width` x `height` frames producing `format`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for odd or zero dimensions, `UnsupportedFormat`
    /// unless `format` is `rgba` or `bgra`.
    pub fn new(width: u16, height: u16, format: Format) -> Result<Self> {
        let (width, height) = geometry(FROM_YUV, width, height)?;
        let order = channel_order(&format)
            .ok_or_else(|| PipelineError::unsupported_format(FROM_YUV, format.clone()))?;
        Ok(Self {
            inputs: InputPorts::accepting(FROM_YUV, &Accepts::one(Format::YUV420)),
            outputs: OutputPorts::declared(FROM_YUV, &format),
            width,
            height,
            order,
            slab: FrameSlab::with_len(width * height * 4),
        })
    }

    fn convert(&mut self, src: &[u8]) {
        let (w, h) = (self.width, self.height);
        let luma_len = w * h;
        let chroma_len = luma_len / 4;
        let order = self.order;
        let dst = self.slab.write(luma_len * 4);

        for y in 0..h {
            for x in 0..w {
                let c = (y / 2) * (w / 2) + x / 2;
                let px = rgb(
                    src[y * w + x],
                    src[luma_len + c],
                    src[luma_len + chroma_len + c],
                );
                let out = &mut dst[(y * w + x) * 4..][..4];
                for (channel, value) in order.iter().zip(px) {
                    out[*channel] = value;
                }
                out[3] = 255;
            }
        }
    }
}

impl Component for YuvToRgbaConverter {
    fn process(&mut self) -> Result<()> {
        let input = self.inputs[0].read()?;
        if input.len() != yuv420_len(self.width, self.height) {
            if !input.is_empty() {
                tracing::trace!("{FROM_YUV}: skipping {} byte frame", input.len());
            }
            self.outputs[0].clear();
            return Ok(());
        }
        // Drop the port's reference so the slab can be written in place.
        self.outputs[0].clear();
        self.convert(input.as_bytes());
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

impl Filter<1, 1> for YuvToRgbaConverter {}
