//! Source fed from a foreign thread.

use cithrus_core::{
    Component, DoubleBuffer, Format, OutputPort, OutputPorts, Publisher, Result, Source,
};

const NAME: &str = "HandoffSource";

/// Exposes frames published from outside the pipeline.
///
/// Producers (a capture callback, a network receiver) write through a
/// [`Publisher`]; each tick takes the newest complete frame. When nothing new
/// arrived since the last tick the previous frame stays exposed, and before
/// the first publish the output is the empty view.
pub struct HandoffSource {
    outputs: OutputPorts<1>,
    cell: DoubleBuffer,
}

impl HandoffSource {
    /// Creates a source whose frames are tagged `format`.
    pub fn new(format: Format) -> Self {
        Self {
            outputs: OutputPorts::declared(NAME, &format),
            cell: DoubleBuffer::new(),
        }
    }

    /// A producer handle; clone it freely across threads.
    pub fn publisher(&self) -> Publisher {
        self.cell.publisher()
    }

    /// Frames taken so far.
    pub fn delivered(&self) -> u64 {
        self.cell.stats().delivered
    }
}

impl Component for HandoffSource {
    fn process(&mut self) -> Result<()> {
        if let Some(frame) = self.cell.take() {
            self.outputs[0].set_view(frame);
        }
        Ok(())
    }

    fn output_ports(&self) -> &[OutputPort] {
        &self.outputs
    }
}

impl Source<1> for HandoffSource {}
