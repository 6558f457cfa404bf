//! Identity filter.

use crate::component::{Component, Filter, short_type_name};
use crate::error::Result;
use crate::format::Accepts;
use crate::port::{InputPort, InputPorts, OutputPort, OutputPorts};

/// Forwards input `i` to output `i` unchanged, format included.
///
/// A structural placeholder: it lets a branch of a [`Parallel`](super::Parallel)
/// group that does no work present the same arity as its siblings.
pub struct Passthrough<const N: usize> {
    inputs: InputPorts<N>,
    outputs: OutputPorts<N>,
}

impl<const N: usize> Passthrough<N> {
    /// Creates a passthrough of width `N`.
    pub fn new() -> Self {
        const { assert!(N > 0, "a passthrough needs at least one port") };
        Self {
            inputs: InputPorts::accepting(short_type_name::<Self>(), &Accepts::Any),
            outputs: OutputPorts::new(),
        }
    }
}

impl<const N: usize> Default for Passthrough<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Component for Passthrough<N> {
    fn on_inputs_connected(&mut self) -> Result<()> {
        let owner = short_type_name::<Self>();
        for (input, output) in self.inputs.iter().zip(self.outputs.iter_mut()) {
            output.initialize(owner, input.format()?)?;
        }
        Ok(())
    }

    fn process(&mut self) -> Result<()> {
        for (input, output) in self.inputs.iter().zip(self.outputs.iter_mut()) {
            output.set_view(input.read()?);
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

impl<const N: usize> Filter<N, N> for Passthrough<N> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::boxed;
    use crate::format::Format;
    use crate::scaffold::Parallel;
    use crate::testing::{Collect, Emit, Log, Tag};
    use crate::Pipeline;

    #[test]
    fn pads_a_parallel_branch() {
        let log = Log::default();
        let group = Parallel::<2, 2>::new(vec![
            boxed(Tag::new("Work", 7, Accepts::Any, Format::HEVC, &log)),
            boxed(Passthrough::<1>::new()),
        ])
        .unwrap();
        let sink = Collect::<2>::new(&Accepts::Any);
        let seen = sink.seen.clone();

        let mut pipeline = Pipeline::builder(Emit::<2>::new(&Format::RGBA, &[1]))
            .filter(group)
            .sink(sink)
            .unwrap();
        pipeline.run().unwrap();

        let seen = seen.lock();
        assert_eq!(seen[0][0].as_bytes(), &[1, 7]);
        assert_eq!(seen[0][1].as_bytes(), &[1]);
        let formats: Vec<_> = pipeline.edges().iter().map(|e| e.format.clone()).collect();
        assert_eq!(formats[2..], [Format::HEVC, Format::RGBA]);
    }
}
