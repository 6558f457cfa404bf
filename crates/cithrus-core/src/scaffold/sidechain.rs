//! A filter with some inputs fed by a private source.

use crate::component::{BoxedComponent, Component, Filter, Source, short_type_name};
use crate::error::Result;
use crate::format::Accepts;
use crate::port::{InputPort, InputPorts, OutputPort, OutputPorts};
use crate::wire;

use super::{adopt_formats, bound_handles, check_port_sum, republish};

/// Presents a `K`-input filter as a `Filter<I, O>` by feeding its last
/// `K - I` inputs from a side source.
///
/// Filter inputs `0..I` are bound to the upstream outputs of the aggregate;
/// inputs `I..K` are bound to the side source's outputs in order. Each tick
/// runs the side source, then the filter.
///
/// ```rust,ignore
/// // A 2-input mixer fed by the main chain and a constant overlay.
/// let mixer = Sidechain::<1, 1>::new(SolidColorSource::rgba(64, 64, [0; 4]), Mixer::new())?;
/// ```
pub struct Sidechain<const I: usize, const O: usize> {
    inputs: InputPorts<I>,
    outputs: OutputPorts<O>,
    side: BoxedComponent,
    filter: BoxedComponent,
}

impl<const I: usize, const O: usize> Sidechain<I, O> {
    /// Pairs `side` with `filter`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::PortCountMismatch`](crate::PipelineError::PortCountMismatch)
    /// unless `I + J == K`.
    pub fn new<const J: usize, const K: usize>(
        side: impl Source<J> + 'static,
        filter: impl Filter<K, O> + 'static,
    ) -> Result<Self> {
        let owner = short_type_name::<Self>();
        check_port_sum(owner, "input", K, I + J)?;

        let mut side: BoxedComponent = Box::new(side);
        let mut filter: BoxedComponent = Box::new(filter);
        wire::check_declared_arity(&mut side, 0, J)?;
        wire::check_declared_arity(&mut filter, K, O)?;

        Ok(Self {
            inputs: InputPorts::accepting(owner, &Accepts::Any),
            outputs: OutputPorts::new(),
            side,
            filter,
        })
    }
}

impl<const I: usize, const O: usize> Component for Sidechain<I, O> {
    fn on_inputs_connected(&mut self) -> Result<()> {
        let mut handles = bound_handles(&self.inputs)?;
        handles.extend(self.side.output_ports().iter().map(OutputPort::handle));
        wire::bind_inputs(&mut self.filter, &handles)?;
        adopt_formats(
            short_type_name::<Self>(),
            &mut self.outputs,
            self.filter.output_ports(),
        )
    }

    fn process(&mut self) -> Result<()> {
        self.side
            .process()
            .map_err(|e| e.in_stage(self.side.name()))?;
        self.filter
            .process()
            .map_err(|e| e.in_stage(self.filter.name()))?;
        republish(&mut self.outputs, self.filter.output_ports());
        Ok(())
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }

    fn output_ports(&self) -> &[OutputPort] {
        &self.outputs
    }
}

impl<const I: usize, const O: usize> Filter<I, O> for Sidechain<I, O> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pipeline;
    use crate::buffer::BufferView;
    use crate::error::PipelineError;
    use crate::format::Format;
    use crate::testing::{Collect, Emit};

    /// Concatenates its two inputs.
    struct Join {
        inputs: InputPorts<2>,
        outputs: OutputPorts<1>,
    }

    impl Join {
        fn new() -> Self {
            Self {
                inputs: InputPorts::accepting("Join", &Accepts::Any),
                outputs: OutputPorts::declared("Join", &Format::BINARY),
            }
        }
    }

    impl Component for Join {
        fn process(&mut self) -> Result<()> {
            let mut bytes = self.inputs[0].read()?.as_bytes().to_vec();
            bytes.extend_from_slice(self.inputs[1].read()?.as_bytes());
            self.outputs[0].set_view(BufferView::from_vec(bytes));
            Ok(())
        }

        fn input_ports(&mut self) -> &mut [InputPort] {
            &mut self.inputs
        }

        fn output_ports(&self) -> &[OutputPort] {
            &self.outputs
        }
    }

    impl Filter<2, 1> for Join {}

    #[test]
    fn side_source_feeds_trailing_inputs() {
        let side = Emit::<1>::new(&Format::BINARY, &[9, 9]);
        let joined = Sidechain::<1, 1>::new(side, Join::new()).unwrap();
        let sink = Collect::<1>::new(&Accepts::one(Format::BINARY));
        let seen = sink.seen.clone();

        let mut pipeline = Pipeline::builder(Emit::<1>::new(&Format::RGBA, &[1]))
            .filter(joined)
            .sink(sink)
            .unwrap();
        pipeline.run().unwrap();
        assert_eq!(seen.lock()[0][0].as_bytes(), &[1, 9, 9]);
    }

    #[test]
    fn port_sum_is_checked() {
        let side = Emit::<2>::new(&Format::BINARY, &[]);
        let err = Sidechain::<1, 1>::new(side, Join::new()).err().unwrap();
        assert!(matches!(
            err,
            PipelineError::PortCountMismatch { declared: 2, actual: 3, .. }
        ));
    }
}
