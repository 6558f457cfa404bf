//! The runtime half of the wiring protocol.
//!
//! Building a graph is strictly left to right. For each adjacent pair, every
//! input `i` of the downstream stage is bound to output `i` of the upstream
//! stage, and the downstream stage's `on_inputs_connected` runs before the
//! next pair is touched, so formats propagate one stage at a time.
//!
//! Arity is checked for the whole chain before any port is bound
//! ([`validate_arities`]): an arity failure leaves every port untouched.
//! A format failure further along does not undo the bindings already made;
//! the caller drops every component along with the error.

use crate::component::Component;
use crate::edge::Edge;
use crate::error::{PipelineError, Result};
use crate::port::OutputHandle;

/// Checks that a component's port arrays match the arity its role declares.
///
/// # Errors
///
/// [`PipelineError::PortCountMismatch`] naming the direction that disagrees.
pub fn check_declared_arity(
    component: &mut dyn Component,
    inputs: usize,
    outputs: usize,
) -> Result<()> {
    let actual_in = component.input_ports().len();
    let actual_out = component.output_ports().len();
    if actual_in != inputs {
        return Err(PipelineError::PortCountMismatch {
            component: component.name().to_owned(),
            direction: "input",
            declared: inputs,
            actual: actual_in,
        });
    }
    if actual_out != outputs {
        return Err(PipelineError::PortCountMismatch {
            component: component.name().to_owned(),
            direction: "output",
            declared: outputs,
            actual: actual_out,
        });
    }
    Ok(())
}

/// Verifies output-arity(k) == input-arity(k + 1) for every adjacent pair.
///
/// # Errors
///
/// [`PipelineError::ArityMismatch`] for the first pair that disagrees.
pub fn validate_arities<C: Component>(stages: &mut [C]) -> Result<()> {
    for k in 1..stages.len() {
        let outputs = stages[k - 1].output_ports().len();
        let inputs = stages[k].input_ports().len();
        if outputs != inputs {
            return Err(PipelineError::ArityMismatch {
                upstream: stages[k - 1].name().to_owned(),
                downstream: stages[k].name().to_owned(),
                outputs,
                inputs,
            });
        }
    }
    Ok(())
}

/// Binds `target`'s inputs to `handles` in index order, then finalizes it.
///
/// # Errors
///
/// [`PipelineError::PortCountMismatch`] if the handle count differs from the
/// input count; otherwise any error from [`InputPort::connect`] or the
/// component's `on_inputs_connected`.
///
/// [`InputPort::connect`]: crate::InputPort::connect
pub fn bind_inputs(target: &mut dyn Component, handles: &[OutputHandle]) -> Result<Vec<Edge>> {
    let inputs = target.input_ports().len();
    if inputs != handles.len() {
        return Err(PipelineError::PortCountMismatch {
            component: target.name().to_owned(),
            direction: "input",
            declared: handles.len(),
            actual: inputs,
        });
    }

    let mut edges = Vec::with_capacity(inputs);
    for (input, handle) in target.input_ports().iter_mut().zip(handles) {
        let edge = input.connect(handle)?;
        tracing::debug!("bind: {edge}");
        edges.push(edge);
    }
    target.on_inputs_connected()?;
    Ok(edges)
}

/// Connects `downstream`'s inputs to `upstream`'s outputs, then finalizes
/// `downstream`.
///
/// # Errors
///
/// [`PipelineError::ArityMismatch`] if the port counts differ; otherwise any
/// error from [`bind_inputs`].
pub fn connect_stage(
    upstream: &dyn Component,
    downstream: &mut dyn Component,
) -> Result<Vec<Edge>> {
    let outputs = upstream.output_ports().len();
    let inputs = downstream.input_ports().len();
    if outputs != inputs {
        return Err(PipelineError::ArityMismatch {
            upstream: upstream.name().to_owned(),
            downstream: downstream.name().to_owned(),
            outputs,
            inputs,
        });
    }

    let handles: Vec<OutputHandle> = upstream.output_ports().iter().map(|o| o.handle()).collect();
    bind_inputs(downstream, &handles)
}

/// Wires a whole chain left to right, returning every edge created.
///
/// # Errors
///
/// Arity errors are reported before any binding; wiring errors abort at the
/// failing stage.
pub fn connect_chain<C: Component>(stages: &mut [C]) -> Result<Vec<Edge>> {
    validate_arities(stages)?;
    let mut edges = Vec::new();
    for i in 1..stages.len() {
        let (done, rest) = stages.split_at_mut(i);
        edges.extend(connect_stage(&done[i - 1], &mut rest[0])?);
    }
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Accepts, Format};
    use crate::port::{InputPort, InputPorts, OutputPort, OutputPorts};

    struct Stage<const I: usize, const O: usize> {
        inputs: InputPorts<I>,
        outputs: OutputPorts<O>,
        finalized: bool,
    }

    impl<const I: usize, const O: usize> Stage<I, O> {
        fn new() -> Self {
            Self {
                inputs: InputPorts::accepting("Stage", &Accepts::Any),
                outputs: OutputPorts::declared("Stage", &Format::BINARY),
                finalized: false,
            }
        }
    }

    impl<const I: usize, const O: usize> Component for Stage<I, O> {
        fn process(&mut self) -> Result<()> {
            Ok(())
        }

        fn on_inputs_connected(&mut self) -> Result<()> {
            self.finalized = true;
            Ok(())
        }

        fn input_ports(&mut self) -> &mut [InputPort] {
            &mut self.inputs
        }

        fn output_ports(&self) -> &[OutputPort] {
            &self.outputs
        }
    }

    #[test]
    fn connect_stage_binds_index_to_index() {
        let up = Stage::<0, 2>::new();
        let mut down = Stage::<2, 0>::new();
        let edges = connect_stage(&up, &mut down).unwrap();
        assert_eq!(edges.len(), 2);
        assert!(down.finalized);
        for (i, input) in down.inputs.iter().enumerate() {
            assert!(input.connected_output().unwrap().same_port(&up.outputs[i].handle()));
        }
    }

    #[test]
    fn arity_failure_touches_no_port() {
        let mut stages: Vec<Box<dyn Component>> = vec![
            Box::new(Stage::<0, 1>::new()),
            Box::new(Stage::<1, 1>::new()),
            Box::new(Stage::<2, 0>::new()),
        ];
        let err = connect_chain(&mut stages).unwrap_err();
        assert!(matches!(err, PipelineError::ArityMismatch { outputs: 1, inputs: 2, .. }));
        for stage in &mut stages {
            assert!(stage.input_ports().iter().all(|p| !p.is_connected()));
            assert!(stage.output_ports().iter().all(|p| !p.is_connected()));
        }
    }

    #[test]
    fn declared_arity_is_checked() {
        let mut stage = Stage::<1, 1>::new();
        assert!(check_declared_arity(&mut stage, 1, 1).is_ok());
        let err = check_declared_arity(&mut stage, 2, 1).unwrap_err();
        assert!(matches!(err, PipelineError::PortCountMismatch { direction: "input", .. }));
        let err = check_declared_arity(&mut stage, 1, 3).unwrap_err();
        assert!(matches!(err, PipelineError::PortCountMismatch { direction: "output", .. }));
    }
}
