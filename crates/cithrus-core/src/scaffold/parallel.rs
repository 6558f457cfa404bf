//! Side-by-side members presented as one component.
//!
//! Aggregate ports are partitioned contiguously across the members in
//! declaration order: with members of 2 and 1 inputs, aggregate inputs 0-1 feed
//! the first member and input 2 feeds the second. Members are ticked in order
//! and must not depend on each other's outputs within a tick.
//!
//! The member list is variadic, so unlike [`Sequential`](super::Sequential)
//! the port-count sums are checked when the combinator is constructed.

use crate::component::{BoxedComponent, Component, Filter, Sink, Source, short_type_name};
use crate::error::{PipelineError, Result};
use crate::format::Accepts;
use crate::port::{InputPort, InputPorts, OutputPort, OutputPorts};
use crate::wire;

use super::{adopt_formats, bound_handles, check_port_sum, republish, tick_all};

/// Which role every member of a parallel group must have.
#[derive(Clone, Copy)]
enum Role {
    Source,
    Filter,
    Sink,
}

/// Validates member count and roles, returning `(input_sum, output_sum)`.
fn check_members(owner: &str, members: &mut [BoxedComponent], role: Role) -> Result<(usize, usize)> {
    if members.len() < 2 {
        return Err(PipelineError::invalid_argument(format!(
            "{owner} needs at least two members, got {}",
            members.len()
        )));
    }

    let (mut inputs, mut outputs) = (0, 0);
    for member in members.iter_mut() {
        let i = member.input_ports().len();
        let o = member.output_ports().len();
        let fits = match role {
            Role::Source => i == 0 && o > 0,
            Role::Filter => i > 0 && o > 0,
            Role::Sink => i > 0 && o == 0,
        };
        if !fits {
            return Err(PipelineError::invalid_argument(format!(
                "member {} of {owner} has {i} input(s) and {o} output(s), which does not fit the group's role",
                member.name()
            )));
        }
        inputs += i;
        outputs += o;
    }
    Ok((inputs, outputs))
}

/// Binds each member to its contiguous slice of the aggregate inputs.
fn connect_partitioned(inputs: &[InputPort], members: &mut [BoxedComponent]) -> Result<()> {
    let handles = bound_handles(inputs)?;
    let mut offset = 0;
    for member in members {
        let n = member.input_ports().len();
        wire::bind_inputs(member, &handles[offset..offset + n])?;
        offset += n;
    }
    Ok(())
}

/// Independent sources presented as `Source<O>`.
pub struct ParallelSource<const O: usize> {
    members: Vec<BoxedComponent>,
    outputs: OutputPorts<O>,
}

impl<const O: usize> ParallelSource<O> {
    /// Groups `members`, whose output counts must sum to `O`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidArgument`] for fewer than two members or a
    /// member with inputs; [`PipelineError::PortCountMismatch`] if the sum is
    /// wrong.
    pub fn new(mut members: Vec<BoxedComponent>) -> Result<Self> {
        let owner = short_type_name::<Self>();
        let (_, outputs) = check_members(owner, &mut members, Role::Source)?;
        check_port_sum(owner, "output", O, outputs)?;

        let mut ports = OutputPorts::<O>::new();
        adopt_formats(owner, &mut ports, members.iter().flat_map(|m| m.output_ports()))?;
        Ok(Self {
            members,
            outputs: ports,
        })
    }
}

impl<const O: usize> Component for ParallelSource<O> {
    fn process(&mut self) -> Result<()> {
        tick_all(&mut self.members)?;
        republish(&mut self.outputs, self.members.iter().flat_map(|m| m.output_ports()));
        Ok(())
    }

    fn output_ports(&self) -> &[OutputPort] {
        &self.outputs
    }
}

impl<const O: usize> Source<O> for ParallelSource<O> {}

/// Independent filters presented as `Filter<I, O>`.
pub struct Parallel<const I: usize, const O: usize> {
    inputs: InputPorts<I>,
    outputs: OutputPorts<O>,
    members: Vec<BoxedComponent>,
}

impl<const I: usize, const O: usize> Parallel<I, O> {
    /// Groups `members`, whose input counts must sum to `I` and output counts
    /// to `O`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidArgument`] for fewer than two members or a
    /// member that is not a filter; [`PipelineError::PortCountMismatch`] if a
    /// sum is wrong.
    pub fn new(mut members: Vec<BoxedComponent>) -> Result<Self> {
        let owner = short_type_name::<Self>();
        let (inputs, outputs) = check_members(owner, &mut members, Role::Filter)?;
        check_port_sum(owner, "input", I, inputs)?;
        check_port_sum(owner, "output", O, outputs)?;
        Ok(Self {
            inputs: InputPorts::accepting(owner, &Accepts::Any),
            outputs: OutputPorts::new(),
            members,
        })
    }
}

impl<const I: usize, const O: usize> Component for Parallel<I, O> {
    fn on_inputs_connected(&mut self) -> Result<()> {
        connect_partitioned(&self.inputs, &mut self.members)?;
        adopt_formats(
            short_type_name::<Self>(),
            &mut self.outputs,
            self.members.iter().flat_map(|m| m.output_ports()),
        )
    }

    fn process(&mut self) -> Result<()> {
        tick_all(&mut self.members)?;
        republish(&mut self.outputs, self.members.iter().flat_map(|m| m.output_ports()));
        Ok(())
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }

    fn output_ports(&self) -> &[OutputPort] {
        &self.outputs
    }
}

impl<const I: usize, const O: usize> Filter<I, O> for Parallel<I, O> {}

/// Independent sinks presented as `Sink<I>`.
pub struct ParallelSink<const I: usize> {
    inputs: InputPorts<I>,
    members: Vec<BoxedComponent>,
}

impl<const I: usize> ParallelSink<I> {
    /// Groups `members`, whose input counts must sum to `I`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidArgument`] for fewer than two members or a
    /// member with outputs; [`PipelineError::PortCountMismatch`] if the sum is
    /// wrong.
    pub fn new(mut members: Vec<BoxedComponent>) -> Result<Self> {
        let owner = short_type_name::<Self>();
        let (inputs, _) = check_members(owner, &mut members, Role::Sink)?;
        check_port_sum(owner, "input", I, inputs)?;
        Ok(Self {
            inputs: InputPorts::accepting(owner, &Accepts::Any),
            members,
        })
    }
}

impl<const I: usize> Component for ParallelSink<I> {
    fn on_inputs_connected(&mut self) -> Result<()> {
        connect_partitioned(&self.inputs, &mut self.members)
    }

    fn process(&mut self) -> Result<()> {
        tick_all(&mut self.members)
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }
}

impl<const I: usize> Sink<I> for ParallelSink<I> {}
