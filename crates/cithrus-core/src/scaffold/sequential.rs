//! End-to-end chains presented as one component.
//!
//! Members are added with typed constructors and `then()`, so the same
//! compile-time arity rule the [`Pipeline`](crate::Pipeline) builder enforces
//! holds inside a chain. A source-side chain is wired eagerly as it grows; a
//! filter or sink chain is wired when its aggregate inputs are connected.

use crate::component::{BoxedComponent, Component, Filter, Sink, Source, short_type_name};
use crate::error::Result;
use crate::format::Accepts;
use crate::port::{InputPort, InputPorts, OutputHandle, OutputPort, OutputPorts};
use crate::wire;

use super::{adopt_formats, bound_handles, republish, tick_all};

/// Members plus the `(inputs, outputs)` arity each was added under.
struct Chain {
    members: Vec<BoxedComponent>,
    declared: Vec<(usize, usize)>,
}

impl Chain {
    fn new() -> Self {
        Self {
            members: Vec::new(),
            declared: Vec::new(),
        }
    }

    fn push(&mut self, member: BoxedComponent, inputs: usize, outputs: usize) {
        self.members.push(member);
        self.declared.push((inputs, outputs));
    }

    fn check_declared(&mut self) -> Result<()> {
        for (member, &(i, o)) in self.members.iter_mut().zip(&self.declared) {
            wire::check_declared_arity(member, i, o)?;
        }
        Ok(())
    }

    /// Binds the first member to `handles`, then wires the rest.
    fn connect_from(&mut self, handles: &[OutputHandle]) -> Result<()> {
        self.check_declared()?;
        if let Some(first) = self.members.first_mut() {
            wire::bind_inputs(first, handles)?;
        }
        wire::connect_chain(&mut self.members)?;
        Ok(())
    }

    /// Wires the most recently pushed member to its predecessor.
    fn connect_last(&mut self) -> Result<()> {
        let n = self.members.len();
        let Some(&(i, o)) = self.declared.last() else {
            return Ok(());
        };
        wire::check_declared_arity(&mut self.members[n - 1], i, o)?;
        if n >= 2 {
            let (done, rest) = self.members.split_at_mut(n - 1);
            wire::connect_stage(&done[n - 2], &mut rest[0])?;
        }
        Ok(())
    }

    fn last_outputs(&self) -> &[OutputPort] {
        match self.members.last() {
            Some(last) => last.output_ports(),
            None => &[],
        }
    }

    fn tick(&mut self) -> Result<()> {
        tick_all(&mut self.members)
    }
}

/// A source followed by one or more filters, presented as `Source<O>`.
pub struct SequentialSource<const O: usize> {
    chain: Chain,
    outputs: OutputPorts<O>,
}

impl<const O: usize> SequentialSource<O> {
    /// Chains `source` into `filter`.
    ///
    /// # Errors
    ///
    /// Any wiring error between the two members.
    pub fn new<const M: usize>(
        source: impl Source<M> + 'static,
        filter: impl Filter<M, O> + 'static,
    ) -> Result<Self> {
        let mut chain = Chain::new();
        chain.push(Box::new(source), 0, M);
        chain.connect_last()?;
        chain.push(Box::new(filter), M, O);
        chain.connect_last()?;
        Self::finish(chain)
    }

    /// Appends another filter to the chain.
    ///
    /// # Errors
    ///
    /// Any wiring error between the current last member and `filter`.
    pub fn then<const P: usize>(
        self,
        filter: impl Filter<O, P> + 'static,
    ) -> Result<SequentialSource<P>> {
        let mut chain = self.chain;
        chain.push(Box::new(filter), O, P);
        chain.connect_last()?;
        SequentialSource::<P>::finish(chain)
    }

    fn finish(chain: Chain) -> Result<Self> {
        let mut outputs = OutputPorts::<O>::new();
        adopt_formats(short_type_name::<Self>(), &mut outputs, chain.last_outputs())?;
        Ok(Self { chain, outputs })
    }
}

impl<const O: usize> Component for SequentialSource<O> {
    fn process(&mut self) -> Result<()> {
        self.chain.tick()?;
        republish(&mut self.outputs, self.chain.last_outputs());
        Ok(())
    }

    fn output_ports(&self) -> &[OutputPort] {
        &self.outputs
    }
}

impl<const O: usize> Source<O> for SequentialSource<O> {}

/// Two or more filters end to end, presented as `Filter<I, O>`.
pub struct Sequential<const I: usize, const O: usize> {
    inputs: InputPorts<I>,
    outputs: OutputPorts<O>,
    chain: Chain,
}

impl<const I: usize, const O: usize> Sequential<I, O> {
    /// Chains `first` into `second`.
    pub fn new<const M: usize>(
        first: impl Filter<I, M> + 'static,
        second: impl Filter<M, O> + 'static,
    ) -> Self {
        let mut chain = Chain::new();
        chain.push(Box::new(first), I, M);
        chain.push(Box::new(second), M, O);
        Self {
            inputs: InputPorts::accepting(short_type_name::<Self>(), &Accepts::Any),
            outputs: OutputPorts::new(),
            chain,
        }
    }

    /// Appends another filter.
    #[must_use]
    pub fn then<const P: usize>(self, next: impl Filter<O, P> + 'static) -> Sequential<I, P> {
        let mut chain = self.chain;
        chain.push(Box::new(next), O, P);
        Sequential {
            inputs: InputPorts::accepting(short_type_name::<Sequential<I, P>>(), &Accepts::Any),
            outputs: OutputPorts::new(),
            chain,
        }
    }

    /// Terminates the chain with `sink`, turning it into a sink.
    #[must_use]
    pub fn end(self, sink: impl Sink<O> + 'static) -> SequentialSink<I> {
        let mut chain = self.chain;
        chain.push(Box::new(sink), O, 0);
        SequentialSink {
            inputs: InputPorts::accepting(short_type_name::<SequentialSink<I>>(), &Accepts::Any),
            chain,
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.chain.members.len()
    }

    /// Always `false`: a chain has at least two members.
    pub fn is_empty(&self) -> bool {
        self.chain.members.is_empty()
    }
}

impl<const I: usize, const O: usize> Component for Sequential<I, O> {
    fn on_inputs_connected(&mut self) -> Result<()> {
        let handles = bound_handles(&self.inputs)?;
        self.chain.connect_from(&handles)?;
        adopt_formats(
            short_type_name::<Self>(),
            &mut self.outputs,
            self.chain.last_outputs(),
        )
    }

    fn process(&mut self) -> Result<()> {
        self.chain.tick()?;
        republish(&mut self.outputs, self.chain.last_outputs());
        Ok(())
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }

    fn output_ports(&self) -> &[OutputPort] {
        &self.outputs
    }
}

impl<const I: usize, const O: usize> Filter<I, O> for Sequential<I, O> {}

/// One or more filters followed by a sink, presented as `Sink<I>`.
pub struct SequentialSink<const I: usize> {
    inputs: InputPorts<I>,
    chain: Chain,
}

impl<const I: usize> SequentialSink<I> {
    /// Chains `filter` into `sink`.
    pub fn new<const M: usize>(
        filter: impl Filter<I, M> + 'static,
        sink: impl Sink<M> + 'static,
    ) -> Self {
        let mut chain = Chain::new();
        chain.push(Box::new(filter), I, M);
        chain.push(Box::new(sink), M, 0);
        Self {
            inputs: InputPorts::accepting(short_type_name::<Self>(), &Accepts::Any),
            chain,
        }
    }
}

impl<const I: usize> Component for SequentialSink<I> {
    fn on_inputs_connected(&mut self) -> Result<()> {
        let handles = bound_handles(&self.inputs)?;
        self.chain.connect_from(&handles)
    }

    fn process(&mut self) -> Result<()> {
        self.chain.tick()
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }
}

impl<const I: usize> Sink<I> for SequentialSink<I> {}
