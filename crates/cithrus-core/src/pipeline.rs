//! Linear processing graphs.
//!
//! A [`Pipeline`] owns an ordered list of components: one source, any number
//! of filters, one sink. Construction wires the list left to right (see
//! [`wire`](crate::wire)); [`run()`](Pipeline::run) ticks every component once
//! in construction order. The construction order is the schedule.
//!
//! # Typed construction
//!
//! ```rust,ignore
//! use cithrus_core::Pipeline;
//!
//! let mut pipeline = Pipeline::builder(camera)   // Source<1>
//!     .filter(to_yuv)                             // Filter<1, 1>
//!     .filter(splitter)                           // Filter<1, 2>
//!     .sink(writers)?;                            // Sink<2>
//! pipeline.run()?;
//! ```
//!
//! Each `filter()` changes the builder's arity parameter, so handing a
//! `Sink<1>` to a builder that currently carries two outputs does not compile.
//!
//! # Dynamic construction
//!
//! Graphs assembled at runtime (from a config file, say) go through
//! [`Pipeline::from_components`], which performs the same checks at runtime.

use std::fmt;

use crate::component::{BoxedComponent, Component, Filter, Sink, Source};
use crate::edge::Edge;
use crate::error::{PipelineError, Result};
use crate::wire;

/// An ordered, fully wired list of components.
pub struct Pipeline {
    components: Vec<BoxedComponent>,
    edges: Vec<Edge>,
    ticks: u64,
}

impl Pipeline {
    /// Starts a typed pipeline at `source`.
    pub fn builder<const N: usize, S: Source<N> + 'static>(source: S) -> PipelineBuilder<N> {
        PipelineBuilder {
            stages: vec![Box::new(source)],
            declared: vec![(0, N)],
        }
    }

    /// Builds a pipeline from a runtime list of components.
    ///
    /// The first component must have no inputs and the last no outputs.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InvalidArgument`] for fewer than two components or a
    ///   misplaced source/sink
    /// - [`PipelineError::ArityMismatch`] before any port is bound
    /// - any wiring error raised while binding
    ///
    /// On error every component is dropped; nothing partially wired escapes.
    pub fn from_components(mut components: Vec<BoxedComponent>) -> Result<Self> {
        if components.len() < 2 {
            return Err(PipelineError::invalid_argument(format!(
                "a pipeline needs a source and a sink, got {} component(s)",
                components.len()
            )));
        }
        if let Some(first) = components.first_mut()
            && !first.input_ports().is_empty()
        {
            return Err(PipelineError::invalid_argument(format!(
                "first component {} must be a source",
                first.name()
            )));
        }
        if let Some(last) = components.last()
            && !last.output_ports().is_empty()
        {
            return Err(PipelineError::invalid_argument(format!(
                "last component {} must be a sink",
                last.name()
            )));
        }

        let mut pipeline = Self {
            components,
            edges: Vec::new(),
            ticks: 0,
        };
        pipeline.edges = wire::connect_chain(&mut pipeline.components)?;
        tracing::debug!(
            "pipeline: wired {} components with {} edges",
            pipeline.components.len(),
            pipeline.edges.len()
        );
        Ok(pipeline)
    }

    /// Ticks every component once, in construction order.
    ///
    /// # Errors
    ///
    /// The first error aborts the tick; it is returned tagged with the name
    /// of the component that raised it.
    pub fn run(&mut self) -> Result<()> {
        tracing::trace!("pipeline: tick {}", self.ticks);
        for component in &mut self.components {
            component
                .process()
                .map_err(|e| e.in_stage(component.name()))?;
        }
        self.ticks += 1;
        Ok(())
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Always `false` for a constructed pipeline.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Component names in construction (and tick) order.
    pub fn component_names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name()).collect()
    }

    /// Edges created while wiring, in binding order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        // Sinks first: no reader outlives the writer it borrows from.
        while let Some(component) = self.components.pop() {
            drop(component);
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("components", &self.component_names())
            .field("edges", &self.edges.len())
            .field("ticks", &self.ticks)
            .finish()
    }
}

/// Typed pipeline builder; `N` is the output count of the last stage added.
pub struct PipelineBuilder<const N: usize> {
    stages: Vec<BoxedComponent>,
    declared: Vec<(usize, usize)>,
}

impl<const N: usize> PipelineBuilder<N> {
    /// Appends a filter whose input count matches the current output count.
    #[must_use]
    pub fn filter<const M: usize, F: Filter<N, M> + 'static>(
        mut self,
        filter: F,
    ) -> PipelineBuilder<M> {
        self.stages.push(Box::new(filter));
        self.declared.push((N, M));
        PipelineBuilder {
            stages: self.stages,
            declared: self.declared,
        }
    }

    /// Appends the sink and wires the pipeline.
    ///
    /// # Errors
    ///
    /// [`PipelineError::PortCountMismatch`] if a component's ports disagree
    /// with its declared role, otherwise any wiring error.
    pub fn sink<K: Sink<N> + 'static>(mut self, sink: K) -> Result<Pipeline> {
        self.stages.push(Box::new(sink));
        self.declared.push((N, 0));
        for (stage, &(inputs, outputs)) in self.stages.iter_mut().zip(&self.declared) {
            wire::check_declared_arity(stage, inputs, outputs)?;
        }
        Pipeline::from_components(self.stages)
    }

    /// Number of stages added so far.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always `false`: a builder starts with its source.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl<const N: usize> fmt::Debug for PipelineBuilder<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.stages.iter().map(|c| c.name()).collect();
        f.debug_struct("PipelineBuilder")
            .field("stages", &names)
            .field("outputs", &N)
            .finish()
    }
}
