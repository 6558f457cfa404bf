//! CiThruS Core - typed pipeline composition and execution
//!
//! This crate provides the framework every media-processing stage plugs into:
//! typed ports, component roles with compile-time arity, the graph wiring
//! protocol, composite "scaffolding" components, and the double-buffered
//! handoff used by components fed from foreign threads.
//!
//! # Core Abstractions
//!
//! ## Ports and buffers
//!
//! - [`OutputPort`] / [`InputPort`] - typed endpoints; formats are checked once, at bind time
//! - [`BufferView`] - shared, read-only view of one frame (or the empty "no data" view)
//! - [`FrameSlab`] - per-output reusable arena with copy-on-write
//! - [`Format`] / [`Accepts`] - format tags and acceptance sets
//!
//! ## Components
//!
//! - [`Component`] - object-safe trait every stage implements
//! - [`Source`], [`Filter`], [`Sink`] - role markers carrying port counts as const generics
//!
//! ## Graphs
//!
//! - [`Pipeline`] - ordered source → filters → sink list, ticked in construction order
//! - [`scaffold`] - combinators presenting a sub-graph as one component
//! - [`AsyncPipelineRunner`] - ticks a pipeline on its own thread
//!
//! ## Cross-thread input
//!
//! - [`DoubleBuffer`] / [`Publisher`] - tear-free frame handoff from a foreign producer
//!
//! # Example
//!
//! ```rust,ignore
//! use cithrus_core::{AsyncPipelineRunner, Pipeline};
//!
//! // Arities are checked by the type system: each stage's input count
//! // must equal the previous stage's output count.
//! let pipeline = Pipeline::builder(camera)
//!     .filter(BgraToRgbaConverter::new())
//!     .filter(RgbaToYuvConverter::new())
//!     .sink(FileSink::create("out.yuv")?)?;
//!
//! let runner = AsyncPipelineRunner::spawn(pipeline)?;
//! // ...
//! let report = runner.stop();
//! ```
//!
//! # Errors
//!
//! Everything fallible returns [`PipelineError`]. Use [`PipelineError::kind`]
//! to tell a malformed graph from a runtime failure.

pub mod buffer;
pub mod component;
pub mod edge;
pub mod error;
pub mod format;
pub mod handoff;
pub mod pipeline;
pub mod port;
pub mod runner;
pub mod scaffold;
pub mod wire;

#[cfg(test)]
mod testing;

pub use buffer::{BufferView, FrameSlab};
pub use component::{BoxedComponent, Component, Filter, Sink, Source, boxed, short_type_name};
pub use edge::Edge;
pub use error::{ErrorKind, PipelineError, Result};
pub use format::{Accepts, Format};
pub use handoff::{DoubleBuffer, HandoffStats, Publisher};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use port::{InputPort, InputPorts, OutputHandle, OutputPort, OutputPorts};
pub use runner::{AsyncPipelineRunner, RunOutcome, RunnerConfig, RunnerReport};
