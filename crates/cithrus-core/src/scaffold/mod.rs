//! Composite components.
//!
//! A scaffolding combinator owns a private sub-graph and presents it to the
//! outside as one [`Source`](crate::Source), [`Filter`](crate::Filter) or
//! [`Sink`](crate::Sink):
//!
//! | Combinator | Role | Shape |
//! |---|---|---|
//! | [`SequentialSource`], [`Sequential`], [`SequentialSink`] | any | members end to end |
//! | [`ParallelSource`], [`Parallel`], [`ParallelSink`] | any | members side by side, ports partitioned in order |
//! | [`Duplicator`] | `Filter<1, N>` | one frame fanned out, no copy |
//! | [`Sidechain`] | `Filter<I, O>` | extra inputs of a filter fed by a private source |
//! | [`Passthrough`] | `Filter<N, N>` | forwards data unchanged |
//! | [`ProxySink`] / [`ProxySource`] | `Sink<N>` / `Source<N>` | hand views across graph boundaries |
//!
//! Aggregate inputs accept any format. When the aggregate is connected, each
//! member is bound directly to the upstream output its aggregate port is bound
//! to, so the member's own format gate applies. Aggregate outputs take the
//! formats of the member outputs they mirror and republish those views after
//! every tick.

mod duplicator;
mod parallel;
mod passthrough;
mod proxy;
mod sequential;
mod sidechain;

pub use duplicator::Duplicator;
pub use parallel::{Parallel, ParallelSink, ParallelSource};
pub use passthrough::Passthrough;
pub use proxy::{ProxySink, ProxySource, ProxyTap};
pub use sequential::{Sequential, SequentialSink, SequentialSource};
pub use sidechain::Sidechain;

use crate::component::Component;
use crate::error::{PipelineError, Result};
use crate::port::{InputPort, OutputHandle, OutputPort};

/// Collects the upstream handles a set of aggregate inputs is bound to.
fn bound_handles(inputs: &[InputPort]) -> Result<Vec<OutputHandle>> {
    inputs
        .iter()
        .map(|input| input.connected_output().cloned())
        .collect()
}

/// Initializes aggregate outputs with the formats of the member outputs they
/// mirror, in order.
fn adopt_formats<'a>(
    owner: &str,
    outputs: &mut [OutputPort],
    inner: impl IntoIterator<Item = &'a OutputPort>,
) -> Result<()> {
    for (outer, inner) in outputs.iter_mut().zip(inner) {
        let format = inner
            .format()
            .ok_or_else(|| PipelineError::PortNotInitialized {
                port: inner.descriptor(),
            })?;
        outer.initialize(owner, format)?;
    }
    Ok(())
}

/// Copies member output views onto the aggregate outputs.
fn republish<'a>(outputs: &mut [OutputPort], inner: impl IntoIterator<Item = &'a OutputPort>) {
    for (outer, inner) in outputs.iter_mut().zip(inner) {
        outer.set_view(inner.view());
    }
}

/// Ticks members in order, tagging errors with the failing member.
fn tick_all(members: &mut [Box<dyn Component>]) -> Result<()> {
    for member in members {
        member.process().map_err(|e| e.in_stage(member.name()))?;
    }
    Ok(())
}

/// Sum of a port count over the members, checked against the combinator's
/// declared count.
fn check_port_sum(
    component: &str,
    direction: &'static str,
    declared: usize,
    actual: usize,
) -> Result<()> {
    if declared == actual {
        Ok(())
    } else {
        Err(PipelineError::PortCountMismatch {
            component: component.to_owned(),
            direction,
            declared,
            actual,
        })
    }
}
