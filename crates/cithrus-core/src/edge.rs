//! Edge records produced while wiring a graph.
//!
//! An [`Edge`] is the binding of one input port to one output port. Edges are
//! immutable once created: there is no API to disconnect a port, so the list a
//! [`Pipeline`](crate::Pipeline) collects during construction describes the
//! graph for its whole lifetime.

use std::fmt;

use crate::format::Format;

/// A directed binding from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Descriptor of the output port (`"<index> of <owner>"`).
    pub from: String,
    /// Descriptor of the input port.
    pub to: String,
    /// Format flowing over the edge, fixed at bind time.
    pub format: Format,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {} [{}]", self.from, self.to, self.format)
    }
}
