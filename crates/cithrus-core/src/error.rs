//! Error taxonomy for graph construction and ticking.
//!
//! Every failure the framework can report is a [`PipelineError`] variant. The
//! variants fall into four [`ErrorKind`]s that tell the caller what to do:
//!
//! - **Configuration**: the graph is malformed. Detected while wiring; the
//!   construction attempt must be discarded.
//! - **InvalidArgument**: a constructor received an unusable argument (too few
//!   members, a zero-sized combinator, an unknown component).
//! - **Precondition**: the framework was used incorrectly at runtime (reading
//!   an unbound input). Not recoverable for the current tick.
//! - **Runtime**: a leaf component failed inside `process()`. Escapes to the
//!   nearest runner boundary.
//!
//! A port whose upstream produced nothing this tick is *not* an error; it
//! carries an empty [`BufferView`](crate::BufferView).

use thiserror::Error;

use crate::format::{Accepts, Format};

/// Convenience alias used throughout the crate.
pub type Result<T, E = PipelineError> = core::result::Result<T, E>;

/// Coarse classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed graph, detected at construction time.
    Configuration,
    /// Unusable constructor argument.
    InvalidArgument,
    /// Framework-usage bug observed at runtime.
    Precondition,
    /// Failure reported by a leaf component while ticking.
    Runtime,
}

/// Errors raised while building or ticking a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A port was initialized a second time.
    #[error("port {port} has already been initialized")]
    PortAlreadyInitialized {
        /// Descriptor of the port (`"<index> of <owner>"`).
        port: String,
    },

    /// A port was used before being initialized.
    #[error("port {port} has not been initialized")]
    PortNotInitialized {
        /// Descriptor of the port.
        port: String,
    },

    /// An input port that already has a binding was connected again.
    #[error("input port {input} is already connected")]
    AlreadyConnected {
        /// Descriptor of the input port.
        input: String,
    },

    /// The output's format is not in the input's accepted set.
    #[error(
        "input port {input} does not accept {format} data from output port {output} \
         (accepts {accepts}); the pipeline must be rearranged so that the ports are compatible"
    )]
    FormatMismatch {
        /// Descriptor of the input port.
        input: String,
        /// Descriptor of the output port.
        output: String,
        /// Format declared by the output.
        format: Format,
        /// Formats the input accepts.
        accepts: Accepts,
    },

    /// An output's format was changed after it had been connected.
    #[error("output port {port} is connected; its format can no longer change to {format}")]
    FormatLocked {
        /// Descriptor of the output port.
        port: String,
        /// The rejected new format.
        format: Format,
    },

    /// Adjacent stages disagree on the number of ports between them.
    #[error("{upstream} has {outputs} output(s) but {downstream} has {inputs} input(s)")]
    ArityMismatch {
        /// Name of the upstream component.
        upstream: String,
        /// Name of the downstream component.
        downstream: String,
        /// Output count of the upstream component.
        outputs: usize,
        /// Input count of the downstream component.
        inputs: usize,
    },

    /// A component's port arrays disagree with the arity it declares, or a
    /// combinator's members do not add up to the combinator's arity.
    #[error("{component} declares {declared} {direction} port(s) but provides {actual}")]
    PortCountMismatch {
        /// Name of the offending component or combinator.
        component: String,
        /// `"input"` or `"output"`.
        direction: &'static str,
        /// Port count required by the declared role.
        declared: usize,
        /// Port count actually present.
        actual: usize,
    },

    /// A component rejected its upstream format while finalizing its outputs.
    #[error("{component} cannot process {format} input")]
    UnsupportedFormat {
        /// Name of the rejecting component.
        component: String,
        /// The rejected format.
        format: Format,
    },

    /// Unusable constructor argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An input port was read before it was bound to an output.
    #[error("input port {port} is not connected to an output")]
    Unbound {
        /// Descriptor of the input port.
        port: String,
    },

    /// The output an input is bound to has been dropped with its component.
    #[error("output port {port} was released by its owner")]
    PortReleased {
        /// Descriptor of the released output port.
        port: String,
    },

    /// An error raised while ticking, tagged with the component that raised it.
    #[error("{component}: {source}")]
    Stage {
        /// Name of the component whose `process()` failed.
        component: String,
        /// The underlying error.
        source: Box<PipelineError>,
    },

    /// A leaf component failed while processing a tick.
    #[error("{component} failed: {message}")]
    Component {
        /// Name of the failing component.
        component: String,
        /// Human-readable failure description.
        message: String,
    },
}

impl PipelineError {
    /// Returns the coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PortAlreadyInitialized { .. }
            | Self::PortNotInitialized { .. }
            | Self::AlreadyConnected { .. }
            | Self::FormatMismatch { .. }
            | Self::FormatLocked { .. }
            | Self::ArityMismatch { .. }
            | Self::PortCountMismatch { .. }
            | Self::UnsupportedFormat { .. } => ErrorKind::Configuration,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Unbound { .. } | Self::PortReleased { .. } => ErrorKind::Precondition,
            Self::Component { .. } => ErrorKind::Runtime,
            Self::Stage { source, .. } => source.kind(),
        }
    }

    /// Creates an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates a leaf-component failure.
    pub fn component(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported-format rejection.
    pub fn unsupported_format(component: impl Into<String>, format: Format) -> Self {
        Self::UnsupportedFormat {
            component: component.into(),
            format,
        }
    }

    /// Tags an error with the name of the component that raised it.
    ///
    /// Leaf failures already name their component and are returned unchanged.
    pub fn in_stage(self, component: &str) -> Self {
        match self {
            Self::Component { .. } | Self::Stage { .. } => self,
            other => Self::Stage {
                component: component.to_owned(),
                source: Box::new(other),
            },
        }
    }

    /// Returns `true` for errors detected while wiring a graph.
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
