//! The component trait and its role markers.
//!
//! [`Component`] is the object-safe interface every stage implements: tick,
//! finalize after inputs are bound, and expose its ports. The role traits
//! [`Source`], [`Filter`] and [`Sink`] carry the port counts as const
//! generics. They add no methods; their only job is to let the typed builders
//! ([`Pipeline::builder`](crate::Pipeline::builder),
//! [`Sequential::then`](crate::scaffold::Sequential::then)) reject a graph
//! whose adjacent arities disagree before it is ever built.
//!
//! # Implementing a filter
//!
//! ```rust
//! use cithrus_core::{
//!     Accepts, Component, Filter, Format, FrameSlab, InputPort, InputPorts, OutputPort,
//!     OutputPorts, Result,
//! };
//!
//! struct Invert {
//!     inputs: InputPorts<1>,
//!     outputs: OutputPorts<1>,
//!     slab: FrameSlab,
//! }
//!
//! impl Invert {
//!     fn new() -> Self {
//!         Self {
//!             inputs: InputPorts::accepting("Invert", &Accepts::one(Format::BINARY)),
//!             outputs: OutputPorts::new(),
//!             slab: FrameSlab::new(),
//!         }
//!     }
//! }
//!
//! impl Component for Invert {
//!     fn on_inputs_connected(&mut self) -> Result<()> {
//!         self.outputs.initialize_all("Invert", &Format::BINARY)
//!     }
//!
//!     fn process(&mut self) -> Result<()> {
//!         let input = self.inputs[0].read()?;
//!         if input.is_empty() {
//!             self.outputs[0].clear();
//!             return Ok(());
//!         }
//!         let out = self.slab.write(input.len());
//!         for (o, i) in out.iter_mut().zip(input.as_bytes()) {
//!             *o = !i;
//!         }
//!         self.outputs[0].set_view(self.slab.view());
//!         Ok(())
//!     }
//!
//!     fn input_ports(&mut self) -> &mut [InputPort] {
//!         &mut self.inputs
//!     }
//!
//!     fn output_ports(&self) -> &[OutputPort] {
//!         &self.outputs
//!     }
//! }
//!
//! impl Filter<1, 1> for Invert {}
//! ```

use crate::error::Result;
use crate::port::{InputPort, OutputPort};

/// A node in a processing graph.
///
/// Port counts must never change after construction. Components are moved
/// onto runner threads, hence the `Send` bound.
pub trait Component: Send {
    /// Runs one tick.
    ///
    /// Reads inputs, writes outputs. When there is nothing to emit this tick
    /// the component must publish empty views rather than leave last tick's
    /// data in place.
    fn process(&mut self) -> Result<()>;

    /// Called once after every input port has been bound.
    ///
    /// Filters initialize their output formats here from their input formats,
    /// and reject formats they cannot process.
    fn on_inputs_connected(&mut self) -> Result<()> {
        Ok(())
    }

    /// The component's input ports, in index order.
    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut []
    }

    /// The component's output ports, in index order.
    fn output_ports(&self) -> &[OutputPort] {
        &[]
    }

    /// Display name used as the owner in port descriptors and logs.
    fn name(&self) -> &str {
        short_type_name::<Self>()
    }
}

/// A component with no inputs and `N` outputs.
pub trait Source<const N: usize>: Component {}

/// A component with `N` inputs and no outputs.
pub trait Sink<const N: usize>: Component {}

/// A component with `I` inputs and `O` outputs.
pub trait Filter<const I: usize, const O: usize>: Component {}

/// An owned, type-erased component.
pub type BoxedComponent = Box<dyn Component>;

impl<C: Component + ?Sized> Component for Box<C> {
    fn process(&mut self) -> Result<()> {
        (**self).process()
    }

    fn on_inputs_connected(&mut self) -> Result<()> {
        (**self).on_inputs_connected()
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        (**self).input_ports()
    }

    fn output_ports(&self) -> &[OutputPort] {
        (**self).output_ports()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Boxes a component for the runtime-checked constructors.
pub fn boxed(component: impl Component + 'static) -> BoxedComponent {
    Box::new(component)
}

/// Type name without its module path: `cithrus_core::scaffold::Passthrough<2>`
/// becomes `Passthrough<2>`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let end = full.find('<').unwrap_or(full.len());
    let start = full[..end].rfind("::").map_or(0, |i| i + 2);
    &full[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl Component for Bare {
        fn process(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn default_name_strips_module_path() {
        assert_eq!(Bare.name(), "Bare");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec<u8>");
        assert_eq!(short_type_name::<u32>(), "u32");
    }

    #[test]
    fn default_ports_are_empty() {
        let mut bare = Bare;
        assert!(bare.input_ports().is_empty());
        assert!(bare.output_ports().is_empty());
    }

    #[test]
    fn boxed_delegates() {
        let mut c = boxed(Bare);
        assert_eq!(c.name(), "Bare");
        assert!(c.process().is_ok());
    }
}
