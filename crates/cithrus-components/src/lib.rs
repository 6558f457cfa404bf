//! CiThruS Components - leaf stages and a registry for cithrus pipelines
//!
//! Concrete components built on `cithrus-core`, plus the name-based factory
//! the configuration layer uses to assemble pipelines from files.
//!
//! # Sources
//!
//! - [`SolidColorSource`] - constant rgba/bgra/yuv420 image
//! - [`BlinkerSource`] - alternating black and white frames at a set frequency
//! - [`HandoffSource`] - frames published from a foreign thread
//!
//! # Filters
//!
//! - [`BgraToRgbaConverter`] - red/blue channel swap in either direction
//! - [`RgbaToYuvConverter`] / [`YuvToRgbaConverter`] - BT.601 fixed-point colorspace conversion
//! - [`ImageConcatenator`] - vertical stacking of `N` yuv420 images
//!
//! # Sinks
//!
//! - [`FrameCounter`] - frame and byte counters readable from other threads
//! - [`FileSink`] - raw frames appended to a file
//! - [`NullSink`] - discards everything
//!
//! # Example
//!
//! ```rust
//! use cithrus_components::{FrameCounter, RgbaToYuvConverter, SolidColorSource};
//! use cithrus_core::Pipeline;
//!
//! let counter = FrameCounter::new();
//! let stats = counter.stats();
//! let mut pipeline = Pipeline::builder(SolidColorSource::rgba(64, 48, [255, 0, 0, 255]))
//!     .filter(RgbaToYuvConverter::new(64, 48).unwrap())
//!     .sink(counter)
//!     .unwrap();
//!
//! pipeline.run().unwrap();
//! assert_eq!(stats.snapshot().last_len, 64 * 48 * 3 / 2);
//! ```
//!
//! Components can also be created by name:
//!
//! ```rust
//! use cithrus_components::{ComponentRegistry, Params};
//! use cithrus_core::Component;
//!
//! let registry = ComponentRegistry::new();
//! let sink = registry.create("null_sink", &Params::new()).unwrap();
//! assert_eq!(sink.name(), "NullSink<1>");
//! ```

mod blinker;
mod channel_swap;
mod concat;
mod error;
mod handoff_source;
mod params;
mod sinks;
mod solid_color;

/// Component registry and descriptors.
pub mod registry;

/// YUV 4:2:0 conversion.
pub mod yuv;

pub use blinker::BlinkerSource;
pub use channel_swap::BgraToRgbaConverter;
pub use concat::ImageConcatenator;
pub use error::{RegistryError, RegistryResult};
pub use handoff_source::HandoffSource;
pub use params::{ParamReader, Params};
pub use registry::{
    ComponentDescriptor, ComponentFactory, ComponentRegistry, ComponentRole, ParamSpec,
};
pub use sinks::{FileSink, FrameCounter, FrameStats, NullSink, StatsHandle};
pub use solid_color::SolidColorSource;
pub use yuv::{RgbaToYuvConverter, YuvToRgbaConverter};
