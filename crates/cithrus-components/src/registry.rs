//! Name-based component factory.
//!
//! The registry maps a stable id (`"rgba_to_yuv"`) to a descriptor and a
//! factory, so pipelines can be assembled from configuration files. Every
//! descriptor states the component's role and port counts, which lets a
//! configuration be checked for arity before anything is constructed.

use cithrus_core::scaffold::{Duplicator, Passthrough};
use cithrus_core::{BoxedComponent, Format, boxed, wire};
use serde::Serialize;

use crate::error::{RegistryError, RegistryResult};
use crate::params::{ParamReader, Params};
use crate::{
    BgraToRgbaConverter, BlinkerSource, FileSink, FrameCounter, ImageConcatenator, NullSink,
    RgbaToYuvConverter, SolidColorSource, YuvToRgbaConverter,
};

/// Where a component may sit in a linear pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentRole {
    /// No inputs; starts a pipeline.
    Source,
    /// Inputs and outputs; sits between source and sink.
    Filter,
    /// No outputs; ends a pipeline.
    Sink,
}

impl ComponentRole {
    /// Lowercase display name.
    pub const fn name(&self) -> &'static str {
        match self {
            ComponentRole::Source => "source",
            ComponentRole::Filter => "filter",
            ComponentRole::Sink => "sink",
        }
    }
}

/// A parameter a component understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: &'static str,
    /// What the parameter controls.
    pub description: &'static str,
    /// Value used when the parameter is omitted, if any.
    pub default: Option<&'static str>,
    /// Whether the parameter must be supplied.
    pub required: bool,
}

impl ParamSpec {
    const fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            default: None,
            required: true,
        }
    }

    const fn optional(
        name: &'static str,
        description: &'static str,
        default: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            description,
            default,
            required: false,
        }
    }
}

/// Describes a registered component.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentDescriptor {
    /// Unique identifier (lowercase, underscores).
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Pipeline role.
    pub role: ComponentRole,
    /// Number of input ports.
    pub inputs: usize,
    /// Number of output ports.
    pub outputs: usize,
    /// Accepted parameters.
    pub params: &'static [ParamSpec],
}

impl ComponentDescriptor {
    /// Looks up a parameter spec by name.
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// Factory function type for creating components.
pub type ComponentFactory = fn(&ParamReader<'_>) -> RegistryResult<BoxedComponent>;

struct RegistryEntry {
    descriptor: ComponentDescriptor,
    factory: ComponentFactory,
}

/// Registry of every component that can be created by name.
pub struct ComponentRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

const WIDTH: ParamSpec = ParamSpec::required("width", "Frame width in pixels");
const HEIGHT: ParamSpec = ParamSpec::required("height", "Frame height in pixels");
const SIZE: &[ParamSpec] = &[WIDTH, HEIGHT];

const SOLID_COLOR_PARAMS: &[ParamSpec] = &[
    WIDTH,
    HEIGHT,
    ParamSpec::optional("format", "rgba, bgra or yuv420", Some("rgba")),
    ParamSpec::optional(
        "color",
        "Comma-separated r,g,b,a (packed) or y,u,v (yuv420)",
        None,
    ),
];

const BLINKER_PARAMS: &[ParamSpec] = &[
    WIDTH,
    HEIGHT,
    ParamSpec::optional("format", "rgba or bgra", Some("rgba")),
    ParamSpec::optional("frequency", "Full black-white cycles per second", Some("1")),
    ParamSpec::optional("log", "File receiving a line per color switch", None),
];

const YUV_TO_RGBA_PARAMS: &[ParamSpec] = &[
    WIDTH,
    HEIGHT,
    ParamSpec::optional("format", "rgba or bgra", Some("rgba")),
];

const FILE_SINK_PARAMS: &[ParamSpec] = &[ParamSpec::required("path", "Output file (truncated)")];

impl ComponentRegistry {
    /// Creates a registry with all built-in components registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(12),
        };
        registry.register_builtin();
        registry
    }

    /// Creates a registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn register_builtin(&mut self) {
        // Sources
        self.register(
            ComponentDescriptor {
                id: "solid_color",
                name: "Solid Color",
                description: "Constant single-color image",
                role: ComponentRole::Source,
                inputs: 0,
                outputs: 1,
                params: SOLID_COLOR_PARAMS,
            },
            create_solid_color,
        );

        self.register(
            ComponentDescriptor {
                id: "blinker",
                name: "Blinker",
                description: "Alternating black and white frames for latency tests",
                role: ComponentRole::Source,
                inputs: 0,
                outputs: 1,
                params: BLINKER_PARAMS,
            },
            |p| {
                let blinker = BlinkerSource::new(
                    p.require("width")?,
                    p.require("height")?,
                    p.format("format", Format::RGBA),
                    p.or("frequency", 1.0)?,
                )?;
                let blinker = match p.raw("log") {
                    Some(path) => blinker.with_log(path).map_err(|source| RegistryError::Io {
                        component: p.component().to_owned(),
                        path: path.into(),
                        source,
                    })?,
                    None => blinker,
                };
                Ok(boxed(blinker))
            },
        );

        // Filters
        self.register(
            ComponentDescriptor {
                id: "bgra_to_rgba",
                name: "BGRA/RGBA Swap",
                description: "Swaps red and blue; output is the opposite packed layout",
                role: ComponentRole::Filter,
                inputs: 1,
                outputs: 1,
                params: &[],
            },
            |_| Ok(boxed(BgraToRgbaConverter::new())),
        );

        self.register(
            ComponentDescriptor {
                id: "rgba_to_yuv",
                name: "RGBA to YUV",
                description: "Packed rgba/bgra to planar yuv420 (BT.601)",
                role: ComponentRole::Filter,
                inputs: 1,
                outputs: 1,
                params: SIZE,
            },
            |p| {
                Ok(boxed(RgbaToYuvConverter::new(
                    p.require("width")?,
                    p.require("height")?,
                )?))
            },
        );

        self.register(
            ComponentDescriptor {
                id: "yuv_to_rgba",
                name: "YUV to RGBA",
                description: "Planar yuv420 to packed rgba/bgra (BT.601)",
                role: ComponentRole::Filter,
                inputs: 1,
                outputs: 1,
                params: YUV_TO_RGBA_PARAMS,
            },
            |p| {
                Ok(boxed(YuvToRgbaConverter::new(
                    p.require("width")?,
                    p.require("height")?,
                    p.format("format", Format::RGBA),
                )?))
            },
        );

        self.register(
            ComponentDescriptor {
                id: "passthrough",
                name: "Passthrough",
                description: "Forwards its input unchanged",
                role: ComponentRole::Filter,
                inputs: 1,
                outputs: 1,
                params: &[],
            },
            |_| Ok(boxed(Passthrough::<1>::new())),
        );

        self.register(
            ComponentDescriptor {
                id: "duplicator_2",
                name: "Duplicator (2)",
                description: "Shares one frame on two outputs",
                role: ComponentRole::Filter,
                inputs: 1,
                outputs: 2,
                params: &[],
            },
            |_| Ok(boxed(Duplicator::<2>::new())),
        );

        self.register(
            ComponentDescriptor {
                id: "concat_2",
                name: "Concatenate (2)",
                description: "Stacks two yuv420 images vertically",
                role: ComponentRole::Filter,
                inputs: 2,
                outputs: 1,
                params: SIZE,
            },
            |p| {
                Ok(boxed(ImageConcatenator::<2>::new(
                    p.require("width")?,
                    p.require("height")?,
                )?))
            },
        );

        self.register(
            ComponentDescriptor {
                id: "concat_4",
                name: "Concatenate (4)",
                description: "Stacks four yuv420 images vertically",
                role: ComponentRole::Filter,
                inputs: 4,
                outputs: 1,
                params: SIZE,
            },
            |p| {
                Ok(boxed(ImageConcatenator::<4>::new(
                    p.require("width")?,
                    p.require("height")?,
                )?))
            },
        );

        // Sinks
        self.register(
            ComponentDescriptor {
                id: "frame_counter",
                name: "Frame Counter",
                description: "Counts frames and bytes, logs a summary when dropped",
                role: ComponentRole::Sink,
                inputs: 1,
                outputs: 0,
                params: &[],
            },
            |_| Ok(boxed(FrameCounter::new())),
        );

        self.register(
            ComponentDescriptor {
                id: "file_sink",
                name: "File Sink",
                description: "Writes every frame to a file, back to back",
                role: ComponentRole::Sink,
                inputs: 1,
                outputs: 0,
                params: FILE_SINK_PARAMS,
            },
            |p| {
                let path: String = p.require("path")?;
                FileSink::create(&path)
                    .map(boxed)
                    .map_err(|source| RegistryError::Io {
                        component: p.component().to_owned(),
                        path: path.into(),
                        source,
                    })
            },
        );

        self.register(
            ComponentDescriptor {
                id: "null_sink",
                name: "Null Sink",
                description: "Discards everything",
                role: ComponentRole::Sink,
                inputs: 1,
                outputs: 0,
                params: &[],
            },
            |_| Ok(boxed(NullSink::<1>::new())),
        );
    }

    /// Registers a component, replacing any previous entry with the same id.
    pub fn register(&mut self, descriptor: ComponentDescriptor, factory: ComponentFactory) {
        self.entries.retain(|e| e.descriptor.id != descriptor.id);
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
    }

    /// All registered components, in registration order.
    pub fn all(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.entries.iter().map(|e| &e.descriptor)
    }

    /// Components with the given role.
    pub fn with_role(&self, role: ComponentRole) -> impl Iterator<Item = &ComponentDescriptor> {
        self.all().filter(move |d| d.role == role)
    }

    /// Looks up a descriptor by id.
    pub fn get(&self, id: &str) -> Option<&ComponentDescriptor> {
        self.all().find(|d| d.id == id)
    }

    /// Creates component `id` configured by `params`.
    ///
    /// Unknown parameter names are refused rather than ignored, and the new
    /// component's port counts are checked against its descriptor.
    pub fn create(&self, id: &str, params: &Params) -> RegistryResult<BoxedComponent> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.descriptor.id == id)
            .ok_or_else(|| RegistryError::UnknownComponent(id.to_owned()))?;
        let descriptor = &entry.descriptor;

        let reader = ParamReader::new(descriptor.id, params);
        if let Some(key) = params.keys().find(|k| descriptor.param(k).is_none()) {
            return Err(reader.invalid(key, "unknown parameter"));
        }

        let mut component = (entry.factory)(&reader)?;
        wire::check_declared_arity(component.as_mut(), descriptor.inputs, descriptor.outputs)?;
        tracing::debug!("registry: created {id} ({})", component.name());
        Ok(component)
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn create_solid_color(p: &ParamReader<'_>) -> RegistryResult<BoxedComponent> {
    let width = p.require("width")?;
    let height = p.require("height")?;
    let format = p.format("format", Format::RGBA);
    let source = if format == Format::RGBA {
        SolidColorSource::rgba(width, height, p.bytes("color", [0, 0, 0, 255])?)
    } else if format == Format::BGRA {
        SolidColorSource::bgra(width, height, p.bytes("color", [0, 0, 0, 255])?)
    } else if format == Format::YUV420 {
        SolidColorSource::yuv(width, height, p.bytes("color", [0, 128, 128])?)
    } else {
        return Err(p.invalid("format", format!("unsupported format '{format}'")));
    };
    Ok(boxed(source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cithrus_core::Component;

    #[test]
    fn builtin_ids_are_unique() {
        let registry = ComponentRegistry::new();
        let mut ids: Vec<_> = registry.all().map(|d| d.id).collect();
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert_eq!(registry.len(), count);
    }

    #[test]
    fn roles_match_port_counts() {
        let registry = ComponentRegistry::new();
        for d in registry.all() {
            match d.role {
                ComponentRole::Source => assert!(d.inputs == 0 && d.outputs > 0, "{}", d.id),
                ComponentRole::Filter => assert!(d.inputs > 0 && d.outputs > 0, "{}", d.id),
                ComponentRole::Sink => assert!(d.inputs > 0 && d.outputs == 0, "{}", d.id),
            }
        }
        assert_eq!(registry.with_role(ComponentRole::Source).count(), 2);
    }

    #[test]
    fn parameterless_components_can_be_created() {
        let registry = ComponentRegistry::new();
        for id in ["bgra_to_rgba", "passthrough", "duplicator_2", "frame_counter", "null_sink"] {
            let component = registry.create(id, &Params::new()).unwrap();
            let d = registry.get(id).unwrap();
            assert_eq!(component.output_ports().len(), d.outputs, "{id}");
        }
    }

    #[test]
    fn sized_components_need_dimensions() {
        let registry = ComponentRegistry::new();
        let err = registry.create("rgba_to_yuv", &Params::new()).err().unwrap();
        assert!(matches!(err, RegistryError::MissingParameter { .. }), "got {err}");

        let params = Params::new().with("width", "4").with("height", "3");
        let err = registry.create("concat_2", &params).err().unwrap();
        assert!(matches!(err, RegistryError::Pipeline(_)), "got {err}");

        let params = Params::new().with("width", "4").with("height", "2");
        assert!(registry.create("concat_4", &params).is_ok());
    }

    #[test]
    fn unknown_ids_and_params_are_refused() {
        let registry = ComponentRegistry::new();
        assert!(matches!(
            registry.create("warp", &Params::new()).err().unwrap(),
            RegistryError::UnknownComponent(_)
        ));
        let err = registry
            .create("passthrough", &Params::new().with("gain", "2"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("unknown parameter"), "got {err}");
    }

    #[test]
    fn solid_color_formats() {
        let registry = ComponentRegistry::new();
        let params = Params::new()
            .with("width", "2")
            .with("height", "2")
            .with("format", "yuv420")
            .with("color", "16,128,128");
        let mut source = registry.create("solid_color", &params).unwrap();
        source.process().unwrap();
        assert_eq!(source.output_ports()[0].view().len(), 6);

        let params = Params::new()
            .with("width", "2")
            .with("height", "2")
            .with("format", "hevc");
        assert!(registry.create("solid_color", &params).is_err());
    }

    #[test]
    fn blinker_frequency_out_of_range_is_an_error() {
        let params = Params::new()
            .with("width", "1")
            .with("height", "1")
            .with("frequency", "1e-300");
        let err = ComponentRegistry::new().create("blinker", &params).err().unwrap();
        assert!(matches!(err, RegistryError::Pipeline(_)), "got {err}");
    }

    #[test]
    fn file_sink_reports_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no/such/dir/out.yuv");
        let params = Params::new().with("path", missing.to_string_lossy());
        let err = registry_create(&params);
        assert!(matches!(err, RegistryError::Io { .. }), "got {err}");
    }

    fn registry_create(params: &Params) -> RegistryError {
        ComponentRegistry::new().create("file_sink", params).err().unwrap()
    }

    #[test]
    fn descriptors_serialize() {
        let registry = ComponentRegistry::new();
        let json = serde_json::to_value(registry.get("blinker").unwrap()).unwrap();
        assert_eq!(json["role"], "source");
        assert_eq!(json["params"][3]["default"], "1");
    }
}
