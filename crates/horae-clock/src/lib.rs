//! Horae clock core.
//!
//! A live extruded-text clock: the tick driver decides when the displayed
//! time changes, the text mesh factory builds label geometry, and
//! `SceneResources` owns every GPU object across regenerations and style
//! changes. `ClockScene` ties them together in one per-frame loop.

pub mod assets;
pub mod camera;
pub mod command;
pub mod config;
pub mod error;
pub mod gpu_host;
pub mod mesh;
pub mod resources;
pub mod scene;
pub mod style;
pub mod text;
pub mod time;

pub use assets::{AssetProvider, DecodedImage, ImageSource, ThreadedLoader};
pub use camera::{CameraController, CameraInput, IdleMotion};
pub use command::{Command, Toggle};
pub use config::{ClockConfig, HourCycle, MaterialPolicy};
pub use error::{AssetLoadError, ResourceError, TextMeshError};
pub use gpu_host::WgpuHost;
pub use resources::{LiveCounts, ResourceHost, ResourceId, SceneResources};
pub use scene::{ClockScene, LabelDraw, SceneFrame};
pub use style::{BackgroundMode, LabelKind, StyleTarget};
pub use text::{FontCatalog, FontKey};
pub use time::TimeSample;
