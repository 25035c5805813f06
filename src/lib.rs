//! # Galaxy
//!
//! Procedural spiral galaxies as GPU point clouds.
//!
//! A handful of parameters (particle count, radius, number of branches,
//! spin, scatter exponent and two colors) are sampled into a point cloud.
//! Each point sits on one of several radial branches, twisted in proportion
//! to its distance from the center, pushed off the branch by a power-law
//! random offset, and colored along a gradient from the inside color to the
//! outside color. The cloud rotates slowly about the vertical axis.
//!
//! ## Quick Start
//!
//! ```ignore
//! use galaxy::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     Viewer::new()
//!         .with_params(ParameterSet {
//!             branches: 3,
//!             spin: 1.5,
//!             ..Default::default()
//!         })
//!         .run()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Without a window
//!
//! Sampling is plain CPU work and needs no GPU:
//!
//! ```
//! use galaxy::{generator, ParameterSet};
//!
//! let params = ParameterSet { count: 1000, ..Default::default() };
//! let buffer = generator::sample(&params);
//! assert_eq!(buffer.len(), 1000);
//! assert_eq!(buffer.positions().len(), 3000);
//! ```
//!
//! [`SceneManager`] keeps exactly one live galaxy in any [`RenderGraph`]
//! backend and rebuilds it when a [`SceneEvent::ParameterChanged`] arrives.
//! The wgpu backend is [`GpuScene`].
//!
//! ## Limits
//!
//! Every point costs 24 bytes of vertex data, so the largest allowed galaxy
//! (1,000,000 points) holds 24 MB on the GPU.

pub mod error;
pub mod generator;
mod gpu;
pub mod material;
#[cfg(feature = "egui")]
pub mod panel;
pub mod params;
pub mod scene;
pub mod time;
mod viewer;

pub use error::{GpuError, ParamsError, ViewerError};
pub use generator::ParticleBuffer;
pub use glam::Vec3;
pub use gpu::{Camera, Frame, GpuScene, GpuState, PointsId};
pub use material::{BlendMode, PointsMaterial};
pub use params::ParameterSet;
pub use scene::{GalaxyResource, RenderGraph, SceneEvent, SceneManager, ROTATION_SPEED};
pub use viewer::Viewer;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use galaxy::prelude::*;
/// ```
pub mod prelude {
    pub use crate::generator::{sample, sample_with, ParticleBuffer};
    pub use crate::params::ParameterSet;
    pub use crate::scene::{RenderGraph, SceneEvent, SceneManager};
    pub use crate::time::Time;
    pub use crate::viewer::Viewer;
    pub use crate::Vec3;
}
