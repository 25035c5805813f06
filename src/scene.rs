//! Scene management: owns the live galaxy and replaces it on demand.
//!
//! [`SceneManager`] is generic over a [`RenderGraph`], the backend that
//! actually holds GPU memory and draws. The manager guarantees that at most
//! one [`GalaxyResource`] exists at a time: the old one is disposed and
//! detached before the replacement is even sampled.
//!
//! ```ignore
//! let mut scene = SceneManager::new(gpu.create_scene());
//! scene.regenerate(&ParameterSet::default());
//!
//! // every frame
//! scene.tick(time.elapsed());
//!
//! // when the control panel finishes an edit
//! scene.handle(SceneEvent::ParameterChanged(params));
//! ```

use std::time::Instant;

use tracing::{debug, info};

use crate::generator::{self, ParticleBuffer};
use crate::material::PointsMaterial;
use crate::params::ParameterSet;

/// Radians of rotation about the vertical axis per elapsed second.
pub const ROTATION_SPEED: f32 = 0.3;

/// Backend that owns drawable point clouds.
///
/// The scene manager only talks to the GPU through this trait, so tests can
/// substitute a counting mock.
pub trait RenderGraph {
    /// Identifies one drawable point cloud.
    type Handle: Copy + Eq + std::fmt::Debug;

    /// Upload the geometry (`position` and `color` attributes), build the
    /// material and wrap them in a drawable. The drawable is not attached.
    fn create_points(
        &mut self,
        geometry: &ParticleBuffer,
        material: &PointsMaterial,
    ) -> Self::Handle;

    /// Release the geometry and material memory behind `handle`.
    fn dispose(&mut self, handle: Self::Handle);

    /// Attach the drawable so it is drawn each frame.
    fn add(&mut self, handle: Self::Handle);

    /// Detach the drawable.
    fn remove(&mut self, handle: Self::Handle);

    /// Set the drawable's rotation about the Y axis.
    fn set_rotation_y(&mut self, handle: Self::Handle, radians: f32);
}

/// Commands the scene reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// An edit finished; rebuild the galaxy from these parameters.
    ParameterChanged(ParameterSet),
}

/// The attached point cloud of one generation.
#[derive(Debug, Clone)]
pub struct GalaxyResource<H> {
    handle: H,
    point_count: u32,
    generation: u64,
    params: ParameterSet,
}

impl<H: Copy> GalaxyResource<H> {
    /// Backend handle of the drawable.
    pub fn handle(&self) -> H {
        self.handle
    }

    /// Number of points in the geometry.
    pub fn point_count(&self) -> u32 {
        self.point_count
    }

    /// 1 for the first galaxy, incremented on each regeneration.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Parameters the galaxy was built from.
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }
}

/// Owns the render graph and the single live galaxy.
pub struct SceneManager<G: RenderGraph> {
    graph: G,
    current: Option<GalaxyResource<G::Handle>>,
    rotation_y: f32,
    generations: u64,
}

impl<G: RenderGraph> SceneManager<G> {
    /// Create an empty scene drawing into `graph`.
    pub fn new(graph: G) -> Self {
        Self {
            graph,
            current: None,
            rotation_y: 0.0,
            generations: 0,
        }
    }

    /// Replace the current galaxy with a fresh sample of `params`.
    ///
    /// The previous galaxy is released before sampling starts. `count == 0`
    /// attaches an empty galaxy.
    pub fn regenerate(&mut self, params: &ParameterSet) {
        if let Some(old) = self.current.take() {
            self.graph.dispose(old.handle);
            self.graph.remove(old.handle);
            debug!(generation = old.generation, "released galaxy");
        }

        let start = Instant::now();
        let buffer = generator::sample(params);
        let sampled = start.elapsed();

        let material = PointsMaterial::galaxy(params.size);
        let handle = self.graph.create_points(&buffer, &material);
        self.graph.add(handle);
        self.graph.set_rotation_y(handle, self.rotation_y);

        self.generations += 1;
        self.current = Some(GalaxyResource {
            handle,
            point_count: params.count,
            generation: self.generations,
            params: params.clone(),
        });

        info!(
            count = params.count,
            generation = self.generations,
            sample_ms = sampled.as_secs_f64() * 1000.0,
            total_ms = start.elapsed().as_secs_f64() * 1000.0,
            "generated galaxy"
        );
    }

    /// Handle a scene command synchronously.
    pub fn handle(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::ParameterChanged(params) => self.regenerate(&params),
        }
    }

    /// Advance the animation to `elapsed_seconds`.
    pub fn tick(&mut self, elapsed_seconds: f32) {
        self.rotation_y = elapsed_seconds * ROTATION_SPEED;
        if let Some(current) = &self.current {
            self.graph.set_rotation_y(current.handle, self.rotation_y);
        }
    }

    /// The attached galaxy, if any.
    pub fn current(&self) -> Option<&GalaxyResource<G::Handle>> {
        self.current.as_ref()
    }

    /// Rotation set by the last [`tick`](Self::tick).
    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// The render graph.
    pub fn graph(&self) -> &G {
        &self.graph
    }
}
