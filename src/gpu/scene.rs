//! wgpu-backed render graph.

use std::collections::HashMap;

use tracing::{debug, trace};
use wgpu::util::DeviceExt;

use super::camera::Camera;
use super::points::{
    cloud_bind_group_layout, create_pipeline, GlobalUniforms, GpuPoints, PipelineKey, POINTS_SHADER,
};
use crate::generator::ParticleBuffer;
use crate::material::PointsMaterial;
use crate::scene::RenderGraph;

/// Handle to a point cloud owned by a [`GpuScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointsId(u64);

/// Point clouds living on the GPU, plus the draw list.
pub struct GpuScene {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    cloud_layout: wgpu::BindGroupLayout,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    clouds: HashMap<PointsId, GpuPoints>,
    attached: Vec<PointsId>,
    next_id: u64,
}

impl GpuScene {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Points Shader"),
            source: wgpu::ShaderSource::Wgsl(POINTS_SHADER.into()),
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::bytes_of(&GlobalUniforms::identity()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let cloud_layout = cloud_bind_group_layout(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Points Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &cloud_layout],
            push_constant_ranges: &[],
        });

        Self {
            device: device.clone(),
            queue: queue.clone(),
            surface_format,
            shader,
            pipeline_layout,
            cloud_layout,
            globals_buffer,
            globals_bind_group,
            pipelines: HashMap::new(),
            clouds: HashMap::new(),
            attached: Vec::new(),
            next_id: 0,
        }
    }

    /// Upload camera and viewport values for the next frame.
    pub fn update_globals(&self, camera: &Camera, width: u32, height: u32, pixel_ratio: f32) {
        let globals = GlobalUniforms::new(
            camera.view_matrix(),
            camera.projection_matrix(),
            width,
            height,
            pixel_ratio,
        );
        self.queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
    }

    /// Record draws for every attached cloud, in attach order.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.globals_bind_group, &[]);
        for id in &self.attached {
            let Some(cloud) = self.clouds.get(id) else {
                continue;
            };
            let Some(pipeline) = self.pipelines.get(&cloud.pipeline_key) else {
                continue;
            };
            pass.set_pipeline(pipeline);
            cloud.draw(pass);
        }
    }
}

impl RenderGraph for GpuScene {
    type Handle = PointsId;

    fn create_points(&mut self, geometry: &ParticleBuffer, material: &PointsMaterial) -> PointsId {
        let key = PipelineKey::from(material);
        if !self.pipelines.contains_key(&key) {
            debug!(?key, "creating points pipeline");
            let pipeline = create_pipeline(
                &self.device,
                &self.pipeline_layout,
                &self.shader,
                self.surface_format,
                key,
            );
            self.pipelines.insert(key, pipeline);
        }

        let cloud = GpuPoints::new(&self.device, &self.cloud_layout, geometry, material);
        self.next_id += 1;
        let id = PointsId(self.next_id);
        debug!(?id, points = cloud.count, bytes = cloud.vertex_bytes(), "uploaded galaxy geometry");
        self.clouds.insert(id, cloud);
        id
    }

    fn dispose(&mut self, handle: PointsId) {
        if let Some(cloud) = self.clouds.remove(&handle) {
            trace!(id = ?handle, bytes = cloud.vertex_bytes(), "destroying galaxy buffers");
            cloud.destroy();
        }
    }

    fn add(&mut self, handle: PointsId) {
        if !self.attached.contains(&handle) {
            self.attached.push(handle);
        }
    }

    fn remove(&mut self, handle: PointsId) {
        self.attached.retain(|id| *id != handle);
    }

    fn set_rotation_y(&mut self, handle: PointsId, radians: f32) {
        if let Some(cloud) = self.clouds.get_mut(&handle) {
            cloud.set_rotation_y(&self.queue, radians);
        }
    }
}
