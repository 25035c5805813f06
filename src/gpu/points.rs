//! GPU resources for one point cloud.
//!
//! Each cloud owns two instance-stepped vertex buffers (`position` and
//! `color`, 3 floats each) and a small uniform buffer holding its model
//! matrix and material values. Pipelines are shared and cached by the scene.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use super::DEPTH_FORMAT;
use crate::generator::ParticleBuffer;
use crate::material::{BlendMode, PointsMaterial};

pub const POINTS_SHADER: &str = include_str!("points.wgsl");

/// Per-frame camera values, bind group 0.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct GlobalUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// Surface size in physical pixels.
    pub viewport: [f32; 2],
    pub pixel_ratio: f32,
    /// Attenuated diameter = `size * attenuation / depth`.
    pub attenuation: f32,
}

impl GlobalUniforms {
    /// `width` and `height` are the surface size in physical pixels.
    pub fn new(view: Mat4, proj: Mat4, width: u32, height: u32, pixel_ratio: f32) -> Self {
        let pixel_ratio = pixel_ratio.max(f32::EPSILON);
        let height = height.max(1) as f32;
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            viewport: [width.max(1) as f32, height],
            pixel_ratio,
            attenuation: attenuation_scale(height, pixel_ratio),
        }
    }

    /// Placeholder until the first frame writes real camera values.
    pub fn identity() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, 1, 1, 1.0)
    }
}

/// `pixel_ratio * logical_height / 2`, where the logical height is the
/// physical height divided by the pixel ratio.
fn attenuation_scale(physical_height: f32, pixel_ratio: f32) -> f32 {
    let logical_height = physical_height / pixel_ratio;
    pixel_ratio * logical_height * 0.5
}

/// Per-cloud transform and material, bind group 1.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct CloudUniforms {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    size: f32,
    size_attenuation: u32,
    vertex_colors: u32,
    _pad: u32,
}

/// Pipeline state that differs between materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub blend_mode: BlendMode,
    pub depth_write: bool,
}

impl From<&PointsMaterial> for PipelineKey {
    fn from(material: &PointsMaterial) -> Self {
        Self {
            blend_mode: material.blend_mode,
            depth_write: material.depth_write,
        }
    }
}

/// Geometry, material buffers and transform of one drawable.
pub struct GpuPoints {
    position_buffer: wgpu::Buffer,
    color_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    material: PointsMaterial,
    pub pipeline_key: PipelineKey,
    pub count: u32,
    rotation_y: f32,
}

impl GpuPoints {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        geometry: &ParticleBuffer,
        material: &PointsMaterial,
    ) -> Self {
        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Galaxy Position Buffer"),
            contents: bytemuck::cast_slice(geometry.positions()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let color_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Galaxy Color Buffer"),
            contents: bytemuck::cast_slice(geometry.colors()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniforms = cloud_uniforms(material, 0.0);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Galaxy Material Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Galaxy Material Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            position_buffer,
            color_buffer,
            uniform_buffer,
            bind_group,
            material: *material,
            pipeline_key: PipelineKey::from(material),
            count: geometry.len() as u32,
            rotation_y: 0.0,
        }
    }

    pub fn set_rotation_y(&mut self, queue: &wgpu::Queue, radians: f32) {
        self.rotation_y = radians;
        let uniforms = cloud_uniforms(&self.material, self.rotation_y);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Record the draw for this cloud. Empty clouds draw nothing.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.count == 0 {
            return;
        }
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.position_buffer.slice(..));
        pass.set_vertex_buffer(1, self.color_buffer.slice(..));
        pass.draw(0..6, 0..self.count);
    }

    /// Free the GPU memory. wgpu keeps it alive until in-flight
    /// submissions that use it have completed.
    pub fn destroy(self) {
        self.position_buffer.destroy();
        self.color_buffer.destroy();
        self.uniform_buffer.destroy();
    }

    /// Bytes of vertex data held by this cloud.
    pub fn vertex_bytes(&self) -> u64 {
        self.position_buffer.size() + self.color_buffer.size()
    }
}

fn cloud_uniforms(material: &PointsMaterial, rotation_y: f32) -> CloudUniforms {
    let color: Vec3 = material.color;
    CloudUniforms {
        model: Mat4::from_rotation_y(rotation_y).to_cols_array_2d(),
        color: color.extend(material.opacity).to_array(),
        size: material.size,
        size_attenuation: material.size_attenuation as u32,
        vertex_colors: material.vertex_colors as u32,
        _pad: 0,
    }
}

pub fn cloud_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Galaxy Material Bind Group Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

pub fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    let vec3_attribute = |location| wgpu::VertexAttribute {
        offset: 0,
        shader_location: location,
        format: wgpu::VertexFormat::Float32x3,
    };
    let position_attributes = [vec3_attribute(0)];
    let color_attributes = [vec3_attribute(1)];
    let stride = std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress;

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Points Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: stride,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &position_attributes,
                },
                wgpu::VertexBufferLayout {
                    array_stride: stride,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &color_attributes,
                },
            ],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(key.blend_mode.to_blend_state()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: key.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
