//! Point-sprite material settings.
//!
//! A [`PointsMaterial`] describes how a point cloud is drawn, independent of
//! the backend that draws it.

use glam::Vec3;

/// Blend mode for point rendering.
///
/// Controls how point colors combine with the background and each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Standard alpha blending (default).
    #[default]
    Alpha,

    /// Additive blending.
    ///
    /// Overlapping points add up and get brighter. With depth writes off this
    /// is what makes a dense core glow.
    Additive,
}

impl BlendMode {
    /// The wgpu blend state for this mode.
    pub fn to_blend_state(self) -> wgpu::BlendState {
        match self {
            BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
            BlendMode::Additive => wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            },
        }
    }
}

/// Material for a point cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointsMaterial {
    /// Point diameter. Logical pixels without attenuation, scaled by
    /// `logical_height / 2 / depth` with it.
    pub size: f32,
    /// Shrink points with distance from the camera.
    pub size_attenuation: bool,
    /// Write to the depth buffer.
    pub depth_write: bool,
    /// How points blend with what is already drawn.
    pub blend_mode: BlendMode,
    /// Multiply by the per-vertex `color` attribute.
    pub vertex_colors: bool,
    /// Base color, multiplied with the vertex color when enabled.
    pub color: Vec3,
    /// Alpha written by the fragment shader.
    pub opacity: f32,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            size: 1.0,
            size_attenuation: true,
            depth_write: true,
            blend_mode: BlendMode::Alpha,
            vertex_colors: false,
            color: Vec3::ONE,
            opacity: 1.0,
        }
    }
}

impl PointsMaterial {
    /// The galaxy look: attenuated, additive, vertex-colored, no depth writes
    /// so overlapping points blend instead of occluding each other.
    pub fn galaxy(size: f32) -> Self {
        Self {
            size,
            size_attenuation: true,
            depth_write: false,
            blend_mode: BlendMode::Additive,
            vertex_colors: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_galaxy_material() {
        let m = PointsMaterial::galaxy(0.02);
        assert_eq!(m.size, 0.02);
        assert!(m.size_attenuation);
        assert!(!m.depth_write);
        assert!(m.vertex_colors);
        assert_eq!(m.blend_mode, BlendMode::Additive);
    }

    #[test]
    fn test_alpha_is_default() {
        assert_eq!(BlendMode::default(), BlendMode::Alpha);
        assert_eq!(PointsMaterial::default().blend_mode, BlendMode::Alpha);
        assert_eq!(BlendMode::Alpha.to_blend_state(), wgpu::BlendState::ALPHA_BLENDING);
    }

    #[test]
    fn test_additive_blend_adds_destination() {
        let state = BlendMode::Additive.to_blend_state();
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(state.color.operation, wgpu::BlendOperation::Add);
    }
}
