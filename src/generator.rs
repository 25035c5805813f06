//! Galaxy particle sampling.
//!
//! The shape is fixed by the parameters; the detail is random. Each particle
//! is assigned to a branch by index, pushed out to a power-biased radius,
//! twisted by `spin` in proportion to that radius, and jittered on every
//! axis. Its color is the inside/outside gradient evaluated at the radius.
//!
//! There is no seed parameter: [`sample`] draws from the thread-local RNG
//! and two calls never agree. Use [`sample_with`] to supply your own RNG.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::params::ParameterSet;

/// Flat position and color arrays for one generation.
///
/// Both vectors hold 3 floats per particle and always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleBuffer {
    positions: Vec<f32>,
    colors: Vec<f32>,
}

impl ParticleBuffer {
    /// Number of particles.
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    /// Whether the buffer holds no particles.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Packed `x, y, z` positions.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Packed `r, g, b` colors.
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Position of particle `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[i * 3..i * 3 + 3])
    }

    /// Color of particle `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    pub fn color(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.colors[i * 3..i * 3 + 3])
    }
}

/// One sampled particle along with the quantities it was built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSample {
    /// Distance from the center before jitter.
    pub radius: f32,
    /// Angle of the particle's branch.
    pub branch_angle: f32,
    /// Extra twist from spin.
    pub spin_angle: f32,
    /// Signed per-axis jitter.
    pub offset: Vec3,
    /// Final position.
    pub position: Vec3,
    /// Final color.
    pub color: Vec3,
}

/// Sample a full galaxy using the thread-local RNG.
pub fn sample(params: &ParameterSet) -> ParticleBuffer {
    sample_with(params, &mut rand::thread_rng())
}

/// Sample a full galaxy from the given RNG.
pub fn sample_with<R: Rng + ?Sized>(params: &ParameterSet, rng: &mut R) -> ParticleBuffer {
    let count = params.count as usize;
    let mut positions = Vec::with_capacity(count * 3);
    let mut colors = Vec::with_capacity(count * 3);

    for i in 0..params.count {
        let p = sample_particle(params, i, rng);
        positions.extend_from_slice(&p.position.to_array());
        colors.extend_from_slice(&p.color.to_array());
    }

    ParticleBuffer { positions, colors }
}

/// Sample particle `index`.
///
/// The branch depends only on `index`; everything else consumes the RNG.
pub fn sample_particle<R: Rng + ?Sized>(
    params: &ParameterSet,
    index: u32,
    rng: &mut R,
) -> ParticleSample {
    let radius = rng.gen::<f32>().powf(params.rand_power) * params.radius;
    let spin_angle = radius * params.spin * 0.5;
    let branch_angle = branch_angle(index, params.branches);

    // randomness is intentionally not applied here
    let offset = Vec3::new(
        jitter(rng, params.rand_power),
        jitter(rng, params.rand_power),
        jitter(rng, params.rand_power),
    );

    let angle = branch_angle + spin_angle;
    let position = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius) + offset;

    let t = if params.radius > 0.0 {
        (radius / params.radius).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let color = gradient(params.inside_color, params.outside_color, t);

    ParticleSample {
        radius,
        branch_angle,
        spin_angle,
        offset,
        position,
        color,
    }
}

/// Angle of the branch particle `index` belongs to.
///
/// Branches are assigned cyclically in index order. Zero branches is
/// treated as one.
pub fn branch_angle(index: u32, branches: u32) -> f32 {
    let branches = branches.max(1);
    (index % branches) as f32 / branches as f32 * TAU
}

/// Component-wise lerp from `inside` toward `outside`.
pub fn gradient(inside: Vec3, outside: Vec3, t: f32) -> Vec3 {
    inside + (outside - inside) * t
}

/// Power-biased magnitude in `[0, 1)` with a random sign.
fn jitter<R: Rng + ?Sized>(rng: &mut R, power: f32) -> f32 {
    let magnitude = rng.gen::<f32>().powf(power);
    if rng.gen_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(count: u32) -> ParameterSet {
        ParameterSet {
            count,
            ..Default::default()
        }
    }

    #[test]
    fn test_buffer_lengths() {
        let mut rng = StdRng::seed_from_u64(1);
        for count in [1, 100, 1234] {
            let buffer = sample_with(&params(count), &mut rng);
            assert_eq!(buffer.len(), count as usize);
            assert_eq!(buffer.positions().len(), 3 * count as usize);
            assert_eq!(buffer.colors().len(), 3 * count as usize);
        }
    }

    #[test]
    fn test_empty_count() {
        let buffer = sample(&params(0));
        assert!(buffer.is_empty());
        assert!(buffer.positions().is_empty());
        assert!(buffer.colors().is_empty());
    }

    #[test]
    fn test_y_bounded_by_jitter() {
        let mut rng = StdRng::seed_from_u64(2);
        for radius in [0.01, 8.0, 20.0] {
            let p = ParameterSet {
                count: 5000,
                radius,
                rand_power: 1.0,
                ..Default::default()
            };
            let buffer = sample_with(&p, &mut rng);
            for i in 0..buffer.len() {
                let y = buffer.position(i).y;
                assert!(y.abs() <= 1.0, "y = {y} at radius {radius}");
            }
        }
    }

    #[test]
    fn test_position_matches_formula() {
        let mut rng = StdRng::seed_from_u64(3);
        let p = params(50);
        for i in 0..p.count {
            let s = sample_particle(&p, i, &mut rng);
            let angle = s.branch_angle + s.spin_angle;
            assert!((s.spin_angle - s.radius * p.spin * 0.5).abs() < 1e-6);
            assert!((s.position.x - (angle.cos() * s.radius + s.offset.x)).abs() < 1e-5);
            assert_eq!(s.position.y, s.offset.y);
            assert!((s.position.z - (angle.sin() * s.radius + s.offset.z)).abs() < 1e-5);
            assert!(s.radius >= 0.0 && s.radius <= p.radius);
        }
    }

    #[test]
    fn test_branch_assignment_is_cyclic() {
        for branches in 1..=20 {
            for i in 0..100 {
                assert_eq!(
                    branch_angle(i, branches),
                    branch_angle(i + branches, branches)
                );
            }
        }
        assert_eq!(branch_angle(0, 6), 0.0);
        assert!((branch_angle(3, 6) - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(branch_angle(7, 0), 0.0);
    }

    #[test]
    fn test_gradient_endpoints_and_monotonic() {
        let inside = Vec3::new(1.0, 0.2, 0.5);
        let outside = Vec3::new(0.1, 0.8, 0.5);
        assert_eq!(gradient(inside, outside, 0.0), inside);
        let end = gradient(inside, outside, 1.0);
        assert!((end - outside).abs().max_element() < 1e-6);

        let mut prev = gradient(inside, outside, 0.0);
        for step in 1..=10 {
            let c = gradient(inside, outside, step as f32 / 10.0);
            assert!(c.x <= prev.x);
            assert!(c.y >= prev.y);
            assert_eq!(c.z, prev.z);
            prev = c;
        }
    }

    #[test]
    fn test_color_follows_radius() {
        let mut rng = StdRng::seed_from_u64(4);
        let p = params(200);
        for i in 0..p.count {
            let s = sample_particle(&p, i, &mut rng);
            let expected = gradient(p.inside_color, p.outside_color, s.radius / p.radius);
            assert!((s.color - expected).abs().max_element() < 1e-6);
        }
    }

    #[test]
    fn test_zero_radius_does_not_produce_nan() {
        let p = ParameterSet {
            count: 10,
            radius: 0.0,
            ..Default::default()
        };
        let buffer = sample(&p);
        assert!(buffer.colors().iter().all(|c| c.is_finite()));
        assert_eq!(buffer.color(0), p.inside_color);
    }

    #[test]
    fn test_two_calls_differ() {
        let a = sample(&params(100));
        let b = sample(&params(100));
        assert_ne!(a, b);
    }
}
