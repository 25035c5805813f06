//! Integration tests for sampling and scene management.
//!
//! Everything here runs on the CPU. The scene tests use a render graph that
//! only counts allocations.

use std::collections::HashSet;

use galaxy::generator::{branch_angle, sample, sample_particle, sample_with};
use galaxy::{
    ParameterSet, ParticleBuffer, PointsMaterial, RenderGraph, SceneEvent, SceneManager, Vec3,
    ROTATION_SPEED,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ============================================================================
// Sampling
// ============================================================================

#[test]
fn test_lengths_match_count() {
    for count in [100u32, 1234, 50_000] {
        let params = ParameterSet {
            count,
            ..Default::default()
        };
        let buffer = sample(&params);
        assert_eq!(buffer.positions().len(), 3 * count as usize);
        assert_eq!(buffer.colors().len(), 3 * count as usize);
    }
}

#[test]
fn test_height_bounded_regardless_of_radius() {
    let mut rng = StdRng::seed_from_u64(11);
    for radius in [0.01f32, 8.0, 20.0] {
        let params = ParameterSet {
            count: 20_000,
            radius,
            rand_power: 1.0,
            ..Default::default()
        };
        let buffer = sample_with(&params, &mut rng);
        for i in 0..buffer.len() {
            let y = buffer.position(i).y;
            assert!(y.abs() <= 1.0, "y = {y} at radius {radius}");
        }
    }
}

#[test]
fn test_branches_cycle() {
    for branches in [1u32, 2, 3, 6, 20] {
        let params = ParameterSet {
            branches,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(branches as u64);
        for i in 0..100 {
            let a = sample_particle(&params, i, &mut rng).branch_angle;
            let b = sample_particle(&params, i + branches, &mut rng).branch_angle;
            assert_eq!(a, b);
            assert_eq!(a, branch_angle(i, branches));
        }

        let distinct: HashSet<u32> = (0..branches * 4)
            .map(|i| branch_angle(i, branches).to_bits())
            .collect();
        assert_eq!(distinct.len(), branches as usize);
    }
}

#[test]
fn test_radius_biased_toward_center() {
    let params = ParameterSet {
        count: 100_000,
        radius: 8.0,
        rand_power: 3.0,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(2024);
    let mut radii: Vec<f32> = (0..params.count)
        .map(|i| sample_particle(&params, i, &mut rng).radius)
        .collect();
    radii.sort_by(|a, b| a.total_cmp(b));

    let p50 = radii[radii.len() / 2];
    let p95 = radii[radii.len() * 95 / 100];

    // u^3 * 8: median ~1.0, p95 ~6.86
    assert!(p50 < 2.0, "median radius {p50}");
    assert!(p95 < 0.9 * params.radius, "p95 radius {p95}");
    assert!(radii.iter().all(|r| *r >= 0.0 && *r <= params.radius));
}

#[test]
fn test_stronger_power_pulls_inward() {
    let mean_radius = |rand_power: f32| {
        let params = ParameterSet {
            count: 20_000,
            rand_power,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let total: f32 = (0..params.count)
            .map(|i| sample_particle(&params, i, &mut rng).radius)
            .sum();
        total / params.count as f32
    };

    assert!(mean_radius(2.0) > mean_radius(5.0));
}

#[test]
fn test_color_interpolation() {
    let params = ParameterSet {
        count: 5_000,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(3);
    let mut samples: Vec<_> = (0..params.count)
        .map(|i| sample_particle(&params, i, &mut rng))
        .collect();
    samples.sort_by(|a, b| a.radius.total_cmp(&b.radius));

    let inside = params.inside_color;
    let outside = params.outside_color;
    let direction = (outside - inside).signum();

    for pair in samples.windows(2) {
        let step = (pair[1].color - pair[0].color) * direction;
        assert!(step.min_element() >= -1e-6, "color not monotonic in radius");
    }

    let lo = Vec3::min(inside, outside) - Vec3::splat(1e-6);
    let hi = Vec3::max(inside, outside) + Vec3::splat(1e-6);
    for s in &samples {
        assert!(s.color.cmpge(lo).all() && s.color.cmple(hi).all());
    }
}

#[test]
fn test_zero_count() {
    let params = ParameterSet {
        count: 0,
        ..Default::default()
    };
    let buffer = sample(&params);
    assert!(buffer.is_empty());
    assert!(buffer.positions().is_empty());
    assert!(buffer.colors().is_empty());
}

#[test]
fn test_randomness_does_not_change_shape() {
    let base = ParameterSet {
        count: 1_000,
        ..Default::default()
    };
    let scattered = ParameterSet {
        randomness: 2.0,
        ..base.clone()
    };

    let a = sample_with(&base, &mut StdRng::seed_from_u64(9));
    let b = sample_with(&scattered, &mut StdRng::seed_from_u64(9));
    assert_eq!(a, b);
}

// ============================================================================
// Parameter files
// ============================================================================

#[test]
fn test_params_file_round_trip() {
    let path = std::env::temp_dir().join(format!("galaxy-params-{}.json", std::process::id()));
    let params = ParameterSet {
        count: 4_200,
        branches: 3,
        spin: -1.25,
        ..Default::default()
    };

    params.save(&path).unwrap();
    let loaded = ParameterSet::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, params);
}

#[test]
fn test_missing_params_file_is_error() {
    let path = std::env::temp_dir().join("galaxy-params-does-not-exist.json");
    assert!(ParameterSet::load(path).is_err());
}

// ============================================================================
// Scene management
// ============================================================================

/// Tracks live allocations the way a GPU backend would hold them.
#[derive(Default)]
struct MemoryGraph {
    next: u64,
    live: Vec<(u64, usize)>,
    attached: Vec<u64>,
    peak_points: usize,
    peak_live: usize,
    rotation: f32,
}

impl RenderGraph for MemoryGraph {
    type Handle = u64;

    fn create_points(&mut self, geometry: &ParticleBuffer, _material: &PointsMaterial) -> u64 {
        self.next += 1;
        self.live.push((self.next, geometry.len()));
        self.peak_live = self.peak_live.max(self.live.len());
        let points: usize = self.live.iter().map(|(_, n)| n).sum();
        self.peak_points = self.peak_points.max(points);
        self.next
    }

    fn dispose(&mut self, handle: u64) {
        self.live.retain(|(h, _)| *h != handle);
    }

    fn add(&mut self, handle: u64) {
        self.attached.push(handle);
    }

    fn remove(&mut self, handle: u64) {
        self.attached.retain(|h| *h != handle);
    }

    fn set_rotation_y(&mut self, _handle: u64, radians: f32) {
        self.rotation = radians;
    }
}

#[test]
fn test_one_galaxy_at_a_time() {
    let mut scene = SceneManager::new(MemoryGraph::default());
    let counts = [1_000u32, 50_000, 200, 0, 10_000];

    for count in counts {
        scene.handle(SceneEvent::ParameterChanged(ParameterSet {
            count,
            ..Default::default()
        }));
        assert_eq!(scene.graph().attached.len(), 1);
        assert_eq!(scene.graph().live.len(), 1);
    }

    assert_eq!(scene.graph().peak_live, 1);
    // Never more points resident than the largest single galaxy.
    assert_eq!(scene.graph().peak_points, 50_000);
}

#[test]
fn test_zero_count_regenerate() {
    let mut scene = SceneManager::new(MemoryGraph::default());
    scene.regenerate(&ParameterSet {
        count: 0,
        ..Default::default()
    });

    let current = scene.current().unwrap();
    assert_eq!(current.point_count(), 0);
    assert_eq!(scene.graph().live, vec![(current.handle(), 0)]);
}

#[test]
fn test_rotation_linear_in_time() {
    let mut scene = SceneManager::new(MemoryGraph::default());
    scene.regenerate(&ParameterSet {
        count: 500,
        ..Default::default()
    });

    scene.tick(1.0);
    let r1 = scene.graph().rotation;
    scene.tick(3.0);
    let r3 = scene.graph().rotation;

    assert_eq!(r1, ROTATION_SPEED);
    assert_eq!(r3, 3.0 * ROTATION_SPEED);
    assert!((r3 - r1 - 2.0 * 0.3).abs() < 1e-6);
}
