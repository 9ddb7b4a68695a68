//! Integration tests for loom-solver.

use glam::Vec3;
use loom_mesh::generators::rectangular;
use loom_mesh::FabricMesh;
use loom_solver::config::ClothParams;
use loom_solver::state::ParticleState;
use loom_solver::strategy::{PbdSolver, SolverFactory};
use loom_solver::xpbd::{XpbdCloth, XpbdClothFactory};
use loom_types::{FabricError, ParticleId};

const GRAVITY: Vec3 = Vec3::new(0.0, 0.0, -9.81);

fn small_cloth() -> FabricMesh {
    rectangular("cloth", 1.0, 1.0, 1.0, 4.0).unwrap()
}

fn substep(cloth: &mut dyn PbdSolver, dt: f32) {
    cloth.pre_solve(dt, GRAVITY).unwrap();
    cloth.solve(dt).unwrap();
    cloth.post_solve(dt).unwrap();
}

// ─── ParticleState Tests ──────────────────────────────────────

#[test]
fn state_from_mesh() {
    let mesh = small_cloth();
    let state = ParticleState::from_mesh(&mesh, 5.0).unwrap();

    assert_eq!(state.particle_count(), mesh.vertex_count());
    assert!(state.vel.iter().all(|v| *v == Vec3::ZERO)); // Starts at rest
    assert!(state.inv_mass.iter().all(|&w| w > 0.0));
}

#[test]
fn state_total_mass_matches_density() {
    let mesh = rectangular("cloth", 2.0, 1.0, 0.0, 5.0).unwrap();
    let density = 5.0;
    let state = ParticleState::from_mesh(&mesh, density).unwrap();

    // Sum of per-triangle contributions: each triangle gives 3 × (1/(3m)).
    // For a uniform grid every triangle has the same mass m = A·ρ / (2·nx·ny).
    let tri_mass = mesh.triangle_area(0) * density;
    let expected_inv_sum = mesh.triangle_count() as f32 / tri_mass;
    let inv_sum: f32 = state.inv_mass.iter().sum();
    assert!((inv_sum - expected_inv_sum).abs() / expected_inv_sum < 1e-4);
}

#[test]
fn state_integrate_applies_gravity() {
    let mesh = small_cloth();
    let mut state = ParticleState::from_mesh(&mesh, 5.0).unwrap();
    let dt = 0.01;
    state.integrate(dt, GRAVITY);
    // z = 1 + dt * (g * dt)
    let expected = 1.0 - 9.81 * dt * dt;
    assert!(state.pos.iter().all(|p| (p.z - expected).abs() < 1e-6));
}

#[test]
fn state_ground_clamps() {
    let mesh = rectangular("cloth", 1.0, 1.0, 0.0, 2.0).unwrap();
    let mut state = ParticleState::from_mesh(&mesh, 5.0).unwrap();
    state.ground_height = Some(0.0);
    state.integrate(0.1, GRAVITY);
    assert!(state.pos.iter().all(|p| p.z >= 0.0));
}

#[test]
fn state_nearest_free_respects_radius_and_pins() {
    let mesh = small_cloth();
    let mut state = ParticleState::from_mesh(&mesh, 5.0).unwrap();

    let corner = mesh.vertices[0];
    assert_eq!(state.nearest_free(corner, 0.01), Some(ParticleId(0)));
    assert_eq!(state.nearest_free(corner + Vec3::Z * 5.0, 0.1), None);

    state.inv_mass[0] = 0.0;
    let next = state.nearest_free(corner, 1.0).unwrap();
    assert_ne!(next, ParticleId(0));
}

#[test]
fn state_check_rejects_out_of_range() {
    let state = ParticleState::from_mesh(&small_cloth(), 5.0).unwrap();
    assert!(matches!(
        state.check(ParticleId(10_000)),
        Err(FabricError::UnknownParticle { id: 10_000, .. })
    ));
}

// ─── ClothParams Tests ────────────────────────────────────────

#[test]
fn params_default() {
    let params = ClothParams::default();
    assert_eq!(params.density, 5.0);
    assert_eq!(params.bending_compliance, 1.0);
    assert!(params.validate().is_ok());
}

#[test]
fn params_reject_bad_values() {
    let bad = [
        ClothParams { density: 0.0, ..Default::default() },
        ClothParams { bending_compliance: -1.0, ..Default::default() },
        ClothParams { attach_radius: 0.0, ..Default::default() },
        ClothParams { ground_height: Some(f64::NAN), ..Default::default() },
    ];
    for params in bad {
        assert!(matches!(params.validate(), Err(FabricError::InvalidConfiguration(_))));
    }
}

#[test]
fn params_serialization() {
    let params = ClothParams::default();
    let text = toml::to_string(&params).unwrap();
    let recovered: ClothParams = toml::from_str(&text).unwrap();
    assert_eq!(recovered, params);
}

// ─── XpbdCloth Tests ──────────────────────────────────────────

#[test]
fn cloth_edges_match_topology() {
    let mesh = small_cloth();
    let cloth = XpbdCloth::new(&mesh, &ClothParams::default()).unwrap();
    let (nx, ny) = (4, 4);
    assert_eq!(cloth.edges().len(), nx * (ny + 1) + (nx + 1) * ny + nx * ny);
    assert_eq!(cloth.positions().len(), mesh.vertex_count());
    assert!(cloth.bending_count() > 0);
    assert_eq!(cloth.name(), "xpbd_cloth");
}

#[test]
fn free_cloth_falls() {
    let mesh = small_cloth();
    let mut cloth = XpbdCloth::new(&mesh, &ClothParams::default()).unwrap();
    for _ in 0..10 {
        substep(&mut cloth, 1.0 / 375.0);
    }
    assert!(cloth.positions().iter().all(|p| p.z < 1.0));
}

#[test]
fn attach_pins_particle() {
    let mesh = small_cloth();
    let mut cloth = XpbdCloth::new(&mesh, &ClothParams::default()).unwrap();

    let grab = mesh.vertices[0] + Vec3::new(0.0, 0.0, 0.05);
    let id = cloth.attach_nearest(grab).unwrap();
    assert_eq!(id, ParticleId(0));
    assert!(cloth.state().is_pinned(id));

    for _ in 0..20 {
        substep(&mut cloth, 1.0 / 375.0);
    }
    assert_eq!(cloth.positions()[0], grab);

    let moved = grab + Vec3::new(0.1, 0.0, 0.0);
    cloth.update_attached_pose(id, moved).unwrap();
    substep(&mut cloth, 1.0 / 375.0);
    assert_eq!(cloth.positions()[0], moved);
}

#[test]
fn attach_never_returns_pinned_particle() {
    let mesh = small_cloth();
    let mut cloth = XpbdCloth::new(&mesh, &ClothParams::default()).unwrap();
    let point = mesh.vertices[5];
    let first = cloth.attach_nearest(point).unwrap();
    let second = cloth.attach_nearest(point);
    // The only particle within the default radius is already pinned.
    assert_ne!(second, Some(first));
}

#[test]
fn attach_misses_far_point() {
    let mut cloth = XpbdCloth::new(&small_cloth(), &ClothParams::default()).unwrap();
    assert_eq!(cloth.attach_nearest(Vec3::new(10.0, 10.0, 10.0)), None);
}

#[test]
fn update_unknown_particle_fails() {
    let mut cloth = XpbdCloth::new(&small_cloth(), &ClothParams::default()).unwrap();
    let result = cloth.update_attached_pose(ParticleId(9999), Vec3::ZERO);
    assert!(matches!(result, Err(FabricError::UnknownParticle { .. })));
}

#[test]
fn non_finite_state_is_a_solver_fault() {
    let mut cloth = XpbdCloth::new(&small_cloth(), &ClothParams::default()).unwrap();
    let id = cloth.attach_nearest(Vec3::new(0.5, 0.5, 1.0)).unwrap();
    cloth.update_attached_pose(id, Vec3::new(f32::NAN, 0.0, 0.0)).unwrap();
    cloth.pre_solve(0.001, GRAVITY).unwrap();
    cloth.solve(0.001).unwrap();
    assert!(matches!(cloth.post_solve(0.001), Err(FabricError::SolverFault(_))));
}

#[test]
fn stretching_keeps_pinned_sheet_together() {
    let mesh = small_cloth();
    let params = ClothParams { ground_height: None, ..Default::default() };
    let mut cloth = XpbdCloth::new(&mesh, &params).unwrap();
    cloth.attach_nearest(mesh.vertices[0]).unwrap();
    cloth.attach_nearest(mesh.vertices[4]).unwrap();

    for _ in 0..300 {
        substep(&mut cloth, 1.0 / 375.0);
    }

    // Neighbouring particles stay close to their 0.25 m rest spacing.
    for &[a, b] in cloth.edges() {
        let d = cloth.positions()[a as usize].distance(cloth.positions()[b as usize]);
        assert!(d < 0.6, "edge {a}-{b} stretched to {d}");
    }
}

#[test]
fn factory_builds_boxed_solver() {
    let mesh = small_cloth();
    let solver = XpbdClothFactory.build(&mesh, &ClothParams::default()).unwrap();
    assert_eq!(solver.positions().len(), mesh.vertex_count());
}

#[test]
fn factory_rejects_invalid_params() {
    let params = ClothParams { density: -1.0, ..Default::default() };
    assert!(XpbdClothFactory.build(&small_cloth(), &params).is_err());
}
