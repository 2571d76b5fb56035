use approx::assert_relative_eq;
use earth_moon_fields::fields::{
    GridSpec, PointMass, SampleGrid, force_at, force_field, total_force,
};
use earth_moon_fields::numerics::constants::G;
use earth_moon_fields::numerics::vector;

const PROBE_KG: f64 = 5_500.0;

fn earth() -> PointMass {
    PointMass::new("Earth", 5.972e24, [0.0, 0.0], 6.371e6)
}

fn moon() -> PointMass {
    PointMass::new("Moon", 7.348e22, [3.844e8, 0.0], 1.737e6)
}

#[test]
fn force_follows_inverse_square_law() {
    let f = force_at(G, &earth(), PROBE_KG, &[1.0e7, 0.0]);
    assert_relative_eq!(vector::norm(&f), G * 5.972e24 * PROBE_KG / 1.0e14, max_relative = 1e-14);
    let f2 = force_at(G, &earth(), PROBE_KG, &[2.0e7, 0.0]);
    assert_relative_eq!(vector::norm(&f) / vector::norm(&f2), 4.0, max_relative = 1e-12);
}

#[test]
fn force_points_toward_the_attracting_mass() {
    let body = moon();
    for query in [[4.0e8, 0.0], [3.0e8, 5.0e7], [3.844e8, -1.0e8], [0.0, 0.0]] {
        let f = force_at(G, &body, PROBE_KG, &query);
        let toward = vector::sub(&body.position_m, &query);
        assert!(vector::norm(&f) >= 0.0);
        assert!(vector::dot(&f, &toward) > 0.0, "force at {query:?} points away");
        let cross = f[0] * toward[1] - f[1] * toward[0];
        assert!(cross.abs() <= 1e-9 * vector::norm(&f) * vector::norm(&toward));
    }
}

#[test]
fn magnitude_holds_at_the_floor_inside_one_kilometre() {
    let body = earth();
    let floor = G * body.mass_kg * PROBE_KG / 1.0e6;
    for r in [1.0e-6, 1.0, 10.0, 999.0, 1_000.0] {
        let f = force_at(G, &body, PROBE_KG, &[r, 0.0]);
        assert!(f[0].is_finite() && f[1].is_finite());
        assert_relative_eq!(vector::norm(&f), floor, max_relative = 1e-14);
    }
}

#[test]
fn force_on_the_source_itself_is_zero() {
    let f = force_at(G, &earth(), PROBE_KG, &[0.0, 0.0]);
    assert_eq!(vector::norm(&f), 0.0);
}

#[test]
fn forces_cancel_at_the_neutral_point() {
    // ratio of distances from Earth and Moon at the balance point is sqrt(M_e/M_m)
    let k = (5.972e24f64 / 7.348e22).sqrt();
    let x = 3.844e8 * k / (1.0 + k);
    let f = total_force(G, &[earth(), moon()], PROBE_KG, &[x, 0.0]);
    let pull = vector::norm(&force_at(G, &earth(), PROBE_KG, &[x, 0.0]));
    assert!(vector::norm(&f) < 1e-9 * pull, "residual {f:?}");
}

#[test]
fn parallel_field_matches_sequential_evaluation() {
    let grid = SampleGrid::new(GridSpec::square((-1.0e8, 4.8e8), (-2.9e8, 2.9e8), 25)).unwrap();
    let sources = [earth(), moon()];
    let field = force_field(G, &sources, PROBE_KG, &grid);
    assert_eq!(field.len(), grid.len());

    for idx in 0..grid.len() {
        let expected = total_force(G, &sources, PROBE_KG, &grid.point(idx));
        assert_eq!([field.fx()[idx], field.fy()[idx]], expected);
    }
    assert_eq!(force_field(G, &sources, PROBE_KG, &grid), field);

    let magnitude = field.magnitude();
    assert!(magnitude.values().iter().all(|m| *m >= 0.0 && m.is_finite()));
}
