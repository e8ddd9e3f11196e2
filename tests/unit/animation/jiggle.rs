use super::*;

fn stroke(phase: f64) -> VectorStroke {
    let pts = (0..40).map(|i| Point::new(i as f64 * 5.0, 100.0)).collect();
    VectorStroke::new(pts, phase, Rgba8::rgb(200, 10, 10), 4.0).unwrap()
}

#[test]
fn effective_time_scales_and_offsets() {
    assert_eq!(effective_time(2.0, 3.0, 10.0), 16.0);
    assert_eq!(effective_time(0.0, 3.0, 10.0), 10.0);
}

#[test]
fn rotation_radius_is_bounded_by_intensity() {
    for i in 0..50 {
        for k in 0..20 {
            let off = rotation_offset(i, k as f64 * 0.37, 4.0);
            assert!(off.hypot() <= 4.0 + 1e-9);
        }
    }
}

#[test]
fn rotation_matches_formula() {
    let (i, tau, intensity) = (3usize, 1.25f64, 2.0f64);
    let theta = tau + 3.0 * 0.6;
    let r = intensity * (0.5 + 0.5 * (theta * 1.3 + 3.0).sin());
    let off = rotation_offset(i, tau, intensity);
    assert!((off.x - r * theta.cos()).abs() < 1e-12);
    assert!((off.y - r * theta.sin()).abs() < 1e-12);
}

#[test]
fn zero_intensities_leave_points_in_place() {
    let params = GlobalParameters {
        jiggle_intensity: 0.0,
        float_intensity: 0.0,
        ..Default::default()
    };
    let s = stroke(5.0);
    assert_eq!(jiggle_points(&s, 123.0, &params), s.points());
}

#[test]
fn float_offset_matches_formula() {
    let off = float_offset(2, 10.0, 3.0);
    assert!((off.x - (10.0f64 * 0.2 + 0.2).sin() * 3.0).abs() < 1e-12);
    assert!((off.y - (10.0f64 * 0.15 + 0.16).cos() * 3.0).abs() < 1e-12);
}

#[test]
fn geometry_is_deterministic() {
    let params = GlobalParameters {
        float_intensity: 2.0,
        thickness_intensity: 1.5,
        ..Default::default()
    };
    let s = stroke(17.0);
    let a = stroke_geometry(&s, 0.8, &params);
    let b = stroke_geometry(&s, 0.8, &params);
    assert_eq!(a, b);
}

#[test]
fn thickness_pass_uses_undisplaced_points() {
    let params = GlobalParameters {
        thickness_intensity: 1.0,
        ..Default::default()
    };
    let s = stroke(1.0);
    let g = stroke_geometry(&s, 0.25, &params);
    assert_eq!(g.passes.len(), 2);
    assert_eq!(g.passes[0].width, 4.0);
    assert_eq!(g.passes[1].points, s.points());
    let tau = effective_time(0.25, params.jiggle_speed, 1.0);
    assert!((g.passes[1].width - (4.0 + tau.sin())).abs() < 1e-12);
    assert!(g.passes.iter().all(|p| p.color == s.color()));
}

#[test]
fn thickness_disabled_draws_single_pass() {
    let g = stroke_geometry(&stroke(0.0), 1.0, &GlobalParameters::default());
    assert_eq!(g.passes.len(), 1);
}

#[test]
fn non_positive_breathing_width_is_skipped() {
    let params = GlobalParameters {
        thickness_intensity: 10.0,
        jiggle_speed: 1.0,
        ..Default::default()
    };
    // tau = 3pi/2 -> sin = -1 -> width 4 - 10 < 0
    let phase = 3.0 * std::f64::consts::FRAC_PI_2;
    let g = stroke_geometry(&stroke(phase), 0.0, &params);
    assert_eq!(g.passes.len(), 1);
}
