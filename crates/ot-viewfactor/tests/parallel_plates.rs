use ot_viewfactor::analytic::parallel_rectangles;
use ot_viewfactor::{Geometry, RayPreset, Surface, Vec3, ViewFactorRequest, estimate};

fn plates(gap: f64) -> Geometry {
    Geometry::new(vec![
        Surface::rectangle("lower", "n_lower", Vec3::zeros(), Vec3::x(), Vec3::y()),
        Surface::rectangle("upper", "n_upper", Vec3::new(0.0, 0.0, gap), Vec3::y(), Vec3::x()),
    ])
    .unwrap()
}

#[test]
fn converges_to_analytic_value() {
    let exact = parallel_rectangles(1.0, 1.0, 1.0);
    let est = estimate(
        &plates(1.0),
        &ViewFactorRequest::new("lower", "upper")
            .with_preset(RayPreset::Default)
            .with_seed(42),
    )
    .unwrap();
    assert_eq!(est.n_rays, 100_000);
    assert!(
        (est.view_factor - exact).abs() < 5.0 * est.standard_error,
        "F = {} ± {}, exact {exact}",
        est.view_factor,
        est.standard_error
    );
    assert!((est.reciprocal() - est.view_factor).abs() < 1e-12);
}

#[test]
fn standard_error_scales_with_inverse_root_n() {
    let g = plates(0.5);
    let coarse = estimate(&g, &ViewFactorRequest::new("lower", "upper").with_rays(10_000).with_seed(1)).unwrap();
    let fine = estimate(&g, &ViewFactorRequest::new("lower", "upper").with_rays(160_000).with_seed(1)).unwrap();
    let ratio = coarse.standard_error / fine.standard_error;
    assert!((ratio - 4.0).abs() < 0.4, "ratio {ratio}");

    let exact = parallel_rectangles(1.0, 1.0, 0.5);
    assert!((fine.view_factor - exact).abs() < 5.0 * fine.standard_error);
}

#[test]
fn occluder_blocks_rays() {
    let mut surfaces = plates(1.0).surfaces;
    // Full shield halfway between the plates.
    surfaces.push(Surface::rectangle(
        "shield",
        "n_shield",
        Vec3::new(-1.0, -1.0, 0.5),
        Vec3::new(3.0, 0.0, 0.0),
        Vec3::new(0.0, 3.0, 0.0),
    ));
    let g = Geometry::new(surfaces).unwrap();
    let est = estimate(&g, &ViewFactorRequest::new("lower", "upper").with_rays(10_000)).unwrap();
    assert_eq!(est.hits, 0);
    assert_eq!(est.standard_error, 0.0);
}
