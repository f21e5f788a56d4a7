//! Integration tests driving complete galaxy models the way a sampler does

use crate::test_helpers::{jittered_theta, log_radii, REFERENCE_Z};
use approx::assert_relative_eq;
use galkin::kinematics::{KinematicOptions, PressureSupportType};
use galkin::model_set::{ties, Component, ModelSet};
use galkin::models::{DiskBulge, DispersionConst, Geometry, Nfw, UniformRadialFlow, ZHeightGauss};
use galkin::utils::{evaluate_batch, velocity_profiles};
use galkin::{GalkinError, Model};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const R_FDM: f64 = 5.0;

/// Disk+bulge galaxy whose halo mass follows a free dark matter fraction
fn fdm_parameterized_model() -> ModelSet {
    let options = KinematicOptions::default().with_pressure_support(PressureSupportType::ExponentialSelfGravity);
    let mut ms = ModelSet::new().with_kinematic_options(options);
    ms.add_component(DiskBulge::new(10.8, 4.0, 1.0, 1.0, 4.0, 0.2), Some("galaxy"))
        .unwrap();
    ms.add_component(Nfw::new(11.5, 6.0).with_redshift(REFERENCE_Z), Some("halo"))
        .unwrap();
    ms.add_component(DispersionConst::new(35.0), None).unwrap();
    ms.add_component(Geometry::new(60.0, 30.0), None).unwrap();
    ms.add_component(ZHeightGauss::new(0.5), None).unwrap();

    ms.set_parameter_value("halo", "fdm", 0.5).unwrap();
    ms.set_parameter_fixed("halo", "fdm", false).unwrap();
    ms.set_parameter_tied("halo", "mvirial", Some(ties::mvirial_from_fdm("halo", "galaxy", R_FDM)))
        .unwrap();
    ms
}

#[test]
fn test_free_parameter_layout() {
    let ms = fdm_parameterized_model();
    let names = ms.free_parameter_names();
    assert!(names.contains(&"halo.fdm".to_string()));
    assert!(!names.contains(&"halo.mvirial".to_string()));
    assert!(names.contains(&"geom.inc".to_string()));
    assert!(!names.contains(&"geom.vel_shift".to_string()));
    assert_eq!(names.len(), ms.nparams_free());
}

#[test]
fn test_sampler_loop_recovers_dark_matter_fraction() {
    let mut ms = fdm_parameterized_model();
    let fdm_index = ms.store().free_index("halo", "fdm").unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..10 {
        let mut theta = jittered_theta(&ms, &mut rng, 0.05);
        let fdm = rng.gen_range(0.2..0.8);
        theta[fdm_index] = fdm;

        ms.update_parameters(&theta).unwrap();
        let measured = ms.dark_matter_fraction(R_FDM).unwrap();
        assert_relative_eq!(measured, fdm, epsilon = 1e-6);

        let mvirial = ms.get_parameter_value("halo", "mvirial").unwrap();
        assert!(mvirial.is_finite());
        assert_eq!(ms.get_free_parameters(), theta);
    }
}

#[test]
fn test_batch_matches_sequential_evaluation() {
    let ms = fdm_parameterized_model();
    let radii = log_radii(0.5, 25.0, 10);
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let rows: Vec<Vec<f64>> = (0..6).map(|_| jittered_theta(&ms, &mut rng, 0.05)).collect();
    let mut thetas = Array2::zeros((rows.len(), ms.nparams_free()));
    for (i, row) in rows.iter().enumerate() {
        thetas.row_mut(i).assign(&Array1::from(row.clone()));
    }

    let profiles = velocity_profiles(&ms, &thetas, &radii).unwrap();
    let fdms = evaluate_batch(&ms, &rows, |model| model.dark_matter_fraction(R_FDM)).unwrap();
    assert_eq!(profiles.dim(), (rows.len(), radii.len()));

    for (i, row) in rows.iter().enumerate() {
        let mut local = ms.clone();
        local.update_parameters(row).unwrap();
        let expected = local.velocity_profile_array(&Array1::from(radii.clone())).unwrap();
        for j in 0..radii.len() {
            assert_relative_eq!(profiles[[i, j]], expected[j], max_relative = 1e-12);
        }
        assert_relative_eq!(fdms[i], local.dark_matter_fraction(R_FDM).unwrap(), max_relative = 1e-12);
    }

    // The template is never touched
    assert_eq!(ms.get_parameter_value("halo", "fdm").unwrap(), 0.5);
}

#[test]
fn test_batch_rejects_wrong_width() {
    let ms = fdm_parameterized_model();
    let thetas = Array2::zeros((2, ms.nparams_free() + 1));
    assert!(matches!(
        velocity_profiles(&ms, &thetas, &[1.0, 2.0]),
        Err(GalkinError::DimensionMismatch(_))
    ));

    let rows = vec![vec![0.0; ms.nparams_free() - 1]];
    assert!(evaluate_batch(&ms, &rows, |model| model.circular_velocity(1.0)).is_err());
}

#[test]
fn test_observed_velocity_field() {
    let mut ms = fdm_parameterized_model();
    ms.add_component(UniformRadialFlow::new(20.0), None).unwrap();
    let geometry = ms.geometry().unwrap().clone();

    let flow = match ms.component("radial_flow").unwrap() {
        Component::Flow(flow) => flow.clone(),
        other => panic!("unexpected component {:?}", other.kind()),
    };

    let sky = (3.0, -2.0, 0.5);
    let gal = geometry.coord_transform(sky).unwrap();
    let back = geometry.inverse_coord_transform(gal).unwrap();
    assert_relative_eq!(back.0, sky.0, epsilon = 1e-12);
    assert_relative_eq!(back.1, sky.1, epsilon = 1e-12);
    assert_relative_eq!(back.2, sky.2, epsilon = 1e-12);

    // Rotation is antisymmetric about the center; a radial flow is too
    let rcyl = (gal.0 * gal.0 + gal.1 * gal.1).sqrt();
    let vrot = ms.velocity_profile(rcyl).unwrap();
    let mirrored = (-gal.0, -gal.1, -gal.2);
    let approaching = geometry.los_velocity(vrot, gal).unwrap();
    let receding = geometry.los_velocity(vrot, mirrored).unwrap();
    assert_relative_eq!(approaching, -receding, epsilon = 1e-10);

    let outflow = flow.los_velocity(&geometry, gal).unwrap();
    assert_relative_eq!(outflow, -flow.los_velocity(&geometry, mirrored).unwrap(), epsilon = 1e-10);
    assert!(outflow.abs() <= 20.0);

    // A face-on disk shows no rotation
    ms.set_parameter_value("geom", "inc", 0.0).unwrap();
    let face_on = ms.geometry().unwrap();
    assert_relative_eq!(face_on.los_velocity(vrot, gal).unwrap(), 0.0, epsilon = 1e-10);
}

#[test]
fn test_replacing_geometry_keeps_one_active() {
    let mut ms = fdm_parameterized_model();
    let before = ms.nparams();
    ms.add_component(Geometry::new(30.0, -45.0), Some("geom_outer")).unwrap();

    assert_eq!(ms.nparams(), before);
    assert_eq!(ms.geometry().unwrap().param("inc").unwrap(), 30.0);
    assert!(ms.component("geom").is_err());
}
