//! Tests for composite rotation curves

use crate::test_helpers::{array_approx_eq, disk_halo_model, log_radii};
use approx::assert_relative_eq;
use galkin::diagnostics::{DiagnosticKind, MemorySink};
use galkin::kinematics::{KinematicOptions, PressureSupportType, SersicSlopeProvider};
use galkin::model_set::ModelSet;
use galkin::models::{DispersionConst, Einasto, Nfw, Sersic};
use galkin::{GalkinError, MassModel, Result};
use ndarray::Array1;
use std::sync::Arc;

const SIGMA: f64 = 40.0;

#[derive(Debug)]
struct SteepSlope;

impl SersicSlopeProvider for SteepSlope {
    fn dlnrho_dlnr(&self, r: f64, re: f64, _n: f64) -> Result<f64> {
        Ok(-2.0 * r / re)
    }
}

fn pressure_model(kind: PressureSupportType) -> ModelSet {
    let mut ms = disk_halo_model().with_kinematic_options(KinematicOptions::default().with_pressure_support(kind));
    ms.add_component(DispersionConst::new(SIGMA), Some("dispprof")).unwrap();
    ms
}

#[test]
fn test_components_add_in_quadrature() {
    let mut ms = disk_halo_model();
    let radii = Array1::from(log_radii(0.1, 50.0, 25));
    let (vtot, vbar, vdm) = ms.circular_velocity_components_array(&radii).unwrap();

    let disk = Sersic::new(10.5, 4.0, 1.0);
    for (i, &r) in radii.iter().enumerate() {
        assert_relative_eq!(vtot[i].powi(2), vbar[i].powi(2) + vdm[i].powi(2), max_relative = 1e-12);
        assert_relative_eq!(vbar[i], disk.circular_velocity(r).unwrap(), max_relative = 1e-12);
    }

    let menc = ms.enclosed_mass_array(&radii).unwrap();
    assert!(menc.windows(2).into_iter().all(|w| w[1] >= w[0]));
    assert_eq!(ms.circular_velocity(0.0).unwrap(), 0.0);
    assert_eq!(ms.circular_velocity(-1.0).unwrap(), 0.0);
}

#[test]
fn test_adiabatic_contraction_is_bounded() {
    let radii = Array1::from(log_radii(1.0, 30.0, 12));
    let (_, _, vdm_bare) = disk_halo_model().circular_velocity_components_array(&radii).unwrap();

    let sink = Arc::new(MemorySink::new());
    let mut ms = disk_halo_model()
        .with_diagnostics(sink.clone())
        .with_kinematic_options(KinematicOptions::default().with_adiabatic_contraction(true));
    let (vtot, vbar, vdm) = ms.circular_velocity_components_array(&radii).unwrap();

    for i in 0..radii.len() {
        assert!(vdm[i] >= vdm_bare[i] * (1.0 - 1e-6), "r = {}", radii[i]);
        assert!(vdm[i] < 2.0 * vdm_bare[i], "r = {}", radii[i]);
        assert_relative_eq!(vtot[i].powi(2), vbar[i].powi(2) + vdm[i].powi(2), max_relative = 1e-10);
    }
    assert_eq!(sink.count(DiagnosticKind::AdiabaticContraction), 1);

    // The contracted mass follows the total velocity
    let menc = ms.enclosed_mass(10.0).unwrap();
    let vc = ms.circular_velocity(10.0).unwrap();
    assert_relative_eq!(
        galkin::constants::v_circular(menc, 10.0),
        vc,
        max_relative = 1e-10
    );
}

#[test]
fn test_dark_matter_fraction_profile() {
    let mut ms = disk_halo_model();
    let radii = Array1::from(vec![1.0, 5.0, 20.0, 80.0]);
    let fdm = ms.dark_matter_fraction_array(&radii).unwrap();
    let (vtot, _, vdm) = ms.circular_velocity_components_array(&radii).unwrap();

    for i in 0..radii.len() {
        assert_relative_eq!(fdm[i], (vdm[i] / vtot[i]).powi(2), max_relative = 1e-12);
    }
    // The halo dominates far out
    assert!(fdm[3] > fdm[0]);
    assert_eq!(ms.dark_matter_fraction(0.0).unwrap(), 0.0);
}

#[test]
fn test_velocity_profile_without_pressure_support() {
    let mut ms = disk_halo_model();
    let radii = Array1::from(log_radii(0.5, 20.0, 8));
    let vrot = ms.velocity_profile_array(&radii).unwrap();
    let vcirc = ms.circular_velocity_array(&radii).unwrap();
    assert!(array_approx_eq(&vrot, &vcirc, 1e-12));
}

#[test]
fn test_exponential_self_gravity_correction() {
    let mut ms = pressure_model(PressureSupportType::ExponentialSelfGravity);
    let r = 6.0;
    let vc = ms.circular_velocity(r).unwrap();
    let expected = (vc * vc - 3.36 * SIGMA * SIGMA * r / 4.0).max(0.0).sqrt();
    assert_relative_eq!(ms.velocity_profile(r).unwrap(), expected, max_relative = 1e-12);
}

#[test]
fn test_pressure_gradient_correction() {
    let mut ms = pressure_model(PressureSupportType::PressureGradient);
    let r = 6.0;
    let vc = ms.circular_velocity(r).unwrap();
    let slope = Sersic::new(10.5, 4.0, 1.0).dlnrho_dlnr(r).unwrap();
    assert!(slope < 0.0);
    let expected = (vc * vc + SIGMA * SIGMA * slope).max(0.0).sqrt();
    assert_relative_eq!(ms.velocity_profile(r).unwrap(), expected, max_relative = 1e-10);
}

#[test]
fn test_exact_sersic_correction() {
    let mut ms = pressure_model(PressureSupportType::ExactSersic);
    assert!(!ms.capabilities().exact_sersic);
    assert!(matches!(
        ms.velocity_profile(3.0),
        Err(GalkinError::FeatureUnavailable(_))
    ));

    let mut ms = ms.with_sersic_slopes(Arc::new(SteepSlope));
    assert!(ms.capabilities().exact_sersic);
    let r = 3.0;
    let vc = ms.circular_velocity(r).unwrap();
    let expected = (vc * vc - 2.0 * SIGMA * SIGMA * r / 4.0).max(0.0).sqrt();
    assert_relative_eq!(ms.velocity_profile(r).unwrap(), expected, max_relative = 1e-12);
}

#[test]
fn test_pressure_support_clips_at_zero() {
    let mut ms = ModelSet::new().with_kinematic_options(
        KinematicOptions::default().with_pressure_support(PressureSupportType::ExponentialSelfGravity),
    );
    ms.add_component(Sersic::new(9.0, 2.0, 1.0), Some("disk")).unwrap();
    ms.add_component(DispersionConst::new(300.0), Some("dispprof")).unwrap();
    assert_eq!(ms.velocity_profile(10.0).unwrap(), 0.0);
}

#[test]
fn test_pressure_support_overrides() {
    let mut options = KinematicOptions::default().with_pressure_support(PressureSupportType::ExponentialSelfGravity);
    options.pressure_support_re = Some(2.0);
    let mut ms = disk_halo_model().with_kinematic_options(options);
    ms.add_component(DispersionConst::new(SIGMA), Some("dispprof")).unwrap();

    let setup = ms.pressure_setup().unwrap();
    assert_eq!(setup.inputs.re, 2.0);
    assert_eq!(setup.inputs.sigma, SIGMA);
    assert_eq!(setup.inputs.n, 1.0);

    ms.kinematic_options_mut().pressure_support_component = Some("ghost".to_string());
    assert!(ms.pressure_setup().is_err());
}

#[test]
fn test_non_finite_components_are_zeroed() {
    let sink = Arc::new(MemorySink::new());
    let mut ms = ModelSet::new().with_diagnostics(sink.clone());
    ms.add_component(Sersic::new(10.5, 4.0, 1.0), Some("disk")).unwrap();
    ms.add_component(Einasto::new(12.0, 5.0, Some(4.0), None, None).unwrap(), Some("halo"))
        .unwrap();
    ms.set_parameter_value("halo", "nEinasto", -1.0).unwrap();

    let (vtot, vbar, vdm) = ms.circular_velocity_components(5.0).unwrap();
    assert_eq!(vdm, 0.0);
    assert_relative_eq!(vtot, vbar, max_relative = 1e-14);
    assert!(sink.count(DiagnosticKind::NonFiniteZeroed) >= 1);
}

#[test]
fn test_unknown_components_in_combiner() {
    let ms = disk_halo_model();
    assert!(ms.combiner_for(&["ghost".to_string()]).is_err());

    let mut ms = disk_halo_model();
    ms.add_component(DispersionConst::new(SIGMA), Some("dispprof")).unwrap();
    assert!(matches!(
        ms.combiner_for(&["dispprof".to_string()]),
        Err(GalkinError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_halo_only_model() {
    let mut ms = ModelSet::new();
    ms.add_component(Nfw::new(12.0, 5.0), None).unwrap();
    let (vtot, vbar, vdm) = ms.circular_velocity_components(10.0).unwrap();
    assert_eq!(vbar, 0.0);
    assert_relative_eq!(vtot, vdm, max_relative = 1e-14);
    assert_relative_eq!(ms.dark_matter_fraction(10.0).unwrap(), 1.0, max_relative = 1e-12);
}
