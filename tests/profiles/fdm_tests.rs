//! Tests for the halo parameter inversions from a dark matter fraction

use crate::test_helpers::REFERENCE_Z;
use approx::assert_relative_eq;
use galkin::diagnostics::{DiagnosticKind, MemorySink};
use galkin::kinematics::KinematicOptions;
use galkin::model_set::ModelSet;
use galkin::models::{
    Burkert, DarkMatterHalo, DekelZhao, Einasto, InversionOptions, LinearNfw, MassComponent, Nfw, Sersic,
    TwoPowerHalo,
};
use galkin::{GalkinError, MassModel, Model};
use std::sync::Arc;

const R_FDM: f64 = 5.0;

fn disk() -> Sersic {
    Sersic::new(10.5, 4.0, 1.0)
}

/// Dark matter fraction of `halo` against the disk at `R_FDM`
fn fdm_of<H: MassModel>(halo: &H) -> f64 {
    let vdm = halo.circular_velocity(R_FDM).unwrap();
    let vbar = disk().circular_velocity(R_FDM).unwrap();
    vdm * vdm / (vdm * vdm + vbar * vbar)
}

/// Copy of `halo` with `fdm` set to its own fraction and `name` moved to `start`
fn perturbed<H: Model + MassModel + Clone>(halo: &H, name: &str, start: f64) -> H {
    let fdm = fdm_of(halo);
    let mut copy = halo.clone();
    copy.parameters_mut().set_value("fdm", fdm).unwrap();
    copy.parameters_mut().set_value(name, start).unwrap();
    copy
}

#[test]
fn test_mvirial_round_trip() {
    let truth = Nfw::new(11.7, 6.0).with_redshift(REFERENCE_Z);
    let guess = perturbed(&truth, "mvirial", 13.0);
    let mvirial = guess
        .calc_mvirial_from_fdm(&disk(), R_FDM, &InversionOptions::default())
        .unwrap();
    assert_relative_eq!(mvirial, 11.7, epsilon = 1e-6);

    let dekel_zhao = DekelZhao::new(11.7, 1.0, 8.0).with_redshift(REFERENCE_Z);
    let guess = perturbed(&dekel_zhao, "mvirial", 12.5);
    let mvirial = guess
        .calc_mvirial_from_fdm(&disk(), R_FDM, &InversionOptions::default())
        .unwrap();
    assert_relative_eq!(mvirial, 11.7, epsilon = 1e-6);
}

#[test]
fn test_linear_mvirial_round_trip() {
    let truth = LinearNfw::new(5e11, 6.0).with_redshift(REFERENCE_Z);
    let guess = perturbed(&truth, "mvirial", 1e13);
    let mvirial = guess
        .calc_mvirial_from_fdm(&disk(), R_FDM, &InversionOptions::default())
        .unwrap();
    assert_relative_eq!(mvirial, 5e11, max_relative = 1e-6);
}

#[test]
fn test_shape_parameter_round_trips() {
    let options = InversionOptions::default();

    let truth = TwoPowerHalo::new(12.0, 5.0, 1.3, 3.0).with_redshift(REFERENCE_Z);
    let alpha = perturbed(&truth, "alpha", 0.0)
        .calc_alpha_from_fdm(&disk(), R_FDM, &options)
        .unwrap();
    assert_relative_eq!(alpha, 1.3, epsilon = 1e-6);

    let truth = Burkert::new(12.0, 17.5).with_redshift(REFERENCE_Z);
    let rb = perturbed(&truth, "rB", 50.0)
        .calc_rb_from_fdm(&disk(), R_FDM, &options)
        .unwrap();
    assert_relative_eq!(rb, 17.5, epsilon = 1e-6);

    let truth = Einasto::new(12.0, 5.0, Some(4.3), None, None)
        .unwrap()
        .with_redshift(REFERENCE_Z);
    let guess = perturbed(&truth, "nEinasto", 1.0);
    let n = guess.calc_n_einasto_from_fdm(&disk(), R_FDM, &options).unwrap();
    assert_relative_eq!(n, 4.3, epsilon = 1e-6);
    let alpha = guess.calc_alpha_einasto_from_fdm(&disk(), R_FDM, &options).unwrap();
    assert_relative_eq!(alpha, 1.0 / 4.3, epsilon = 1e-6);
}

#[test]
fn test_edge_fractions_return_sentinels() {
    let sink = Arc::new(MemorySink::new());
    let options = InversionOptions::default().with_diagnostics(sink.clone());
    let mut halo = Nfw::new(12.0, 5.0);

    // The default fdm lies outside [0, 1]
    assert!(halo.calc_mvirial_from_fdm(&disk(), R_FDM, &options).unwrap().is_nan());

    for (fdm, expected) in [(0.0, f64::NEG_INFINITY), (1.0, f64::INFINITY)] {
        halo.parameters_mut().set_value("fdm", fdm).unwrap();
        assert_eq!(halo.calc_mvirial_from_fdm(&disk(), R_FDM, &options).unwrap(), expected);
    }

    halo.parameters_mut().set_value("fdm", 1.5).unwrap();
    assert!(halo.calc_mvirial_from_fdm(&disk(), R_FDM, &options).unwrap().is_nan());

    halo.parameters_mut().set_value("fdm", 0.5).unwrap();
    assert!(halo.calc_mvirial_from_fdm(&disk(), -1.0, &options).unwrap().is_nan());

    assert_eq!(sink.count(DiagnosticKind::FdmEdgeCase), 5);
}

#[test]
fn test_edge_fractions_for_shape_inversions() {
    let options = InversionOptions::default();
    let mut burkert = Burkert::new(12.0, 10.0);
    burkert.parameters_mut().set_value("fdm", 1.0).unwrap();
    assert_eq!(
        burkert.calc_rb_from_fdm(&disk(), R_FDM, &options).unwrap(),
        f64::INFINITY
    );

    let mut einasto = Einasto::new(12.0, 5.0, Some(4.0), None, None).unwrap();
    einasto.parameters_mut().set_value("fdm", 0.0).unwrap();
    assert!(einasto
        .calc_alpha_einasto_from_fdm(&disk(), R_FDM, &options)
        .unwrap()
        .is_nan());
}

#[test]
fn test_contraction_only_for_mvirial() {
    let options = InversionOptions::default().with_adiabatic_contraction(true);
    let mut halo = TwoPowerHalo::new(12.0, 5.0, 1.0, 3.0);
    halo.parameters_mut().set_value("fdm", 0.5).unwrap();
    assert!(matches!(
        halo.calc_alpha_from_fdm(&disk(), R_FDM, &options),
        Err(GalkinError::NotImplemented(_))
    ));

    let mut burkert = Burkert::new(12.0, 10.0);
    burkert.parameters_mut().set_value("fdm", 0.5).unwrap();
    assert!(matches!(
        burkert.calc_rb_from_fdm(&disk(), R_FDM, &options),
        Err(GalkinError::NotImplemented(_))
    ));
}

#[test]
fn test_contracted_mvirial_round_trip() {
    let truth = Nfw::new(11.7, 6.0).with_redshift(REFERENCE_Z);

    let mut ms = ModelSet::new().with_kinematic_options(KinematicOptions::default().with_adiabatic_contraction(true));
    ms.add_component(disk(), Some("disk")).unwrap();
    ms.add_component(truth.clone(), Some("halo")).unwrap();
    let fdm = ms.dark_matter_fraction(R_FDM).unwrap();
    assert!(fdm > fdm_of(&truth));

    let mut guess = truth.clone();
    guess.parameters_mut().set_value("fdm", fdm).unwrap();
    guess.parameters_mut().set_value("mvirial", 13.0).unwrap();
    let options = InversionOptions::default().with_adiabatic_contraction(true);
    let mvirial = guess.calc_mvirial_from_fdm(&disk(), R_FDM, &options).unwrap();
    assert_relative_eq!(mvirial, 11.7, epsilon = 1e-4);
}

#[test]
fn test_mass_component_dispatch() {
    let halo: MassComponent = perturbed(&Nfw::new(11.7, 6.0), "mvirial", 12.0).into();
    let baryons: MassComponent = disk().into();
    let mvirial = halo
        .calc_mvirial_from_fdm(&baryons, R_FDM, &InversionOptions::default())
        .unwrap();
    assert_relative_eq!(mvirial, 11.7, epsilon = 1e-6);

    assert!(matches!(
        baryons.calc_mvirial_from_fdm(&baryons, R_FDM, &InversionOptions::default()),
        Err(GalkinError::InvalidConfiguration(_))
    ));
}
