//! Tests for the mass profiles

use crate::test_helpers::{assert_monotone_mass, log_radii, REFERENCE_Z};
use approx::assert_relative_eq;
use galkin::constants::{v_circular, G_KPC_MSUN_KMS2};
use galkin::cosmology::FlatLambdaCdm;
use galkin::models::{
    Burkert, DarkMatterHalo, DekelZhao, DiskBulge, Einasto, EinastoShape, LinearNfw, MassComponent, Nfw, Sersic,
    TwoPowerHalo,
};
use galkin::{GalkinError, MassModel};
use std::f64::consts::PI;
use std::sync::Arc;

fn all_profiles() -> Vec<MassComponent> {
    vec![
        Sersic::new(10.5, 4.0, 1.0).into(),
        Sersic::new(10.0, 1.0, 4.0).into(),
        DiskBulge::new(11.0, 5.0, 1.0, 1.0, 4.0, 0.3).into(),
        Nfw::new(12.0, 5.0).with_redshift(REFERENCE_Z).into(),
        LinearNfw::new(1e12, 5.0).with_redshift(REFERENCE_Z).into(),
        TwoPowerHalo::new(12.0, 5.0, 1.0, 3.0).into(),
        TwoPowerHalo::new(12.0, 5.0, 0.5, 3.5).into(),
        Burkert::new(12.0, 10.0).into(),
        Einasto::new(12.0, 5.0, Some(4.0), None, None).unwrap().into(),
        Einasto::new(12.0, 5.0, None, Some(0.17), None).unwrap().into(),
        DekelZhao::new(12.0, 1.0, 10.0).into(),
    ]
}

#[test]
fn test_enclosed_mass_monotone_and_zero_at_origin() {
    for profile in all_profiles() {
        assert_monotone_mass(&profile);
    }
}

#[test]
fn test_circular_velocity_from_enclosed_mass() {
    for profile in all_profiles() {
        for r in [0.5, 3.0, 20.0] {
            let expected = v_circular(profile.enclosed_mass(r).unwrap(), r);
            assert_relative_eq!(profile.circular_velocity(r).unwrap(), expected, max_relative = 1e-12);
        }
        assert_eq!(profile.circular_velocity(0.0).unwrap(), 0.0);
    }
}

#[test]
fn test_density_integrates_to_enclosed_mass() {
    // dM/dr = 4 π r² ρ for the halos; Sersic densities are projected amplitudes
    for profile in all_profiles().into_iter().filter(|p| p.is_halo()) {
        for r in [2.0, 15.0] {
            let h = 1e-4 * r;
            let dmdr = (profile.enclosed_mass(r + h).unwrap() - profile.enclosed_mass(r - h).unwrap()) / (2.0 * h);
            let expected = 4.0 * PI * r * r * profile.density(r).unwrap();
            assert_relative_eq!(dmdr, expected, max_relative = 1e-4);
        }
    }
}

#[test]
fn test_nfw_regression_values() {
    let halo = Nfw::new(12.0, 5.0).with_redshift(REFERENCE_Z);
    assert_relative_eq!(halo.calc_rvir().unwrap(), 113.19184480200144, max_relative = 1e-6);
    assert_relative_eq!(halo.circular_velocity(2.5).unwrap(), 97.53274745638375, max_relative = 1e-6);
    assert_relative_eq!(halo.enclosed_mass(2.5).unwrap(), 5529423277.09, max_relative = 1e-6);
}

#[test]
fn test_halos_hold_virial_mass_at_virial_radius() {
    let halos: Vec<MassComponent> = all_profiles().into_iter().filter(|p| p.is_halo()).collect();
    for profile in &halos {
        let halo = profile.as_halo().unwrap();
        let rvir = halo.calc_rvir().unwrap();
        assert_relative_eq!(profile.enclosed_mass(rvir).unwrap(), 1e12, max_relative = 1e-8);

        let vvir = (G_KPC_MSUN_KMS2 * 1e12 / rvir).sqrt();
        assert_relative_eq!(profile.circular_velocity(rvir).unwrap(), vvir, max_relative = 1e-8);
    }
}

#[test]
fn test_cosmology_sets_virial_radius() {
    let default = Nfw::new(12.0, 5.0);
    let dense = Nfw::new(12.0, 5.0).with_cosmology(Arc::new(FlatLambdaCdm::new(100.0, 0.3)));
    // rvir ∝ H0^(-2/3)
    let ratio = dense.calc_rvir().unwrap() / default.calc_rvir().unwrap();
    assert_relative_eq!(ratio, (70.0f64 / 100.0).powf(2.0 / 3.0), max_relative = 1e-12);
}

#[test]
fn test_two_power_reduces_to_nfw() {
    let nfw = Nfw::new(12.0, 5.0).with_redshift(REFERENCE_Z);
    let two_power = TwoPowerHalo::new(12.0, 5.0, 1.0, 3.0).with_redshift(REFERENCE_Z);
    for r in log_radii(0.1, 200.0, 15) {
        assert_relative_eq!(
            two_power.enclosed_mass(r).unwrap(),
            nfw.enclosed_mass(r).unwrap(),
            max_relative = 1e-8
        );
    }
}

#[test]
fn test_einasto_shapes_agree() {
    let by_n = Einasto::new(12.0, 5.0, Some(5.0), None, None).unwrap();
    let by_alpha = Einasto::new(12.0, 5.0, None, Some(0.2), None).unwrap();
    assert_eq!(by_n.primary_shape(), EinastoShape::N);
    assert_eq!(by_alpha.primary_shape(), EinastoShape::Alpha);
    for r in [1.0, 10.0, 100.0] {
        assert_relative_eq!(
            by_n.enclosed_mass(r).unwrap(),
            by_alpha.enclosed_mass(r).unwrap(),
            max_relative = 1e-12
        );
    }

    let both = Einasto::new(12.0, 5.0, Some(5.0), Some(0.2), None);
    assert!(matches!(both, Err(GalkinError::InvalidConfiguration(_))));
    let chosen = Einasto::new(12.0, 5.0, Some(5.0), Some(0.2), Some(EinastoShape::Alpha)).unwrap();
    assert_eq!(chosen.primary_shape(), EinastoShape::Alpha);
}

#[test]
fn test_disk_bulge_splits_mass() {
    let combined = DiskBulge::new(11.0, 5.0, 1.0, 1.0, 4.0, 0.3);
    let (disk_mass, bulge_mass) = combined.component_masses().unwrap();
    assert_relative_eq!(disk_mass + bulge_mass, 1e11, max_relative = 1e-12);
    assert_relative_eq!(bulge_mass, 3e10, max_relative = 1e-12);

    let disk = Sersic::new((1e11f64 * 0.7).log10(), 5.0, 1.0);
    let bulge = Sersic::new((1e11f64 * 0.3).log10(), 1.0, 4.0);
    let r = 4.0;
    assert_relative_eq!(
        combined.enclosed_mass(r).unwrap(),
        disk.enclosed_mass(r).unwrap() + bulge.enclosed_mass(r).unwrap(),
        max_relative = 1e-10
    );
}

#[test]
fn test_sersic_half_mass_radius() {
    for n in [0.5, 1.0, 2.5, 4.0] {
        let profile = Sersic::new(10.0, 3.0, n);
        assert_relative_eq!(profile.enclosed_mass(3.0).unwrap(), 5e9, max_relative = 1e-8);
        assert_relative_eq!(profile.enclosed_mass(1e4).unwrap(), 1e10, max_relative = 1e-6);
    }
}
