//! Tests for the free/full parameter bookkeeping of a model set

use crate::test_helpers::{disk_halo_model, jittered_theta};
use galkin::model_set::ModelSet;
use galkin::models::{DispersionConst, Geometry, Nfw, Sersic};
use galkin::parameters::Tie;
use galkin::{GalkinError, Model};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Count free parameters directly from the components
fn count_free(ms: &ModelSet) -> usize {
    ms.component_names()
        .iter()
        .map(|name| {
            ms.component(name)
                .unwrap()
                .parameters()
                .iter()
                .filter(|p| p.is_free())
                .count()
        })
        .sum()
}

fn assert_consistent(ms: &ModelSet) {
    assert_eq!(ms.nparams_free(), count_free(ms));
    assert_eq!(ms.get_free_parameters().len(), ms.nparams_free());

    // Every free entry reads back the component's value
    for (name, value) in ms.free_parameter_names().iter().zip(ms.get_free_parameters()) {
        let (component, parameter) = name.split_once('.').unwrap();
        assert_eq!(ms.get_parameter_value(component, parameter).unwrap(), value);
        assert!(ms.store().free_index(component, parameter).is_some());
    }
}

#[test]
fn test_declaration_order() {
    let ms = disk_halo_model();
    assert_eq!(ms.nparams(), 6);
    assert_eq!(ms.store().full_index("disk", "total_mass"), Some(0));
    assert_eq!(ms.store().full_index("halo", "mvirial"), Some(3));
    assert_eq!(ms.store().free_index("halo", "fdm"), None);
    assert_eq!(
        ms.free_parameter_names(),
        vec!["disk.total_mass", "disk.r_eff", "disk.n", "halo.mvirial", "halo.conc"]
    );
}

#[test]
fn test_randomized_operation_sequences() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for _ in 0..20 {
        let mut ms = disk_halo_model();
        ms.add_component(DispersionConst::new(40.0), None).unwrap();
        ms.add_component(Geometry::new(60.0, 30.0), None).unwrap();

        for _ in 0..40 {
            let keys: Vec<(String, String)> = ms
                .store()
                .keys()
                .map(|(c, p)| (c.to_string(), p.to_string()))
                .collect();
            let (component, parameter) = &keys[rng.gen_range(0..keys.len())];

            match rng.gen_range(0..4) {
                0 => ms
                    .set_parameter_fixed(component, parameter, rng.gen_bool(0.5))
                    .unwrap(),
                1 => ms
                    .set_parameter_value(component, parameter, rng.gen_range(-10.0..10.0))
                    .unwrap(),
                2 => {
                    let theta = jittered_theta(&ms, &mut rng, 0.1);
                    ms.update_parameters(&theta).unwrap();
                    assert_eq!(ms.get_free_parameters(), theta);
                }
                _ => {
                    // Round trip leaves everything unchanged
                    let before = ms.store().full_values();
                    let theta = ms.get_free_parameters();
                    ms.update_parameters(&theta).unwrap();
                    assert_eq!(ms.store().full_values(), before);
                }
            }
            assert_consistent(&ms);
        }
    }
}

#[test]
fn test_failed_update_leaves_state_untouched() {
    let mut ms = disk_halo_model();
    let before = ms.store().full_values();

    let too_long = vec![1.0; ms.nparams_free() + 1];
    assert!(matches!(
        ms.update_parameters(&too_long),
        Err(GalkinError::DimensionMismatch(_))
    ));
    assert_eq!(ms.store().full_values(), before);
}

#[test]
fn test_ties_leave_the_free_vector() {
    let mut ms = disk_halo_model();
    let free_before = ms.nparams_free();

    ms.set_parameter_tied("halo", "conc", Some(Tie::expression("disk.r_eff + 1").unwrap()))
        .unwrap();
    assert_eq!(ms.nparams_free(), free_before - 1);
    assert_consistent(&ms);

    ms.set_parameter_tied("halo", "conc", None).unwrap();
    assert_eq!(ms.nparams_free(), free_before);
    assert_consistent(&ms);
}

#[test]
fn test_values_are_not_clamped() {
    let mut ms = ModelSet::new();
    ms.add_component(Sersic::new(10.5, 4.0, 1.0), Some("disk")).unwrap();
    ms.add_component(Nfw::new(12.0, 5.0), None).unwrap();
    assert!(ms.free_parameters_within_bounds());

    ms.set_parameter_value("halo", "conc", 50.0).unwrap();
    assert_eq!(ms.get_parameter_value("halo", "conc").unwrap(), 50.0);
    assert!(!ms.free_parameters_within_bounds());
}
