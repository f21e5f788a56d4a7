//! Tests for tied parameter resolution

use galkin::model_set::{ties, ModelSet};
use galkin::models::{DispersionConst, Einasto, Nfw, Sersic};
use galkin::parameters::{Dependency, ParamRef, Tie};
use galkin::GalkinError;

fn components() -> Vec<(&'static str, galkin::model_set::Component)> {
    vec![
        ("disk", Sersic::new(10.5, 4.0, 1.0).into()),
        ("bulge", Sersic::new(10.0, 1.0, 4.0).into()),
        ("halo", Nfw::new(12.0, 5.0).with_redshift(1.613).into()),
        ("dispprof", DispersionConst::new(40.0).into()),
    ]
}

fn build(order: &[usize]) -> ModelSet {
    let all = components();
    let mut ms = ModelSet::new();
    for &i in order {
        let (name, component) = all[i].clone();
        ms.add_component(component, Some(name)).unwrap();
    }
    ms.set_parameter_tied("bulge", "r_eff", Some(Tie::expression("0.25 * disk.r_eff").unwrap()))
        .unwrap();
    ms.set_parameter_tied("halo", "conc", Some(Tie::expression("2 * bulge.r_eff + 3").unwrap()))
        .unwrap();
    ms.set_parameter_tied("dispprof", "sigma0", Some(Tie::expression("10 * halo.conc").unwrap()))
        .unwrap();
    ms.set_parameter_tied(
        "halo",
        "fdm",
        Some(ties::fdm_from_model(&["disk", "bulge", "halo"], 5.0)),
    )
    .unwrap();
    ms
}

#[test]
fn test_resolution_is_order_independent() {
    let orders = [[0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1], [1, 3, 0, 2]];
    let mut resolved = Vec::new();

    for order in &orders {
        let mut ms = build(order);
        ms.resolve_tied_parameters().unwrap();
        resolved.push([
            ms.get_parameter_value("bulge", "r_eff").unwrap(),
            ms.get_parameter_value("halo", "conc").unwrap(),
            ms.get_parameter_value("dispprof", "sigma0").unwrap(),
            ms.get_parameter_value("halo", "fdm").unwrap(),
        ]);
    }

    assert_eq!(resolved[0][0], 1.0);
    assert_eq!(resolved[0][1], 5.0);
    assert_eq!(resolved[0][2], 50.0);
    assert!(resolved[0][3] > 0.0 && resolved[0][3] < 1.0);
    for values in &resolved[1..] {
        assert_eq!(values, &resolved[0]);
    }
}

#[test]
fn test_ties_follow_updates() {
    let mut ms = build(&[0, 1, 2, 3]);
    ms.set_parameter_value("disk", "r_eff", 8.0).unwrap();
    let fdm_extended_disk = {
        ms.circular_velocity(5.0).unwrap();
        ms.get_parameter_value("halo", "fdm").unwrap()
    };
    assert_eq!(ms.get_parameter_value("halo", "conc").unwrap(), 7.0);

    // A more compact disk lowers the dark matter fraction at 5 kpc
    ms.set_parameter_value("disk", "r_eff", 2.0).unwrap();
    ms.circular_velocity(5.0).unwrap();
    assert!(ms.get_parameter_value("halo", "fdm").unwrap() < fdm_extended_disk);
}

#[test]
fn test_resolver_with_declared_dependencies() {
    let mut ms = build(&[0, 1, 2, 3]);
    let tie = Tie::resolver(
        vec![Dependency::Parameter(ParamRef::qualified("halo", "conc"))],
        |ctx| Ok(ctx.value("halo.conc")? + ctx.value("n")?),
    );
    ms.set_parameter_tied("disk", "total_mass", Some(tie)).unwrap();
    ms.resolve_tied_parameters().unwrap();
    assert_eq!(ms.get_parameter_value("disk", "total_mass").unwrap(), 6.0);
}

#[test]
fn test_cycles_are_rejected() {
    let mut ms = build(&[0, 1, 2, 3]);
    let result = ms.set_parameter_tied("disk", "r_eff", Some(Tie::expression("dispprof.sigma0").unwrap()));
    assert!(matches!(result, Err(GalkinError::CircularDependency(_))));

    // Self reference
    let result = ms.set_parameter_tied("disk", "n", Some(Tie::expression("n + 1").unwrap()));
    assert!(matches!(result, Err(GalkinError::CircularDependency(_))));

    // The model set still evaluates
    assert!(ms.circular_velocity(3.0).unwrap() > 0.0);
}

#[test]
fn test_unknown_tie_variable() {
    let mut ms = build(&[0, 1, 2, 3]);
    ms.set_parameter_tied("disk", "n", Some(Tie::expression("ghost.n * 2").unwrap()))
        .unwrap();
    assert!(ms.resolve_tied_parameters().is_err());
}

#[test]
fn test_einasto_shape_tie() {
    let mut ms = ModelSet::new();
    ms.add_component(Einasto::new(12.0, 5.0, Some(4.0), None, None).unwrap(), None)
        .unwrap();
    assert_eq!(ms.free_parameter_names(), vec!["halo.mvirial", "halo.conc", "halo.nEinasto"]);

    ms.set_parameter_value("halo", "nEinasto", 5.0).unwrap();
    ms.resolve_tied_parameters().unwrap();
    assert_eq!(ms.get_parameter_value("halo", "alphaEinasto").unwrap(), 0.2);
}
