//! Ready-made ties for physically derived halo parameters.

use crate::model_set::ModelSet;
use crate::parameters::{Dependency, Tie};

/// Dark matter fraction of the named mass components at `r_fdm`.
///
/// Typically installed on a halo's `fdm` so that it follows the composite model.
///
/// # Examples
///
/// ```
/// use galkin::model_set::{ties, ModelSet};
/// use galkin::models::{Nfw, Sersic};
///
/// let mut ms = ModelSet::new();
/// ms.add_component(Sersic::new(10.5, 4.0, 1.0), Some("disk")).unwrap();
/// ms.add_component(Nfw::new(12.0, 5.0), Some("halo")).unwrap();
/// ms.set_parameter_tied("halo", "fdm", Some(ties::fdm_from_model(&["disk", "halo"], 4.0)))
///     .unwrap();
///
/// ms.resolve_tied_parameters().unwrap();
/// let fdm = ms.get_parameter_value("halo", "fdm").unwrap();
/// assert!(fdm > 0.0 && fdm < 1.0);
/// ```
pub fn fdm_from_model(components: &[&str], r_fdm: f64) -> Tie {
    let names: Vec<String> = components.iter().map(|c| c.to_string()).collect();
    let deps = names.iter().cloned().map(Dependency::Component).collect();
    Tie::resolver(deps, move |ctx| {
        let fdm = ctx.model_set.combiner_for(&names)?.dark_matter_fraction(&[r_fdm])?;
        Ok(fdm[0])
    })
}

/// Virial mass of `halo` reproducing its `fdm` against `baryons` at `r_fdm`.
///
/// Installed on the halo's `mvirial`. Adiabatic contraction follows the
/// model set's kinematic options.
pub fn mvirial_from_fdm(halo: &str, baryons: &str, r_fdm: f64) -> Tie {
    let halo = halo.to_string();
    let baryons = baryons.to_string();
    let deps = vec![Dependency::Component(baryons.clone()), Dependency::Component(halo.clone())];
    Tie::resolver(deps, move |ctx| {
        let model_set: &ModelSet = ctx.model_set;
        let halo = model_set.mass_component(&halo)?;
        let baryons = model_set.mass_component(&baryons)?;
        halo.calc_mvirial_from_fdm(baryons, r_fdm, &model_set.inversion_options())
    })
}
