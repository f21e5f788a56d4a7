//! Batch evaluation of many parameter vectors.
//!
//! Samplers evaluate a model set at many free parameter vectors. Each vector
//! gets its own clone of the model set, so evaluations share no mutable
//! state. With the `parallel` feature the batch is spread over the rayon
//! thread pool; otherwise it runs sequentially with identical results.

use ndarray::{Array1, Array2};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{GalkinError, Result};
use crate::model_set::ModelSet;

/// Rotation velocity profiles for a batch of free parameter vectors.
///
/// # Arguments
///
/// * `model_set` - Template model set; it is cloned per vector and never mutated
/// * `thetas` - One free parameter vector per row
/// * `r` - Radii in kpc
///
/// # Returns
///
/// * `Result<Array2<f64>>` - One velocity profile per row of `thetas`
///
/// # Errors
///
/// `DimensionMismatch` if the rows do not have `nparams_free` columns, or the
/// first error raised by any evaluation.
pub fn velocity_profiles(model_set: &ModelSet, thetas: &Array2<f64>, r: &[f64]) -> Result<Array2<f64>> {
    if thetas.ncols() != model_set.nparams_free() {
        return Err(GalkinError::DimensionMismatch(format!(
            "Expected {} free parameters per row, got {}",
            model_set.nparams_free(),
            thetas.ncols()
        )));
    }

    let rows: Vec<Vec<f64>> = thetas.rows().into_iter().map(|row| row.to_vec()).collect();
    let profiles = map_rows(&rows, |theta| {
        let mut local = model_set.clone();
        local.update_parameters(theta)?;
        local.velocity_profile_slice(r)
    })?;

    let mut out = Array2::zeros((rows.len(), r.len()));
    for (i, profile) in profiles.into_iter().enumerate() {
        out.row_mut(i).assign(&Array1::from_vec(profile));
    }
    Ok(out)
}

/// Evaluate a scalar statistic of the model for a batch of free parameter vectors.
///
/// `f` receives an exclusively-owned model set already updated to the row's values.
pub fn evaluate_batch<F>(model_set: &ModelSet, thetas: &[Vec<f64>], f: F) -> Result<Array1<f64>>
where
    F: Fn(&mut ModelSet) -> Result<f64> + Sync,
{
    let values = map_rows(thetas, |theta| {
        let mut local = model_set.clone();
        local.update_parameters(theta)?;
        f(&mut local)
    })?;
    Ok(Array1::from_vec(values))
}

#[cfg(feature = "parallel")]
fn map_rows<T, F>(rows: &[Vec<f64>], f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&[f64]) -> Result<T> + Sync,
{
    rows.par_iter().map(|row| f(row)).collect()
}

#[cfg(not(feature = "parallel"))]
fn map_rows<T, F>(rows: &[Vec<f64>], f: F) -> Result<Vec<T>>
where
    F: Fn(&[f64]) -> Result<T>,
{
    rows.iter().map(|row| f(row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Nfw, Sersic};
    use approx::assert_relative_eq;
    use ndarray::array;

    fn model_set() -> ModelSet {
        let mut ms = ModelSet::new();
        ms.add_component(Sersic::new(10.5, 4.0, 1.0), Some("disk")).unwrap();
        ms.add_component(Nfw::new(12.0, 5.0).with_redshift(1.613), None).unwrap();
        ms.set_parameter_fixed("disk", "n", true).unwrap();
        ms
    }

    #[test]
    fn test_batch_matches_sequential() {
        let template = model_set();
        let thetas = array![[10.5, 4.0, 12.0, 5.0], [11.0, 3.0, 11.5, 8.0], [10.0, 6.0, 12.5, 4.0]];
        let r = [1.0, 4.0, 10.0];

        let profiles = velocity_profiles(&template, &thetas, &r).unwrap();
        assert_eq!(profiles.dim(), (3, 3));

        for (i, row) in thetas.rows().into_iter().enumerate() {
            let mut ms = template.clone();
            ms.update_parameters(&row.to_vec()).unwrap();
            for (j, &x) in r.iter().enumerate() {
                assert_relative_eq!(profiles[[i, j]], ms.velocity_profile(x).unwrap());
            }
        }
        // The template is untouched
        assert_eq!(template.get_parameter_value("halo", "mvirial").unwrap(), 12.0);
    }

    #[test]
    fn test_batch_statistic_and_errors() {
        let template = model_set();
        let thetas = vec![vec![10.5, 4.0, 12.0, 5.0], vec![10.5, 4.0, 11.0, 5.0]];
        let fdm = evaluate_batch(&template, &thetas, |ms| ms.dark_matter_fraction(4.0)).unwrap();
        assert!(fdm[0] > fdm[1]);

        let bad = Array2::zeros((2, 3));
        assert!(matches!(
            velocity_profiles(&template, &bad, &[1.0]),
            Err(GalkinError::DimensionMismatch(_))
        ));
        let result = evaluate_batch(&template, &[vec![1.0]], |ms| ms.circular_velocity(1.0));
        assert!(matches!(result, Err(GalkinError::DimensionMismatch(_))));
    }
}
