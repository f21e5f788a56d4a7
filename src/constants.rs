//! Physical constants and unit conversions.
//!
//! Values follow CODATA 2018 / IAU 2015 as used by astropy.

/// Newtonian gravitational constant in m³ kg⁻¹ s⁻².
pub const G_SI: f64 = 6.6743e-11;

/// Solar mass in kg.
pub const MSUN_KG: f64 = 1.988409870698051e30;

/// Parsec in m.
pub const PC_M: f64 = 3.085677581491367e16;

/// Kiloparsec in m.
pub const KPC_M: f64 = 1000.0 * PC_M;

/// Gravitational constant in pc Msun⁻¹ (km/s)².
pub const G_PC_MSUN_KMS2: f64 = G_SI * MSUN_KG / PC_M / 1.0e6;

/// Gravitational constant in kpc Msun⁻¹ (km/s)².
pub const G_KPC_MSUN_KMS2: f64 = G_PC_MSUN_KMS2 / 1000.0;

/// Circular velocity in km/s of a test particle at radius `r` (kpc) around
/// an enclosed mass `menc` (Msun).
///
/// Returns zero for non-positive radii.
pub fn v_circular(menc: f64, r: f64) -> f64 {
    if r <= 0.0 {
        return 0.0;
    }
    (G_SI * menc * MSUN_KG / (r * KPC_M)).sqrt() / 1.0e3
}

/// Enclosed mass in Msun implied by a circular velocity `vc` (km/s) at radius `r` (kpc).
pub fn menc_from_vcirc(vc: f64, r: f64) -> f64 {
    if r <= 0.0 {
        return 0.0;
    }
    (vc * 1.0e3).powi(2) * r * KPC_M / (G_SI * MSUN_KG)
}
