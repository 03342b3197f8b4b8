use nalgebra::{Matrix3, Vector3};

/// Vectors shorter than this are treated as zero before any normalization.
pub const SIGNIFICANCE_THRESHOLD: f64 = 1e-15;

#[inline]
pub fn is_significant(v: &Vector3<f64>) -> bool {
    v.norm_squared() > SIGNIFICANCE_THRESHOLD * SIGNIFICANCE_THRESHOLD
}

#[inline]
pub fn normalize_or_zero(v: &Vector3<f64>) -> Vector3<f64> {
    if is_significant(v) {
        v / v.norm()
    } else {
        Vector3::zeros()
    }
}

/// Returns `v` rescaled to `length`, or `v` unchanged when it is too short to carry a direction.
#[inline]
pub fn rescale_to(v: &Vector3<f64>, length: f64) -> Vector3<f64> {
    if is_significant(v) {
        v * (length / v.norm())
    } else {
        *v
    }
}

#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Builds the small-angle correction that transports a vector attached to a bond from the
/// previous bond orientation to the current one.
///
/// `rotation_axis` is the cross product of the previous and the current bond vectors and
/// `twist` is the half-step angular displacement about the current bond direction.
pub fn small_rotation_correction(rotation_axis: &Vector3<f64>, twist: &Vector3<f64>) -> Matrix3<f64> {
    let t = rotation_axis;
    let phi = twist;
    Matrix3::new(
        1.0 + t.z * phi.z + t.y * phi.y,
        phi.z - t.z - t.y * phi.x,
        -phi.y - t.z * phi.x + t.y,
        t.z - phi.z - t.x * phi.y,
        t.z * phi.z + 1.0 + t.x * phi.x,
        -t.z * phi.y + phi.x - t.x,
        -t.y - t.x * phi.z + phi.y,
        -t.y * phi.z + t.x - phi.x,
        t.y * phi.y + t.x * phi.x + 1.0,
    )
}
