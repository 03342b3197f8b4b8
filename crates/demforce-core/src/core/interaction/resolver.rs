use crate::core::materials::database::MaterialsDatabase;
use crate::core::materials::properties::{NORMAL_PRESSURE, PropertyType};
use std::f64::consts::PI;
use tracing::trace;

#[inline]
fn nan_if_not_finite(value: f64) -> f64 {
    if value.is_finite() { value } else { f64::NAN }
}

#[inline]
pub fn equivalent_radius(r1: f64, r2: f64) -> f64 {
    r1 * r2 / (r1 + r2)
}

#[inline]
pub fn equivalent_mass(m1: f64, m2: f64) -> f64 {
    m1 * m2 / (m1 + m2)
}

#[inline]
pub fn equivalent_young_modulus(e1: f64, v1: f64, e2: f64, v2: f64) -> f64 {
    nan_if_not_finite(1.0 / ((1.0 - v1 * v1) / e1 + (1.0 - v2 * v2) / e2))
}

#[inline]
pub fn equivalent_shear_modulus(e1: f64, v1: f64, e2: f64, v2: f64) -> f64 {
    nan_if_not_finite(
        1.0 / (2.0 * (2.0 - v1) * (1.0 + v1) / e1 + 2.0 * (2.0 - v2) * (1.0 + v2) / e2),
    )
}

#[inline]
pub fn equivalent_surface_energy(g1: f64, g2: f64) -> f64 {
    nan_if_not_finite((g1 * g2).sqrt())
}

#[inline]
pub fn equivalent_thermal_conductivity(k1: f64, k2: f64) -> f64 {
    nan_if_not_finite(2.0 * k1 * k2 / (k1 + k2))
}

/// Smaller of the two yield strengths; undefined if either one is.
#[inline]
pub fn equivalent_yield_strength(y1: f64, y2: f64) -> f64 {
    if y1.is_nan() || y2.is_nan() {
        f64::NAN
    } else {
        y1.min(y2)
    }
}

/// Damping coefficient derived from the restitution coefficient.
///
/// Negative for any restitution in (0, 1); zero restitution is undefined.
#[inline]
pub fn damping_alpha(restitution: f64) -> f64 {
    let ln_e = restitution.ln();
    nan_if_not_finite(ln_e / (ln_e * ln_e + PI * PI).sqrt())
}

/// Derived properties of a pair of compounds at one thermodynamic state.
///
/// Every field is either a finite number or NaN; NaN marks a quantity that could not be
/// resolved and must disable the force term that depends on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionProperties {
    pub equiv_young_modulus: f64,
    pub equiv_shear_modulus: f64,
    pub equiv_surface_energy: f64,
    pub equiv_thermal_conductivity: f64,
    pub equiv_yield_strength: f64,
    pub restitution: f64,
    pub alpha: f64,
    pub sliding_friction: f64,
    pub rolling_friction: f64,
}

impl InteractionProperties {
    pub fn undefined() -> Self {
        Self {
            equiv_young_modulus: f64::NAN,
            equiv_shear_modulus: f64::NAN,
            equiv_surface_energy: f64::NAN,
            equiv_thermal_conductivity: f64::NAN,
            equiv_yield_strength: f64::NAN,
            restitution: f64::NAN,
            alpha: f64::NAN,
            sliding_friction: f64::NAN,
            rolling_friction: f64::NAN,
        }
    }

    pub fn is_fully_defined(&self) -> bool {
        [
            self.equiv_young_modulus,
            self.equiv_shear_modulus,
            self.equiv_surface_energy,
            self.equiv_thermal_conductivity,
            self.equiv_yield_strength,
            self.restitution,
            self.alpha,
            self.sliding_friction,
            self.rolling_friction,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Combines compound and pairwise properties from a [`MaterialsDatabase`].
#[derive(Debug, Clone, Copy)]
pub struct InteractionResolver<'a> {
    db: &'a MaterialsDatabase,
    pressure: f64,
}

impl<'a> InteractionResolver<'a> {
    pub fn new(db: &'a MaterialsDatabase) -> Self {
        Self {
            db,
            pressure: NORMAL_PRESSURE,
        }
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    /// Resolves the interaction of compounds `a` and `b` at temperature `t`.
    ///
    /// # Arguments
    ///
    /// * `a` - Key of the first compound.
    /// * `b` - Key of the second compound.
    /// * `t` - Temperature [K].
    ///
    /// # Return
    ///
    /// The derived bundle. Fields that depend on an undefined correlation are NaN.
    pub fn resolve(&self, a: &str, b: &str, t: f64) -> InteractionProperties {
        let p = self.pressure;
        let compound = |key: &str, property| self.db.property_value(key, property, t, p);
        let pair = |property| self.db.interaction_value(a, b, property, t, p);

        let (e1, v1) = (
            compound(a, PropertyType::YoungModulus),
            compound(a, PropertyType::PoissonRatio),
        );
        let (e2, v2) = (
            compound(b, PropertyType::YoungModulus),
            compound(b, PropertyType::PoissonRatio),
        );
        let restitution = nan_if_not_finite(pair(PropertyType::RestitutionCoefficient));

        let props = InteractionProperties {
            equiv_young_modulus: equivalent_young_modulus(e1, v1, e2, v2),
            equiv_shear_modulus: equivalent_shear_modulus(e1, v1, e2, v2),
            equiv_surface_energy: equivalent_surface_energy(
                compound(a, PropertyType::SurfaceEnergy),
                compound(b, PropertyType::SurfaceEnergy),
            ),
            equiv_thermal_conductivity: equivalent_thermal_conductivity(
                compound(a, PropertyType::ThermalConductivity),
                compound(b, PropertyType::ThermalConductivity),
            ),
            equiv_yield_strength: equivalent_yield_strength(
                compound(a, PropertyType::YieldStrength),
                compound(b, PropertyType::YieldStrength),
            ),
            restitution,
            alpha: damping_alpha(restitution),
            sliding_friction: nan_if_not_finite(pair(PropertyType::SlidingFriction)),
            rolling_friction: nan_if_not_finite(pair(PropertyType::RollingFriction)),
        };
        trace!(a, b, t, defined = props.is_fully_defined(), "Resolved interaction");
        props
    }
}
