use super::particle::Particle;
use super::pbc::PeriodicBoundaries;
use super::{PairError, check_pair};
use crate::core::materials::database::MaterialsDatabase;
use crate::core::materials::properties::PropertyType;
use nalgebra::Vector3;
use std::f64::consts::PI;

/// End-of-activity time of a bond that has never broken.
pub const DEFAULT_ACTIVITY_END: f64 = 1e300;

/// Elastic and strength properties a solid bond takes from its compound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondMaterial {
    pub normal_stiffness: f64,
    pub tangential_stiffness: f64,
    pub normal_strength: f64,
    pub tangential_strength: f64,
    pub time_therm_exp_coeff: f64,
}

impl BondMaterial {
    /// Evaluates the bond properties of `compound` at (`t`, `p`).
    ///
    /// The normal stiffness is the Young modulus and the tangential stiffness the derived shear
    /// modulus `E / (2 (1 + v))`. Undefined properties come back as NaN.
    pub fn from_compound(db: &MaterialsDatabase, compound: &str, t: f64, p: f64) -> Self {
        let value = |property| db.property_value(compound, property, t, p);
        let young = value(PropertyType::YoungModulus);
        let poisson = value(PropertyType::PoissonRatio);
        Self {
            normal_stiffness: young,
            tangential_stiffness: young / (2.0 * (1.0 + poisson)),
            normal_strength: value(PropertyType::NormalStrength),
            tangential_strength: value(PropertyType::TangentialStrength),
            time_therm_exp_coeff: value(PropertyType::TimeThermExpCoeff),
        }
    }
}

/// Persistent state of one solid bond between a left and a right particle.
///
/// Once `active` is false the bond is terminal: force models skip it and `end_activity`
/// holds the time at which it broke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidBond {
    pub left: usize,
    pub right: usize,

    pub diameter: f64,
    pub cross_cut: f64,
    pub axial_moment: f64,
    pub initial_length: f64,
    pub normal_stiffness: f64,
    pub tangential_stiffness: f64,
    pub normal_strength: f64,
    pub tangential_strength: f64,
    pub time_therm_exp_coeff: f64,

    pub prev_bond: Vector3<f64>,
    pub tangential_overlap: Vector3<f64>,
    pub normal_moment: Vector3<f64>,
    pub tangential_moment: Vector3<f64>,
    pub tangential_force: Vector3<f64>,
    pub total_force: Vector3<f64>,
    pub unsym_moment: Vector3<f64>,

    pub active: bool,
    pub end_activity: f64,
}

impl SolidBond {
    /// Creates an unloaded bond whose initial length is the current distance between the two
    /// particle centers.
    ///
    /// # Arguments
    ///
    /// * `left` - Index of the left particle.
    /// * `right` - Index of the right particle.
    /// * `diameter` - Bond diameter [m].
    /// * `particles` - Particle set the indices refer to.
    /// * `pbc` - Periodic boundaries used for the bond vector.
    /// * `material` - Properties of the bond compound.
    ///
    /// # Errors
    ///
    /// Returns [`PairError`] if either index is out of range or both name the same particle.
    pub fn new(
        left: usize,
        right: usize,
        diameter: f64,
        particles: &[Particle],
        pbc: &PeriodicBoundaries,
        material: BondMaterial,
    ) -> Result<Self, PairError> {
        check_pair(left, right, particles.len())?;
        let bond = pbc.bond_vector(&particles[right].coord, &particles[left].coord);
        Ok(Self {
            left,
            right,
            diameter,
            cross_cut: PI * diameter * diameter / 4.0,
            axial_moment: PI * diameter.powi(4) / 64.0,
            initial_length: bond.norm(),
            normal_stiffness: material.normal_stiffness,
            tangential_stiffness: material.tangential_stiffness,
            normal_strength: material.normal_strength,
            tangential_strength: material.tangential_strength,
            time_therm_exp_coeff: material.time_therm_exp_coeff,
            prev_bond: bond,
            tangential_overlap: Vector3::zeros(),
            normal_moment: Vector3::zeros(),
            tangential_moment: Vector3::zeros(),
            tangential_force: Vector3::zeros(),
            total_force: Vector3::zeros(),
            unsym_moment: Vector3::zeros(),
            active: true,
            end_activity: DEFAULT_ACTIVITY_END,
        })
    }
}

/// Structure-of-arrays copy of a bond list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolidBondBuffers {
    pub left: Vec<usize>,
    pub right: Vec<usize>,
    pub diameters: Vec<f64>,
    pub cross_cuts: Vec<f64>,
    pub axial_moments: Vec<f64>,
    pub initial_lengths: Vec<f64>,
    pub normal_stiffnesses: Vec<f64>,
    pub tangential_stiffnesses: Vec<f64>,
    pub normal_strengths: Vec<f64>,
    pub tangential_strengths: Vec<f64>,
    pub time_therm_exp_coeffs: Vec<f64>,
    pub prev_bonds: Vec<Vector3<f64>>,
    pub tangential_overlaps: Vec<Vector3<f64>>,
    pub normal_moments: Vec<Vector3<f64>>,
    pub tangential_moments: Vec<Vector3<f64>>,
    pub tangential_forces: Vec<Vector3<f64>>,
    pub total_forces: Vec<Vector3<f64>>,
    pub unsym_moments: Vec<Vector3<f64>>,
    pub active: Vec<bool>,
    pub end_activities: Vec<f64>,
}

impl SolidBondBuffers {
    pub fn from_bonds(bonds: &[SolidBond]) -> Self {
        let mut buffers = Self::default();
        for bond in bonds {
            buffers.left.push(bond.left);
            buffers.right.push(bond.right);
            buffers.diameters.push(bond.diameter);
            buffers.cross_cuts.push(bond.cross_cut);
            buffers.axial_moments.push(bond.axial_moment);
            buffers.initial_lengths.push(bond.initial_length);
            buffers.normal_stiffnesses.push(bond.normal_stiffness);
            buffers.tangential_stiffnesses.push(bond.tangential_stiffness);
            buffers.normal_strengths.push(bond.normal_strength);
            buffers.tangential_strengths.push(bond.tangential_strength);
            buffers.time_therm_exp_coeffs.push(bond.time_therm_exp_coeff);
            buffers.prev_bonds.push(bond.prev_bond);
            buffers.tangential_overlaps.push(bond.tangential_overlap);
            buffers.normal_moments.push(bond.normal_moment);
            buffers.tangential_moments.push(bond.tangential_moment);
            buffers.tangential_forces.push(bond.tangential_force);
            buffers.total_forces.push(bond.total_force);
            buffers.unsym_moments.push(bond.unsym_moment);
            buffers.active.push(bond.active);
            buffers.end_activities.push(bond.end_activity);
        }
        buffers
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> SolidBond {
        SolidBond {
            left: self.left[i],
            right: self.right[i],
            diameter: self.diameters[i],
            cross_cut: self.cross_cuts[i],
            axial_moment: self.axial_moments[i],
            initial_length: self.initial_lengths[i],
            normal_stiffness: self.normal_stiffnesses[i],
            tangential_stiffness: self.tangential_stiffnesses[i],
            normal_strength: self.normal_strengths[i],
            tangential_strength: self.tangential_strengths[i],
            time_therm_exp_coeff: self.time_therm_exp_coeffs[i],
            prev_bond: self.prev_bonds[i],
            tangential_overlap: self.tangential_overlaps[i],
            normal_moment: self.normal_moments[i],
            tangential_moment: self.tangential_moments[i],
            tangential_force: self.tangential_forces[i],
            total_force: self.total_forces[i],
            unsym_moment: self.unsym_moments[i],
            active: self.active[i],
            end_activity: self.end_activities[i],
        }
    }

    /// Stores the mutable part of a bond record back into slot `i`.
    #[inline]
    pub fn set_state(&mut self, i: usize, bond: &SolidBond) {
        self.prev_bonds[i] = bond.prev_bond;
        self.tangential_overlaps[i] = bond.tangential_overlap;
        self.normal_moments[i] = bond.normal_moment;
        self.tangential_moments[i] = bond.tangential_moment;
        self.tangential_forces[i] = bond.tangential_force;
        self.total_forces[i] = bond.total_force;
        self.unsym_moments[i] = bond.unsym_moment;
        self.active[i] = bond.active;
        self.end_activities[i] = bond.end_activity;
    }

    pub fn to_bonds(&self) -> Vec<SolidBond> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::materials::correlation::TpProperty;
    use crate::core::materials::database::Compound;

    const TOLERANCE: f64 = 1e-12;

    fn material() -> BondMaterial {
        BondMaterial {
            normal_stiffness: 1e9,
            tangential_stiffness: 4e8,
            normal_strength: 1e7,
            tangential_strength: 2e7,
            time_therm_exp_coeff: 0.0,
        }
    }

    fn pair() -> Vec<Particle> {
        vec![
            Particle::new(Vector3::zeros(), 1e-3, 1e-6, 0),
            Particle::new(Vector3::new(2e-3, 0.0, 0.0), 1e-3, 1e-6, 0),
        ]
    }

    #[test]
    fn new_bond_derives_section_properties_and_initial_length() {
        let bond = SolidBond::new(0, 1, 1e-3, &pair(), &PeriodicBoundaries::disabled(), material())
            .unwrap();
        assert!((bond.cross_cut - PI * 0.25e-6).abs() < TOLERANCE);
        assert!((bond.axial_moment - PI * 1e-12 / 64.0).abs() < 1e-24);
        assert!((bond.initial_length - 2e-3).abs() < TOLERANCE);
        assert_eq!(bond.prev_bond, Vector3::new(-2e-3, 0.0, 0.0));
        assert!(bond.active);
        assert_eq!(bond.end_activity, DEFAULT_ACTIVITY_END);
    }

    #[test]
    fn new_bond_rejects_self_bond() {
        let result = SolidBond::new(1, 1, 1e-3, &pair(), &PeriodicBoundaries::disabled(), material());
        assert_eq!(result, Err(PairError::SelfPair(1)));
    }

    #[test]
    fn bond_material_uses_derived_shear_stiffness() {
        let mut db = MaterialsDatabase::new();
        let mut compound = Compound::new("glass", "Glass");
        compound
            .set_property(TpProperty::with_constant(PropertyType::YoungModulus, 5e9))
            .unwrap();
        compound
            .set_property(TpProperty::with_constant(PropertyType::PoissonRatio, 0.25))
            .unwrap();
        db.add_compound(compound);

        let material = BondMaterial::from_compound(&db, "glass", 300.0, 101_325.0);
        assert_eq!(material.normal_stiffness, 5e9);
        assert!((material.tangential_stiffness - 2e9).abs() < 1e-3);
        assert!(material.normal_strength.is_nan());
    }

    #[test]
    fn buffers_preserve_every_field() {
        let particles = pair();
        let mut bond =
            SolidBond::new(0, 1, 1e-3, &particles, &PeriodicBoundaries::disabled(), material())
                .unwrap();
        bond.normal_moment = Vector3::new(1.0, 2.0, 3.0);
        let bonds = vec![bond];
        let mut buffers = SolidBondBuffers::from_bonds(&bonds);
        assert_eq!(buffers.to_bonds(), bonds);

        bond.active = false;
        bond.end_activity = 0.5;
        buffers.set_state(0, &bond);
        assert_eq!(buffers.get(0), bond);
        assert_eq!(buffers.active_count(), 0);
    }
}
