use super::batch;
use super::config::ForceSetup;
use super::error::EngineError;
use super::tasks::{bond_forces, contact_forces, field_forces};
use crate::core::forces::parameters::BatchParameters;
use crate::core::forces::tally::ForceTally;
use crate::core::forces::traits::{Model, StepContext};
use crate::core::interaction::table::InteractionTable;
use crate::core::materials::database::MaterialsDatabase;
use crate::core::models::bond::{SolidBond, SolidBondBuffers};
use crate::core::models::contact::{ContactBuffers, ContactStore};
use crate::core::models::particle::{Particle, ParticleBuffers};
use crate::core::models::check_pair;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info, instrument, warn};

/// Time and thermodynamic state of one force step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInput {
    pub time: f64,
    pub dt: f64,
    /// Temperature the interaction properties are evaluated at [K].
    pub temperature: f64,
}

/// Summary of one force step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepReport {
    pub tally: ForceTally,
    /// Whether the interaction table had to be rebuilt for this step's temperature.
    pub table_rebuilt: bool,
}

/// Runs force steps for a configured set of models on either execution path.
#[derive(Debug)]
pub struct ForceEngine<'a> {
    db: &'a MaterialsDatabase,
    setup: ForceSetup,
    table: Option<InteractionTable>,
}

impl<'a> ForceEngine<'a> {
    pub fn new(db: &'a MaterialsDatabase, setup: ForceSetup) -> Self {
        info!(
            models = ?setup.model_names(),
            materials = setup.materials.len(),
            "Force engine configured"
        );
        Self {
            db,
            setup,
            table: None,
        }
    }

    pub fn setup(&self) -> &ForceSetup {
        &self.setup
    }

    pub fn interaction_table(&self) -> Option<&InteractionTable> {
        self.table.as_ref()
    }

    fn ensure_table(&mut self, temperature: f64) -> bool {
        let current = self.table.as_ref().map(InteractionTable::temperature);
        if current == Some(temperature) {
            return false;
        }
        debug!(from = ?current, to = temperature, "Rebuilding interaction table");
        self.table = Some(InteractionTable::build(
            self.db,
            &self.setup.materials,
            temperature,
        ));
        true
    }

    /// Checks that every index the records hold refers to an existing particle or material and
    /// that every active bond has fully defined properties.
    ///
    /// Must pass before the first step; the step functions do not repeat these checks.
    pub fn validate(
        &self,
        particles: &[Particle],
        contacts: &ContactStore,
        bonds: &[SolidBond],
    ) -> Result<(), EngineError> {
        let count = self.setup.materials.len();
        for (index, particle) in particles.iter().enumerate() {
            if particle.material >= count {
                return Err(EngineError::UnknownMaterial {
                    particle: index,
                    material: particle.material,
                    count,
                });
            }
        }
        for (_, state) in contacts.iter() {
            check_pair(state.src, state.dst, particles.len())?;
        }
        for (index, bond) in bonds.iter().enumerate() {
            check_pair(bond.left, bond.right, particles.len())?;
            if bond.active {
                check_bond_properties(index, bond)?;
            }
        }
        Ok(())
    }

    /// Structure-of-arrays counterpart of [`ForceEngine::validate`].
    pub fn validate_buffers(
        &self,
        particles: &ParticleBuffers,
        contacts: &ContactBuffers,
        bonds: &SolidBondBuffers,
    ) -> Result<(), EngineError> {
        batch::check_buffers(particles, contacts, bonds)?;
        let count = self.setup.materials.len();
        if let Some((index, &material)) = particles
            .materials
            .iter()
            .enumerate()
            .find(|(_, m)| **m >= count)
        {
            return Err(EngineError::UnknownMaterial {
                particle: index,
                material,
                count,
            });
        }
        for (&src, &dst) in contacts.src.iter().zip(&contacts.dst) {
            check_pair(src, dst, particles.len())?;
        }
        for i in 0..bonds.len() {
            let bond = bonds.get(i);
            check_pair(bond.left, bond.right, particles.len())?;
            if bond.active {
                check_bond_properties(i, &bond)?;
            }
        }
        Ok(())
    }

    /// Runs one force step on the per-record path.
    ///
    /// Clears the particle accumulators, evaluates contacts, bonds and field models against
    /// the start-of-step state and accumulates their loads.
    #[instrument(skip_all, name = "host_step", fields(time = input.time))]
    pub fn step_host(
        &mut self,
        input: &StepInput,
        particles: &mut [Particle],
        contacts: &mut ContactStore,
        bonds: &mut [SolidBond],
    ) -> Result<StepReport, EngineError> {
        let table_rebuilt = self.ensure_table(input.temperature);
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| EngineError::Internal("interaction table missing".to_string()))?;
        let ctx = StepContext::new(input.time, input.dt).with_pbc(self.setup.pbc);

        particles.iter_mut().for_each(Particle::clear_accumulators);
        let mut tally = ForceTally::default();

        if let Some(model) = &self.setup.contact_model {
            let params = model.parameters().values();
            tally += contact_forces::run(model.as_ref(), &ctx, params, particles, table, contacts);
            contact_forces::accumulate(contacts, particles);
        }

        if let Some(model) = &self.setup.bond_model {
            let broken = AtomicU32::new(0);
            let params = model.parameters().values();
            tally += bond_forces::run(model.as_ref(), &ctx, params, particles, bonds, &broken);
            let counted = broken.load(Ordering::Relaxed) as usize;
            if counted != tally.broken_bonds {
                return Err(EngineError::Internal(format!(
                    "broken bond counter {} disagrees with tally {}",
                    counted, tally.broken_bonds
                )));
            }
            bond_forces::accumulate(bonds, particles);
        }

        if !self.setup.field_models.is_empty() {
            let params: Vec<&[f64]> = self
                .setup
                .field_models
                .iter()
                .map(|m| m.parameters().values())
                .collect();
            tally += field_forces::run(&self.setup.field_models, &ctx, &params, particles);
        }

        report_skipped(&tally, input.time);
        Ok(StepReport {
            tally,
            table_rebuilt,
        })
    }

    /// Runs one force step on the structure-of-arrays path with marshaled parameters.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::BatchUnsupported`] if a configured model has no batch
    /// implementation.
    #[instrument(skip_all, name = "batch_step", fields(time = input.time))]
    pub fn step_batch(
        &mut self,
        input: &StepInput,
        particles: &mut ParticleBuffers,
        contacts: &mut ContactBuffers,
        bonds: &mut SolidBondBuffers,
    ) -> Result<StepReport, EngineError> {
        if let Some(model) = self.setup.first_without_batch_support() {
            return Err(EngineError::BatchUnsupported { model });
        }
        let table_rebuilt = self.ensure_table(input.temperature);
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| EngineError::Internal("interaction table missing".to_string()))?;
        let pbc = self.setup.pbc;

        particles.clear_accumulators();
        let mut tally = ForceTally::default();

        if let Some(model) = &self.setup.contact_model {
            let params = model.marshal(&pbc);
            tally += batch::contact_pass(
                model.as_ref(),
                input.time,
                input.dt,
                &params,
                table,
                particles,
                contacts,
            )?;
        }

        if let Some(model) = &self.setup.bond_model {
            let params = model.marshal(&pbc);
            tally += batch::bond_pass(model.as_ref(), input.time, input.dt, &params, particles, bonds)?;
        }

        if !self.setup.field_models.is_empty() {
            let params: Vec<BatchParameters> = self
                .setup
                .field_models
                .iter()
                .map(|m| m.marshal(&pbc))
                .collect();
            tally += batch::field_pass(
                &self.setup.field_models,
                input.time,
                input.dt,
                &params,
                particles,
            )?;
        }

        report_skipped(&tally, input.time);
        Ok(StepReport {
            tally,
            table_rebuilt,
        })
    }
}

fn check_bond_properties(index: usize, bond: &SolidBond) -> Result<(), EngineError> {
    let properties = [
        ("normal stiffness", bond.normal_stiffness),
        ("tangential stiffness", bond.tangential_stiffness),
        ("normal strength", bond.normal_strength),
        ("tangential strength", bond.tangential_strength),
        ("thermal expansion coefficient", bond.time_therm_exp_coeff),
        ("initial length", bond.initial_length),
        ("cross section", bond.cross_cut),
        ("axial moment", bond.axial_moment),
        ("diameter", bond.diameter),
    ];
    if let Some(&(property, _)) = properties.iter().find(|(_, v)| !v.is_finite()) {
        return Err(EngineError::UndefinedBondProperty {
            bond: index,
            property,
        });
    }
    // Stress measures divide by these; a zero makes the failure check unreachable.
    let geometry = &properties[5..];
    match geometry.iter().find(|(_, v)| *v <= 0.0) {
        Some(&(property, value)) => Err(EngineError::DegenerateBondGeometry {
            bond: index,
            property,
            value,
        }),
        None => Ok(()),
    }
}

fn report_skipped(tally: &ForceTally, time: f64) {
    if tally.skipped_terms > 0 {
        warn!(
            skipped = tally.skipped_terms,
            time, "Force terms skipped because interaction properties are undefined"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::materials::correlation::TpProperty;
    use crate::core::materials::database::Compound;
    use crate::core::materials::properties::PropertyType;
    use crate::core::models::bond::{BondMaterial, DEFAULT_ACTIVITY_END};
    use crate::core::models::pbc::PeriodicBoundaries;
    use crate::engine::config::{ForceSetupBuilder, ModelSelection};
    use nalgebra::Vector3;

    const TOLERANCE: f64 = 1e-9;

    fn vec_approx_equal(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
        (a - b).norm() <= TOLERANCE * a.norm().max(b.norm()).max(1e-30)
    }

    fn database() -> MaterialsDatabase {
        let mut db = MaterialsDatabase::new();
        let mut glass = Compound::new("glass", "Glass");
        for (property, value) in [
            (PropertyType::YoungModulus, 5e7),
            (PropertyType::PoissonRatio, 0.25),
            (PropertyType::SurfaceEnergy, 0.1),
            (PropertyType::ThermalConductivity, 1.0),
            (PropertyType::YieldStrength, 1e8),
            (PropertyType::NormalStrength, 1e7),
            (PropertyType::TangentialStrength, 1e7),
            (PropertyType::TimeThermExpCoeff, 1e-5),
        ] {
            glass
                .set_property(TpProperty::with_constant(property, value))
                .unwrap();
        }
        db.add_compound(glass);
        db
    }

    fn setup() -> ForceSetup {
        ForceSetupBuilder::new()
            .materials(vec!["glass".to_string()])
            .contact_model(ModelSelection::new("JKR"))
            .bond_model(ModelSelection::new("Thermal bond"))
            .field_model(ModelSelection::new("Heat transfer").with_parameter("EMISSIVITY", 0.5))
            .build()
            .unwrap()
    }

    fn scene(db: &MaterialsDatabase) -> (Vec<Particle>, ContactStore, Vec<SolidBond>) {
        let r = 1e-3;
        let particles = vec![
            Particle::new(Vector3::zeros(), r, 4e-6, 0)
                .with_velocity(Vector3::new(0.05, 0.01, 0.0))
                .with_angular_velocity(Vector3::new(0.0, 3.0, 1.0))
                .with_temperature(350.0),
            Particle::new(Vector3::new(1.99e-3, 1e-5, 0.0), r, 4e-6, 0)
                .with_velocity(Vector3::new(-0.05, 0.0, 0.02)),
            Particle::new(Vector3::new(4.1e-3, 0.0, 0.0), r, 4e-6, 0)
                .with_angular_velocity(Vector3::new(2.0, 0.0, 0.0)),
        ];
        let pbc = PeriodicBoundaries::disabled();
        let mut contacts = ContactStore::new();
        let id = contacts.open(0, 1, &particles, &pbc).unwrap();
        contacts.get_mut(id).unwrap().tang_overlap = Vector3::new(0.0, 1e-7, 2e-7);
        let material = BondMaterial::from_compound(db, "glass", 300.0, 101_325.0);
        let bonds = vec![SolidBond::new(2, 1, 5e-4, &particles, &pbc, material).unwrap()];
        (particles, contacts, bonds)
    }

    fn input(step: usize) -> StepInput {
        StepInput {
            time: step as f64 * 1e-6,
            dt: 1e-6,
            temperature: 300.0,
        }
    }

    #[test]
    fn host_and_batch_paths_agree_over_several_steps() {
        let db = database();
        let (mut particles, mut contacts, mut bonds) = scene(&db);
        let mut p_buf = ParticleBuffers::from_particles(&particles);
        let mut c_buf = ContactBuffers::from_store(&contacts);
        let mut b_buf = SolidBondBuffers::from_bonds(&bonds);

        let mut host = ForceEngine::new(&db, setup());
        let mut batched = ForceEngine::new(&db, setup());
        host.validate(&particles, &contacts, &bonds).unwrap();
        batched.validate_buffers(&p_buf, &c_buf, &b_buf).unwrap();

        for step in 1..=3 {
            let a = host
                .step_host(&input(step), &mut particles, &mut contacts, &mut bonds)
                .unwrap();
            let b = batched
                .step_batch(&input(step), &mut p_buf, &mut c_buf, &mut b_buf)
                .unwrap();
            assert_eq!(a.tally, b.tally);
        }

        for (p, q) in particles.iter().zip(p_buf.to_particles()) {
            assert!(vec_approx_equal(&p.force, &q.force));
            assert!(vec_approx_equal(&p.moment, &q.moment));
            assert!((p.heat_flux - q.heat_flux).abs() <= TOLERANCE * p.heat_flux.abs());
        }
        for (i, (_, state)) in contacts.iter().enumerate() {
            let other = c_buf.get(i);
            assert!(vec_approx_equal(&state.tang_overlap, &other.tang_overlap));
            assert!(vec_approx_equal(&state.total_force, &other.total_force));
        }
        assert_eq!(bonds, b_buf.to_bonds());
    }

    #[test]
    fn step_clears_accumulators_and_applies_newtons_third_law() {
        let db = database();
        let (mut particles, mut contacts, mut bonds) = scene(&db);
        particles[0].force = Vector3::new(1e3, 1e3, 1e3);
        let mut engine = ForceEngine::new(
            &db,
            ForceSetupBuilder::new()
                .materials(vec!["glass".to_string()])
                .contact_model(ModelSelection::new("JKR"))
                .build()
                .unwrap(),
        );
        let report = engine
            .step_host(&input(1), &mut particles, &mut contacts, &mut bonds)
            .unwrap();
        assert_eq!(report.tally.contacts, 1);
        assert!(report.table_rebuilt);
        assert!(vec_approx_equal(&particles[0].force, &-particles[1].force));
        assert_eq!(particles[2].force, Vector3::zeros());
    }

    #[test]
    fn table_is_rebuilt_only_when_temperature_changes() {
        let db = database();
        let (mut particles, mut contacts, mut bonds) = scene(&db);
        let mut engine = ForceEngine::new(&db, setup());
        let first = engine
            .step_host(&input(1), &mut particles, &mut contacts, &mut bonds)
            .unwrap();
        let second = engine
            .step_host(&input(2), &mut particles, &mut contacts, &mut bonds)
            .unwrap();
        let mut warmer = input(3);
        warmer.temperature = 320.0;
        let third = engine
            .step_host(&warmer, &mut particles, &mut contacts, &mut bonds)
            .unwrap();
        assert!(first.table_rebuilt);
        assert!(!second.table_rebuilt);
        assert!(third.table_rebuilt);
        assert_eq!(engine.interaction_table().map(|t| t.temperature()), Some(320.0));
    }

    #[test]
    fn broken_bond_stops_loading_its_particles() {
        let db = database();
        let (mut particles, mut contacts, mut bonds) = scene(&db);
        particles[2].coord.x = 8e-3;
        let mut engine = ForceEngine::new(&db, setup());
        let report = engine
            .step_host(&input(1), &mut particles, &mut contacts, &mut bonds)
            .unwrap();
        assert_eq!(report.tally.broken_bonds, 1);
        assert!(!bonds[0].active);
        assert_eq!(bonds[0].end_activity, input(1).time);
        assert_eq!(particles[2].force, Vector3::zeros());

        let again = engine
            .step_host(&input(2), &mut particles, &mut contacts, &mut bonds)
            .unwrap();
        assert_eq!(again.tally.broken_bonds, 0);
        assert_eq!(again.tally.bonds, 0);
        assert_ne!(bonds[0].end_activity, DEFAULT_ACTIVITY_END);
    }

    #[test]
    fn validate_rejects_unknown_material_and_undefined_bond() {
        let db = database();
        let (mut particles, contacts, mut bonds) = scene(&db);
        let engine = ForceEngine::new(&db, setup());

        bonds[0].normal_strength = f64::NAN;
        assert!(matches!(
            engine.validate(&particles, &contacts, &bonds),
            Err(EngineError::UndefinedBondProperty {
                bond: 0,
                property: "normal strength"
            })
        ));

        particles[1].material = 4;
        assert!(matches!(
            engine.validate(&particles, &contacts, &bonds),
            Err(EngineError::UnknownMaterial {
                particle: 1,
                material: 4,
                count: 1
            })
        ));
    }

    #[test]
    fn validate_rejects_zero_sized_bond_geometry() {
        let db = database();
        let (particles, contacts, bonds) = scene(&db);
        let engine = ForceEngine::new(&db, setup());

        let mut flat = bonds.clone();
        flat[0].diameter = 0.0;
        flat[0].cross_cut = 0.0;
        flat[0].axial_moment = 0.0;
        assert!(matches!(
            engine.validate(&particles, &contacts, &flat),
            Err(EngineError::DegenerateBondGeometry {
                bond: 0,
                property: "cross section",
                ..
            })
        ));

        let mut collapsed = bonds.clone();
        collapsed[0].initial_length = 0.0;
        let b_buf = SolidBondBuffers::from_bonds(&collapsed);
        let p_buf = ParticleBuffers::from_particles(&particles);
        let c_buf = ContactBuffers::from_store(&contacts);
        assert!(matches!(
            engine.validate_buffers(&p_buf, &c_buf, &b_buf),
            Err(EngineError::DegenerateBondGeometry {
                bond: 0,
                property: "initial length",
                ..
            })
        ));
    }

    #[test]
    fn undefined_properties_are_counted_not_fatal() {
        let mut db = database();
        let mut bare = Compound::new("bare", "Bare");
        bare.set_property(TpProperty::with_constant(PropertyType::PoissonRatio, 0.3))
            .unwrap();
        db.add_compound(bare);
        let (mut particles, mut contacts, mut bonds) = scene(&db);
        for p in &mut particles {
            p.material = 1;
        }
        let mut engine = ForceEngine::new(
            &db,
            ForceSetupBuilder::new()
                .materials(vec!["glass".to_string(), "bare".to_string()])
                .contact_model(ModelSelection::new("JKR"))
                .build()
                .unwrap(),
        );
        let report = engine
            .step_host(&input(1), &mut particles, &mut contacts, &mut bonds)
            .unwrap();
        assert!(report.tally.skipped_terms > 0);
        assert!(particles.iter().all(|p| p.force.iter().all(|v| v.is_finite())));
    }
}
