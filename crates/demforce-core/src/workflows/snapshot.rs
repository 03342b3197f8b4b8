use crate::core::materials::database::MaterialsDatabase;
use crate::core::materials::properties::NORMAL_PRESSURE;
use crate::core::models::bond::{BondMaterial, SolidBond, SolidBondBuffers};
use crate::core::models::contact::{ContactBuffers, ContactState, ContactStore};
use crate::core::models::particle::{Particle, ParticleBuffers};
use crate::core::models::pbc::PeriodicBoundaries;
use crate::core::models::PairError;
use crate::engine::config::{ConfigError, ForceSetup, ForceSetupBuilder, ModelSelection};
use crate::engine::context::{ForceEngine, StepInput, StepReport};
use crate::engine::error::EngineError;
use nalgebra::Vector3;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Snapshot refers to material '{0}', which is not in its material list")]
    UnknownMaterial(String),
    #[error("Snapshot must run at least one step")]
    NoSteps,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pair(#[from] PairError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

fn default_steps() -> usize {
    1
}

fn default_temperature() -> f64 {
    crate::core::materials::properties::NORMAL_TEMPERATURE
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModelEntry {
    pub name: String,
    #[serde(default)]
    pub parameters: HashMap<String, f64>,
}

impl From<&ModelEntry> for ModelSelection {
    fn from(entry: &ModelEntry) -> Self {
        ModelSelection {
            name: entry.name.clone(),
            parameters: entry.parameters.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PeriodicEntry {
    pub enabled: [bool; 3],
    pub lower: [f64; 3],
    pub upper: [f64; 3],
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ParticleEntry {
    pub coord: [f64; 3],
    #[serde(default)]
    pub vel: [f64; 3],
    #[serde(default)]
    pub ang_vel: [f64; 3],
    pub radius: f64,
    pub mass: f64,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    pub material: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ContactEntry {
    pub src: usize,
    pub dst: usize,
    #[serde(default)]
    pub tang_overlap: [f64; 3],
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BondEntry {
    pub left: usize,
    pub right: usize,
    pub diameter: f64,
    pub material: String,
}

/// A described particle configuration together with the models that act on it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    #[serde(default)]
    pub time: f64,
    pub dt: f64,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_steps")]
    pub steps: usize,
    /// Compound keys; particle and bond entries refer to these by key.
    pub materials: Vec<String>,
    pub pbc: Option<PeriodicEntry>,
    pub contact_model: Option<ModelEntry>,
    pub bond_model: Option<ModelEntry>,
    #[serde(default)]
    pub field_models: Vec<ModelEntry>,
    #[serde(default)]
    pub particles: Vec<ParticleEntry>,
    #[serde(default)]
    pub contacts: Vec<ContactEntry>,
    #[serde(default)]
    pub bonds: Vec<BondEntry>,
}

/// Particles, contacts and bonds built from a [`Snapshot`].
#[derive(Debug, Clone)]
pub struct Scene {
    pub particles: Vec<Particle>,
    pub contacts: ContactStore,
    pub bonds: Vec<SolidBond>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPath {
    Host,
    Batch,
}

/// State after the last evaluated step.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub particles: Vec<Particle>,
    pub contacts: Vec<ContactState>,
    pub bonds: Vec<SolidBond>,
    pub reports: Vec<StepReport>,
}

/// Largest relative differences between a host and a batch evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Comparison {
    pub max_force_diff: f64,
    pub max_moment_diff: f64,
    pub max_heat_flux_diff: f64,
    pub tallies_match: bool,
}

impl Comparison {
    pub fn max_diff(&self) -> f64 {
        self.max_force_diff
            .max(self.max_moment_diff)
            .max(self.max_heat_flux_diff)
    }

    pub fn agrees(&self, tolerance: f64) -> bool {
        self.tallies_match && self.max_diff() <= tolerance
    }
}

fn to_vector(v: [f64; 3]) -> Vector3<f64> {
    Vector3::new(v[0], v[1], v[2])
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| SnapshotError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| SnapshotError::Toml {
            path: path_str,
            source: e,
        })
    }

    pub fn periodic_boundaries(&self) -> PeriodicBoundaries {
        self.pbc.as_ref().map_or_else(PeriodicBoundaries::disabled, |p| {
            PeriodicBoundaries::new(p.enabled, to_vector(p.lower), to_vector(p.upper))
        })
    }

    fn material_index(&self, key: &str) -> Result<usize, SnapshotError> {
        self.materials
            .iter()
            .position(|m| m == key)
            .ok_or_else(|| SnapshotError::UnknownMaterial(key.to_string()))
    }

    pub fn setup(&self) -> Result<ForceSetup, ConfigError> {
        let mut builder = ForceSetupBuilder::new()
            .materials(self.materials.clone())
            .pbc(self.periodic_boundaries());
        if let Some(entry) = &self.contact_model {
            builder = builder.contact_model(entry.into());
        }
        if let Some(entry) = &self.bond_model {
            builder = builder.bond_model(entry.into());
        }
        for entry in &self.field_models {
            builder = builder.field_model(entry.into());
        }
        builder.build()
    }

    /// Builds the particle records, opens the listed contacts and creates the listed bonds.
    ///
    /// Bond materials are evaluated at the snapshot temperature and normal pressure.
    pub fn build(&self, db: &MaterialsDatabase) -> Result<Scene, SnapshotError> {
        let pbc = self.periodic_boundaries();
        let particles = self
            .particles
            .iter()
            .map(|p| {
                let material = self.material_index(&p.material)?;
                Ok(
                    Particle::new(to_vector(p.coord), p.radius, p.mass, material)
                        .with_velocity(to_vector(p.vel))
                        .with_angular_velocity(to_vector(p.ang_vel))
                        .with_temperature(p.temperature),
                )
            })
            .collect::<Result<Vec<_>, SnapshotError>>()?;

        let mut contacts = ContactStore::new();
        for entry in &self.contacts {
            let id = contacts.open(entry.src, entry.dst, &particles, &pbc)?;
            if let Some(state) = contacts.get_mut(id) {
                state.tang_overlap = to_vector(entry.tang_overlap);
            }
        }

        let bonds = self
            .bonds
            .iter()
            .map(|b| {
                self.material_index(&b.material)?;
                let material =
                    BondMaterial::from_compound(db, &b.material, self.temperature, NORMAL_PRESSURE);
                Ok(SolidBond::new(
                    b.left, b.right, b.diameter, &particles, &pbc, material,
                )?)
            })
            .collect::<Result<Vec<_>, SnapshotError>>()?;

        Ok(Scene {
            particles,
            contacts,
            bonds,
        })
    }

    fn step_input(&self, step: usize) -> StepInput {
        StepInput {
            time: self.time + step as f64 * self.dt,
            dt: self.dt,
            temperature: self.temperature,
        }
    }
}

/// Runs the snapshot's steps on one execution path.
#[instrument(skip_all, name = "snapshot_evaluation", fields(path = ?path))]
pub fn evaluate(
    snapshot: &Snapshot,
    db: &MaterialsDatabase,
    path: ExecutionPath,
) -> Result<Evaluation, SnapshotError> {
    if snapshot.steps == 0 {
        return Err(SnapshotError::NoSteps);
    }
    let Scene {
        mut particles,
        mut contacts,
        mut bonds,
    } = snapshot.build(db)?;
    let mut engine = ForceEngine::new(db, snapshot.setup()?);
    info!(
        particles = particles.len(),
        contacts = contacts.len(),
        bonds = bonds.len(),
        steps = snapshot.steps,
        "Evaluating snapshot"
    );

    let mut reports = Vec::with_capacity(snapshot.steps);
    match path {
        ExecutionPath::Host => {
            engine.validate(&particles, &contacts, &bonds)?;
            for step in 1..=snapshot.steps {
                let input = snapshot.step_input(step);
                reports.push(engine.step_host(&input, &mut particles, &mut contacts, &mut bonds)?);
            }
        }
        ExecutionPath::Batch => {
            let mut p_buf = ParticleBuffers::from_particles(&particles);
            let mut c_buf = ContactBuffers::from_store(&contacts);
            let mut b_buf = SolidBondBuffers::from_bonds(&bonds);
            engine.validate_buffers(&p_buf, &c_buf, &b_buf)?;
            for step in 1..=snapshot.steps {
                let input = snapshot.step_input(step);
                reports.push(engine.step_batch(&input, &mut p_buf, &mut c_buf, &mut b_buf)?);
            }
            particles = p_buf.to_particles();
            c_buf.write_back(&mut contacts);
            bonds = b_buf.to_bonds();
        }
    }

    Ok(Evaluation {
        particles,
        contacts: contacts.iter().map(|(_, state)| *state).collect(),
        bonds,
        reports,
    })
}

fn relative_diff(a: f64, b: f64) -> f64 {
    let scale = a.abs().max(b.abs());
    if scale == 0.0 { 0.0 } else { (a - b).abs() / scale }
}

fn relative_vec_diff(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let scale = a.norm().max(b.norm());
    if scale == 0.0 { 0.0 } else { (a - b).norm() / scale }
}

/// Evaluates the snapshot on both paths and reports how far apart the particle loads are.
pub fn compare(
    snapshot: &Snapshot,
    db: &MaterialsDatabase,
) -> Result<(Comparison, Evaluation, Evaluation), SnapshotError> {
    let host = evaluate(snapshot, db, ExecutionPath::Host)?;
    let batch = evaluate(snapshot, db, ExecutionPath::Batch)?;

    let comparison = host.particles.iter().zip(&batch.particles).fold(
        Comparison {
            tallies_match: host
                .reports
                .iter()
                .zip(&batch.reports)
                .all(|(a, b)| a.tally == b.tally),
            ..Comparison::default()
        },
        |acc, (a, b)| Comparison {
            max_force_diff: acc.max_force_diff.max(relative_vec_diff(&a.force, &b.force)),
            max_moment_diff: acc
                .max_moment_diff
                .max(relative_vec_diff(&a.moment, &b.moment)),
            max_heat_flux_diff: acc
                .max_heat_flux_diff
                .max(relative_diff(a.heat_flux, b.heat_flux)),
            ..acc
        },
    );
    Ok((comparison, host, batch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::materials::correlation::TpProperty;
    use crate::core::materials::database::Compound;
    use crate::core::materials::properties::PropertyType;
    use std::fs;
    use tempfile::tempdir;

    const SNAPSHOT_TOML: &str = r#"
        dt = 1e-6
        temperature = 300.0
        steps = 2
        materials = ["glass"]

        [contact_model]
        name = "JKR"

        [bond_model]
        name = "Thermal bond"
        parameters = { MU = 0.5 }

        [[field_models]]
        name = "Heat transfer"
        parameters = { EMISSIVITY = 0.8 }

        [[particles]]
        coord = [0.0, 0.0, 0.0]
        vel = [0.05, 0.0, 0.01]
        ang_vel = [0.0, 2.0, 0.0]
        radius = 1e-3
        mass = 4e-6
        temperature = 350.0
        material = "glass"

        [[particles]]
        coord = [1.99e-3, 1e-5, 0.0]
        radius = 1e-3
        mass = 4e-6
        material = "glass"

        [[particles]]
        coord = [4.1e-3, 0.0, 0.0]
        vel = [0.01, 0.0, 0.0]
        radius = 1e-3
        mass = 4e-6
        material = "glass"

        [[contacts]]
        src = 0
        dst = 1
        tang_overlap = [0.0, 1e-7, 0.0]

        [[bonds]]
        left = 2
        right = 1
        diameter = 5e-4
        material = "glass"
    "#;

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

    fn snapshot() -> Snapshot {
        toml::from_str(SNAPSHOT_TOML).unwrap()
    }

    #[test]
    fn load_reads_snapshot_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.toml");
        fs::write(&path, SNAPSHOT_TOML).unwrap();
        let loaded = Snapshot::load(&path).unwrap();
        assert_eq!(loaded, snapshot());
        assert_eq!(loaded.time, 0.0);
        assert_eq!(loaded.particles[1].vel, [0.0; 3]);
        assert_eq!(loaded.particles[1].temperature, default_temperature());
        assert_eq!(loaded.periodic_boundaries(), PeriodicBoundaries::disabled());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempdir().unwrap();
        let err = Snapshot::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }

    #[test]
    fn build_resolves_materials_contacts_and_bonds() {
        let scene = snapshot().build(&database()).unwrap();
        assert_eq!(scene.particles.len(), 3);
        assert_eq!(scene.contacts.len(), 1);
        let id = scene.contacts.find(0, 1).unwrap();
        assert_eq!(
            scene.contacts.get(id).unwrap().tang_overlap,
            Vector3::new(0.0, 1e-7, 0.0)
        );
        assert_eq!(scene.bonds.len(), 1);
        assert_eq!(scene.bonds[0].normal_stiffness, 5e7);
    }

    #[test]
    fn build_rejects_unknown_material() {
        let mut snapshot = snapshot();
        snapshot.particles[2].material = "steel".to_string();
        assert!(matches!(
            snapshot.build(&database()),
            Err(SnapshotError::UnknownMaterial(key)) if key == "steel"
        ));
    }

    #[test]
    fn build_rejects_contact_with_missing_particle() {
        let mut snapshot = snapshot();
        snapshot.contacts[0].dst = 7;
        assert!(matches!(
            snapshot.build(&database()),
            Err(SnapshotError::Pair(PairError::ParticleOutOfRange { index: 7, count: 3 }))
        ));
    }

    #[test]
    fn evaluate_runs_every_step() {
        let evaluation = evaluate(&snapshot(), &database(), ExecutionPath::Host).unwrap();
        assert_eq!(evaluation.reports.len(), 2);
        assert!(evaluation.reports[0].table_rebuilt);
        assert!(!evaluation.reports[1].table_rebuilt);
        assert_eq!(evaluation.reports[1].tally.contacts, 1);
        assert_eq!(evaluation.reports[1].tally.bonds, 1);
        assert_eq!(evaluation.reports[1].tally.field_particles, 3);
        // The hot particle radiates to the colder environment.
        assert!(evaluation.particles[0].heat_flux < 0.0);
    }

    #[test]
    fn evaluate_rejects_zero_steps() {
        let mut snapshot = snapshot();
        snapshot.steps = 0;
        assert!(matches!(
            evaluate(&snapshot, &database(), ExecutionPath::Batch),
            Err(SnapshotError::NoSteps)
        ));
    }

    #[test]
    fn compare_finds_host_and_batch_in_agreement() {
        let (comparison, host, batch) = compare(&snapshot(), &database()).unwrap();
        assert!(comparison.tallies_match);
        assert!(comparison.agrees(1e-9), "{comparison:?}");
        assert_eq!(host.bonds, batch.bonds);
        assert_eq!(host.contacts.len(), batch.contacts.len());
    }
}
