use super::ModelError;
use super::heat_transfer::{self, HeatTransferModel};
use super::hertz_mindlin::{self, HertzMindlinModel};
use super::jkr::{self, JkrModel};
use super::parameters::ParameterSet;
use super::thermal_bond::{self, ThermalBondModel};
use super::traits::{BondModel, ContactModel, FieldModel, Model, ModelDescriptor, ModelFamily};
use phf::{Map, phf_map};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelKind {
    Jkr,
    HertzMindlin,
    ThermalBond,
    HeatTransfer,
}

static MODELS_BY_KEY: Map<&'static str, ModelKind> = phf_map! {
    "8AC39F3E9D054A548CEB9CD44ACFE751" => ModelKind::Jkr,
    "B18A46C2786D4D44B925A8A04D0D1098" => ModelKind::HertzMindlin,
    "0CA458A6CCEF45C09BECD0D49306B86D" => ModelKind::ThermalBond,
    "E2F7C3D1A9B84C6F8D5E4A3B2C1D0E9F" => ModelKind::HeatTransfer,
};

impl ModelKind {
    const ALL: [ModelKind; 4] = [
        ModelKind::Jkr,
        ModelKind::HertzMindlin,
        ModelKind::ThermalBond,
        ModelKind::HeatTransfer,
    ];

    fn descriptor(self) -> &'static ModelDescriptor {
        match self {
            ModelKind::Jkr => &jkr::DESCRIPTOR,
            ModelKind::HertzMindlin => &hertz_mindlin::DESCRIPTOR,
            ModelKind::ThermalBond => &thermal_bond::DESCRIPTOR,
            ModelKind::HeatTransfer => &heat_transfer::DESCRIPTOR,
        }
    }

    fn instantiate(self) -> RegisteredModel {
        match self {
            ModelKind::Jkr => RegisteredModel::Contact(Box::new(JkrModel::new())),
            ModelKind::HertzMindlin => RegisteredModel::Contact(Box::new(HertzMindlinModel::new())),
            ModelKind::ThermalBond => RegisteredModel::Bond(Box::new(ThermalBondModel::new())),
            ModelKind::HeatTransfer => RegisteredModel::Field(Box::new(HeatTransferModel::new())),
        }
    }
}

/// A freshly constructed model, sorted by family.
#[derive(Debug)]
pub enum RegisteredModel {
    Contact(Box<dyn ContactModel>),
    Bond(Box<dyn BondModel>),
    Field(Box<dyn FieldModel>),
}

impl RegisteredModel {
    pub fn family(&self) -> ModelFamily {
        match self {
            RegisteredModel::Contact(_) => ModelFamily::ParticleParticle,
            RegisteredModel::Bond(_) => ModelFamily::SolidBond,
            RegisteredModel::Field(_) => ModelFamily::ExternalField,
        }
    }

    pub fn descriptor(&self) -> &'static ModelDescriptor {
        match self {
            RegisteredModel::Contact(m) => m.descriptor(),
            RegisteredModel::Bond(m) => m.descriptor(),
            RegisteredModel::Field(m) => m.descriptor(),
        }
    }

    pub fn parameters(&self) -> &ParameterSet {
        match self {
            RegisteredModel::Contact(m) => m.parameters(),
            RegisteredModel::Bond(m) => m.parameters(),
            RegisteredModel::Field(m) => m.parameters(),
        }
    }

    pub fn into_contact(self) -> Result<Box<dyn ContactModel>, ModelError> {
        match self {
            RegisteredModel::Contact(m) => Ok(m),
            other => Err(other.wrong_family(ModelFamily::ParticleParticle)),
        }
    }

    pub fn into_bond(self) -> Result<Box<dyn BondModel>, ModelError> {
        match self {
            RegisteredModel::Bond(m) => Ok(m),
            other => Err(other.wrong_family(ModelFamily::SolidBond)),
        }
    }

    pub fn into_field(self) -> Result<Box<dyn FieldModel>, ModelError> {
        match self {
            RegisteredModel::Field(m) => Ok(m),
            other => Err(other.wrong_family(ModelFamily::ExternalField)),
        }
    }

    fn wrong_family(&self, expected: ModelFamily) -> ModelError {
        ModelError::WrongFamily {
            name: self.descriptor().name,
            expected: expected.label(),
            actual: self.family().label(),
        }
    }
}

fn find(name_or_key: &str) -> Option<ModelKind> {
    let query = name_or_key.trim();
    MODELS_BY_KEY
        .get(query.to_ascii_uppercase().as_str())
        .copied()
        .or_else(|| {
            ModelKind::ALL
                .into_iter()
                .find(|kind| kind.descriptor().name.eq_ignore_ascii_case(query))
        })
}

/// Descriptors of every available model.
pub fn catalogue() -> impl Iterator<Item = &'static ModelDescriptor> {
    ModelKind::ALL.into_iter().map(ModelKind::descriptor)
}

pub fn descriptor(name_or_key: &str) -> Option<&'static ModelDescriptor> {
    find(name_or_key).map(ModelKind::descriptor)
}

/// Constructs a model by display name (case-insensitive) or unique key, with default
/// parameters.
pub fn create(name_or_key: &str) -> Result<RegisteredModel, ModelError> {
    find(name_or_key)
        .map(ModelKind::instantiate)
        .ok_or_else(|| ModelError::UnknownModel(name_or_key.to_string()))
}
