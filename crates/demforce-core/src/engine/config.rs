use crate::core::forces::ModelError;
use crate::core::forces::registry;
use crate::core::forces::traits::{BondModel, ContactModel, FieldModel, Model};
use crate::core::models::pbc::PeriodicBoundaries;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid model configuration: {0}")]
    Model(#[from] ModelError),
}

/// A model chosen by name or unique key, with parameter overrides.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelSelection {
    pub name: String,
    pub parameters: HashMap<String, f64>,
}

impl ModelSelection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: HashMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

/// Configured models and run-wide settings of a force computation.
#[derive(Debug)]
pub struct ForceSetup {
    pub contact_model: Option<Box<dyn ContactModel>>,
    pub bond_model: Option<Box<dyn BondModel>>,
    pub field_models: Vec<Box<dyn FieldModel>>,
    /// Compound keys; particle `material` fields index into this list.
    pub materials: Vec<String>,
    pub pbc: PeriodicBoundaries,
}

impl ForceSetup {
    /// Name of the first configured model that cannot run on the batch path, if any.
    pub fn first_without_batch_support(&self) -> Option<&'static str> {
        let contact = self.contact_model.iter().map(|m| (m.name(), m.has_batch_support()));
        let bond = self.bond_model.iter().map(|m| (m.name(), m.has_batch_support()));
        let fields = self
            .field_models
            .iter()
            .map(|m| (m.name(), m.has_batch_support()));
        contact
            .chain(bond)
            .chain(fields)
            .find(|(_, supported)| !supported)
            .map(|(name, _)| name)
    }

    pub fn model_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        names.extend(self.contact_model.iter().map(|m| m.name()));
        names.extend(self.bond_model.iter().map(|m| m.name()));
        names.extend(self.field_models.iter().map(|m| m.name()));
        names
    }
}

#[derive(Default)]
pub struct ForceSetupBuilder {
    contact_model: Option<ModelSelection>,
    bond_model: Option<ModelSelection>,
    field_models: Vec<ModelSelection>,
    materials: Option<Vec<String>>,
    pbc: Option<PeriodicBoundaries>,
}

impl ForceSetupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contact_model(mut self, selection: ModelSelection) -> Self {
        self.contact_model = Some(selection);
        self
    }
    pub fn bond_model(mut self, selection: ModelSelection) -> Self {
        self.bond_model = Some(selection);
        self
    }
    pub fn field_model(mut self, selection: ModelSelection) -> Self {
        self.field_models.push(selection);
        self
    }
    pub fn materials(mut self, materials: Vec<String>) -> Self {
        self.materials = Some(materials);
        self
    }
    pub fn pbc(mut self, pbc: PeriodicBoundaries) -> Self {
        self.pbc = Some(pbc);
        self
    }

    /// Instantiates and configures every selected model.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingParameter`] when no material list or no model was given,
    /// and [`ConfigError::Model`] for unknown models, models of the wrong family and rejected
    /// parameter values.
    pub fn build(self) -> Result<ForceSetup, ConfigError> {
        let materials = self
            .materials
            .ok_or(ConfigError::MissingParameter("materials"))?;
        if self.contact_model.is_none() && self.bond_model.is_none() && self.field_models.is_empty()
        {
            return Err(ConfigError::MissingParameter("model"));
        }

        let contact_model = self
            .contact_model
            .map(|s| {
                let mut model = registry::create(&s.name)?.into_contact()?;
                model.configure(&s.parameters)?;
                Ok::<_, ModelError>(model)
            })
            .transpose()?;
        let bond_model = self
            .bond_model
            .map(|s| {
                let mut model = registry::create(&s.name)?.into_bond()?;
                model.configure(&s.parameters)?;
                Ok::<_, ModelError>(model)
            })
            .transpose()?;
        let field_models = self
            .field_models
            .into_iter()
            .map(|s| {
                let mut model = registry::create(&s.name)?.into_field()?;
                model.configure(&s.parameters)?;
                Ok(model)
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        Ok(ForceSetup {
            contact_model,
            bond_model,
            field_models,
            materials,
            pbc: self.pbc.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn materials() -> Vec<String> {
        vec!["glass".to_string()]
    }

    #[test]
    fn build_configures_selected_models() {
        let setup = ForceSetupBuilder::new()
            .materials(materials())
            .contact_model(ModelSelection::new("jkr"))
            .bond_model(ModelSelection::new("Thermal bond").with_parameter("MU", 0.25))
            .field_model(ModelSelection::new("Heat transfer"))
            .build()
            .unwrap();
        assert_eq!(setup.model_names(), vec!["JKR", "Thermal bond", "Heat transfer"]);
        assert_eq!(
            setup.bond_model.as_ref().unwrap().parameters().value("MU"),
            Some(0.25)
        );
        assert_eq!(setup.pbc, PeriodicBoundaries::disabled());
        assert_eq!(setup.first_without_batch_support(), None);
    }

    #[test]
    fn build_fails_without_materials() {
        let result = ForceSetupBuilder::new()
            .contact_model(ModelSelection::new("JKR"))
            .build();
        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingParameter("materials")
        );
    }

    #[test]
    fn build_fails_without_any_model() {
        let result = ForceSetupBuilder::new().materials(materials()).build();
        assert_eq!(result.unwrap_err(), ConfigError::MissingParameter("model"));
    }

    #[test]
    fn build_rejects_unknown_parameters() {
        let result = ForceSetupBuilder::new()
            .materials(materials())
            .bond_model(ModelSelection::new("Thermal bond").with_parameter("GAMMA", 1.0))
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::Model(ModelError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn build_rejects_model_in_wrong_slot() {
        let result = ForceSetupBuilder::new()
            .materials(materials())
            .contact_model(ModelSelection::new("Thermal bond"))
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::Model(ModelError::WrongFamily { .. })
        ));
    }
}
