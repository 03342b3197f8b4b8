use super::ModelError;
use crate::core::models::pbc::PeriodicBoundaries;
use std::collections::HashMap;

/// Definition of one named scalar option of a force model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParameter {
    pub key: &'static str,
    pub description: &'static str,
    pub unit: &'static str,
    pub default: f64,
}

/// Ordered parameter definitions of a model instance together with their current values.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    definitions: &'static [ModelParameter],
    values: Vec<f64>,
}

impl ParameterSet {
    pub fn new(definitions: &'static [ModelParameter]) -> Self {
        Self {
            definitions,
            values: definitions.iter().map(|d| d.default).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::new(&[])
    }

    pub fn definitions(&self) -> &'static [ModelParameter] {
        self.definitions
    }

    /// Current values, in definition order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.position(key).map(|i| self.values[i])
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.definitions
            .iter()
            .position(|d| d.key.eq_ignore_ascii_case(key))
    }

    /// Sets a single parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownParameter`] for a key the model does not define and
    /// [`ModelError::InvalidParameterValue`] for a non-finite value.
    pub fn set(&mut self, model: &'static str, key: &str, value: f64) -> Result<(), ModelError> {
        let index = self
            .position(key)
            .ok_or_else(|| ModelError::UnknownParameter {
                model,
                key: key.to_string(),
            })?;
        if !value.is_finite() {
            return Err(ModelError::InvalidParameterValue {
                model,
                key: self.definitions[index].key,
                value,
            });
        }
        self.values[index] = value;
        Ok(())
    }

    /// Applies a set of named values. Either every value is applied or none is.
    pub fn configure(
        &mut self,
        model: &'static str,
        values: &HashMap<String, f64>,
    ) -> Result<(), ModelError> {
        let mut staged = self.clone();
        for (key, &value) in values {
            staged.set(model, key, value)?;
        }
        *self = staged;
        Ok(())
    }
}

/// Flat scalar buffer handed to a batched evaluation: the model parameters in definition
/// order followed by the periodic boundary block.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchParameters {
    buffer: Vec<f64>,
    model_len: usize,
}

impl BatchParameters {
    pub fn new(parameters: &ParameterSet, pbc: &PeriodicBoundaries) -> Self {
        let mut buffer = Vec::with_capacity(parameters.len() + PeriodicBoundaries::FLAT_LEN);
        buffer.extend_from_slice(parameters.values());
        buffer.extend_from_slice(&pbc.to_flat());
        Self {
            buffer,
            model_len: parameters.len(),
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.buffer
    }

    pub fn model(&self) -> &[f64] {
        &self.buffer[..self.model_len]
    }

    pub fn pbc(&self) -> Option<PeriodicBoundaries> {
        PeriodicBoundaries::from_flat(&self.buffer[self.model_len..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    static DEFINITIONS: [ModelParameter; 2] = [
        ModelParameter {
            key: "THERM_DIFF",
            description: "Temperature difference",
            unit: "K",
            default: 800.0,
        },
        ModelParameter {
            key: "MU",
            description: "Damping factor",
            unit: "-",
            default: 1.0,
        },
    ];

    #[test]
    fn new_set_starts_from_defaults() {
        let set = ParameterSet::new(&DEFINITIONS);
        assert_eq!(set.values(), &[800.0, 1.0]);
        assert_eq!(set.value("mu"), Some(1.0));
        assert_eq!(set.value("missing"), None);
    }

    #[test]
    fn configure_applies_known_values() {
        let mut set = ParameterSet::new(&DEFINITIONS);
        let values = HashMap::from([("MU".to_string(), 0.5)]);
        set.configure("Test", &values).unwrap();
        assert_eq!(set.values(), &[800.0, 0.5]);
    }

    #[test]
    fn configure_rejects_unknown_key_without_partial_update() {
        let mut set = ParameterSet::new(&DEFINITIONS);
        let values = HashMap::from([("MU".to_string(), 0.5), ("ALPHA".to_string(), 1.0)]);
        let err = set.configure("Test", &values).unwrap_err();
        assert_eq!(
            err,
            ModelError::UnknownParameter {
                model: "Test",
                key: "ALPHA".to_string()
            }
        );
        assert_eq!(set.values(), &[800.0, 1.0]);
    }

    #[test]
    fn set_rejects_non_finite_values() {
        let mut set = ParameterSet::new(&DEFINITIONS);
        assert!(matches!(
            set.set("Test", "THERM_DIFF", f64::NAN),
            Err(ModelError::InvalidParameterValue { key: "THERM_DIFF", .. })
        ));
    }

    #[test]
    fn batch_parameters_append_boundary_block() {
        let set = ParameterSet::new(&DEFINITIONS);
        let pbc = PeriodicBoundaries::new(
            [true, false, true],
            Vector3::zeros(),
            Vector3::new(1.0, 2.0, 3.0),
        );
        let batch = BatchParameters::new(&set, &pbc);
        assert_eq!(batch.as_slice().len(), 2 + PeriodicBoundaries::FLAT_LEN);
        assert_eq!(batch.model(), &[800.0, 1.0]);
        assert_eq!(batch.pbc(), Some(pbc));
    }
}
