use super::correlation::{
    Correlation, CorrelationKind, CorrelationType, Interval, MaterialError, TpProperty,
};
use super::properties::{PropertyScope, PropertyType};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum MaterialLoadError {
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
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid material data in '{path}': {source}")]
    Material {
        path: String,
        source: MaterialError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    key: String,
    pub name: String,
    properties: HashMap<PropertyType, TpProperty>,
}

impl Compound {
    pub fn new(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            properties: HashMap::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set_property(&mut self, property: TpProperty) -> Result<(), MaterialError> {
        if property.property().scope() == PropertyScope::Interaction {
            return Err(MaterialError::MisplacedProperty {
                property: property.property().name(),
                target: "a compound",
            });
        }
        self.properties.insert(property.property(), property);
        Ok(())
    }

    pub fn property(&self, property: PropertyType) -> Option<&TpProperty> {
        self.properties.get(&property)
    }

    /// Value of a property at (T, P); NaN if the property is absent or undefined there.
    #[inline]
    pub fn property_value(&self, property: PropertyType, t: f64, p: f64) -> f64 {
        self.properties
            .get(&property)
            .map_or(f64::NAN, |prop| prop.value(t, p))
    }
}

/// Explicit properties of one unordered pair of compounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    compounds: (String, String),
    properties: HashMap<PropertyType, TpProperty>,
}

impl Interaction {
    pub fn new(compound_a: &str, compound_b: &str) -> Self {
        Self {
            compounds: pair_key(compound_a, compound_b),
            properties: HashMap::new(),
        }
    }

    pub fn compounds(&self) -> (&str, &str) {
        (&self.compounds.0, &self.compounds.1)
    }

    pub fn set_property(&mut self, property: TpProperty) -> Result<(), MaterialError> {
        if property.property().scope() != PropertyScope::Interaction {
            return Err(MaterialError::MisplacedProperty {
                property: property.property().name(),
                target: "an interaction",
            });
        }
        self.properties.insert(property.property(), property);
        Ok(())
    }

    pub fn property_mut(&mut self, property: PropertyType) -> &mut TpProperty {
        self.properties
            .entry(property)
            .or_insert_with(|| TpProperty::new(property))
    }

    pub fn property(&self, property: PropertyType) -> Option<&TpProperty> {
        self.properties.get(&property)
    }
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Read-only store of compounds and pairwise interactions for a simulation run.
#[derive(Debug, Clone, Default)]
pub struct MaterialsDatabase {
    compounds: HashMap<String, Compound>,
    interactions: HashMap<(String, String), Interaction>,
}

impl MaterialsDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_compound(&mut self, compound: Compound) {
        self.compounds.insert(compound.key.clone(), compound);
    }

    pub fn compound(&self, key: &str) -> Option<&Compound> {
        self.compounds.get(key)
    }

    pub fn compound_mut(&mut self, key: &str) -> Option<&mut Compound> {
        self.compounds.get_mut(key)
    }

    pub fn compound_keys(&self) -> impl Iterator<Item = &str> {
        self.compounds.keys().map(String::as_str)
    }

    pub fn add_interaction(&mut self, interaction: Interaction) {
        self.interactions
            .insert(interaction.compounds.clone(), interaction);
    }

    pub fn interaction(&self, a: &str, b: &str) -> Option<&Interaction> {
        self.interactions.get(&pair_key(a, b))
    }

    fn interaction_entry(&mut self, a: &str, b: &str) -> &mut Interaction {
        self.interactions
            .entry(pair_key(a, b))
            .or_insert_with(|| Interaction::new(a, b))
    }

    /// Evaluates a compound property; unknown compounds and missing properties yield NaN.
    #[inline]
    pub fn property_value(&self, compound: &str, property: PropertyType, t: f64, p: f64) -> f64 {
        self.compounds
            .get(compound)
            .map_or(f64::NAN, |c| c.property_value(property, t, p))
    }

    /// Evaluates an interaction property from the explicit pair entry, falling back to the
    /// property default when the pair has no entry for it.
    #[inline]
    pub fn interaction_value(
        &self,
        a: &str,
        b: &str,
        property: PropertyType,
        t: f64,
        p: f64,
    ) -> f64 {
        self.interaction(a, b)
            .and_then(|i| i.property(property))
            .map_or(property.default_value(), |prop| prop.value(t, p))
    }

    pub fn load(
        compounds_path: &Path,
        interactions_path: Option<&Path>,
    ) -> Result<Self, MaterialLoadError> {
        let mut db = Self::load_compounds(compounds_path)?;
        if let Some(path) = interactions_path {
            db.load_interactions_csv(path)?;
        }
        Ok(db)
    }

    pub fn load_compounds(path: &Path) -> Result<Self, MaterialLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| MaterialLoadError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let file: CompoundsFile = toml::from_str(&content).map_err(|e| MaterialLoadError::Toml {
            path: path_str.clone(),
            source: e,
        })?;
        let mut db = Self::new();
        for (key, record) in file.compounds {
            let compound = record
                .into_compound(&key)
                .map_err(|e| MaterialLoadError::Material {
                    path: path_str.clone(),
                    source: e,
                })?;
            debug!("Loaded compound '{}' ({})", key, compound.name);
            db.add_compound(compound);
        }
        Ok(db)
    }

    pub fn load_interactions_csv(&mut self, path: &Path) -> Result<(), MaterialLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let mut reader = csv::Reader::from_path(path).map_err(|e| MaterialLoadError::Csv {
            path: path_str.clone(),
            source: e,
        })?;

        for result in reader.deserialize::<InteractionRecord>() {
            let record = result.map_err(|e| MaterialLoadError::Csv {
                path: path_str.clone(),
                source: e,
            })?;
            let to_load_error = |e| MaterialLoadError::Material {
                path: path_str.clone(),
                source: e,
            };
            let property = PropertyType::from_key(&record.property)
                .ok_or_else(|| MaterialError::UnknownProperty(record.property.clone()))
                .map_err(to_load_error)?;
            if property.scope() != PropertyScope::Interaction {
                return Err(to_load_error(MaterialError::MisplacedProperty {
                    property: property.name(),
                    target: "an interaction",
                }));
            }
            let correlation = record.correlation().map_err(to_load_error)?;
            self.interaction_entry(&record.compound_a, &record.compound_b)
                .property_mut(property)
                .add_correlation(correlation)
                .map_err(to_load_error)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CompoundsFile {
    #[serde(default)]
    compounds: BTreeMap<String, CompoundRecord>,
}

#[derive(Debug, Deserialize)]
struct CompoundRecord {
    name: Option<String>,
    #[serde(flatten)]
    properties: BTreeMap<String, PropertyEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PropertyEntry {
    Constant(f64),
    Correlations(Vec<CorrelationRecord>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CorrelationRecord {
    temperature: Option<[f64; 2]>,
    pressure: Option<[f64; 2]>,
    kind: CorrelationType,
    coefficients: Vec<f64>,
}

impl CorrelationRecord {
    fn into_correlation(self) -> Result<Correlation, MaterialError> {
        let temperature = match self.temperature {
            Some([min, max]) => Interval::new(min, max)?,
            None => Interval::default_temperature(),
        };
        let pressure = match self.pressure {
            Some([min, max]) => Interval::new(min, max)?,
            None => Interval::default_pressure(),
        };
        let kind = CorrelationKind::from_coefficients(self.kind, &self.coefficients)?;
        Ok(Correlation::new(temperature, pressure, kind))
    }
}

impl CompoundRecord {
    fn into_compound(self, key: &str) -> Result<Compound, MaterialError> {
        let mut compound = Compound::new(key, self.name.as_deref().unwrap_or(key));
        for (property_key, entry) in self.properties {
            let property = PropertyType::from_key(&property_key)
                .ok_or(MaterialError::UnknownProperty(property_key))?;
            let tp = match entry {
                PropertyEntry::Constant(value) => TpProperty::with_constant(property, value),
                PropertyEntry::Correlations(records) => {
                    let mut tp = TpProperty::new(property);
                    for record in records {
                        tp.add_correlation(record.into_correlation()?)?;
                    }
                    tp
                }
            };
            compound.set_property(tp)?;
        }
        Ok(compound)
    }
}

#[derive(Debug, Deserialize)]
struct InteractionRecord {
    compound_a: String,
    compound_b: String,
    property: String,
    t_min: f64,
    t_max: f64,
    p_min: f64,
    p_max: f64,
    kind: CorrelationType,
    k0: f64,
    k1: Option<f64>,
    k2: Option<f64>,
}

impl InteractionRecord {
    fn correlation(&self) -> Result<Correlation, MaterialError> {
        let coefficients: Vec<f64> = [Some(self.k0), self.k1, self.k2]
            .into_iter()
            .flatten()
            .collect();
        let count = self.kind.coefficient_count();
        let kind = CorrelationKind::from_coefficients(
            self.kind,
            &coefficients[..count.min(coefficients.len())],
        )?;
        Ok(Correlation::new(
            Interval::new(self.t_min, self.t_max)?,
            Interval::new(self.p_min, self.p_max)?,
            kind,
        ))
    }
}
