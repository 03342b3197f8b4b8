use super::resolver::{InteractionProperties, InteractionResolver};
use crate::core::materials::database::MaterialsDatabase;
use tracing::debug;

/// Symmetric matrix of resolved interaction properties for the materials of one run,
/// evaluated at a single temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionTable {
    temperature: f64,
    size: usize,
    entries: Vec<InteractionProperties>,
}

impl InteractionTable {
    /// Resolves every pair of `materials` at temperature `t`.
    ///
    /// Material `i` of the table is `materials[i]`, the same index particles carry in their
    /// `material` field.
    pub fn build(db: &MaterialsDatabase, materials: &[String], t: f64) -> Self {
        let resolver = InteractionResolver::new(db);
        let size = materials.len();
        let mut entries = vec![InteractionProperties::undefined(); size * size];
        for i in 0..size {
            for j in i..size {
                let props = resolver.resolve(&materials[i], &materials[j], t);
                entries[i * size + j] = props;
                entries[j * size + i] = props;
            }
        }
        let undefined = entries.iter().filter(|p| !p.is_fully_defined()).count();
        debug!(
            materials = size,
            temperature = t,
            undefined_pairs = undefined,
            "Built interaction table"
        );
        Self {
            temperature: t,
            size,
            entries,
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<&InteractionProperties> {
        if i < self.size && j < self.size {
            self.entries.get(i * self.size + j)
        } else {
            None
        }
    }

    /// Properties of a pair, or an all-undefined bundle for indices outside the table.
    #[inline]
    pub fn get_or_undefined(&self, i: usize, j: usize) -> InteractionProperties {
        self.get(i, j)
            .copied()
            .unwrap_or_else(InteractionProperties::undefined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::materials::correlation::TpProperty;
    use crate::core::materials::database::Compound;
    use crate::core::materials::properties::PropertyType;

    fn database() -> MaterialsDatabase {
        let mut db = MaterialsDatabase::new();
        for (key, young) in [("steel", 2e11), ("glass", 6e10)] {
            let mut c = Compound::new(key, key);
            c.set_property(TpProperty::with_constant(PropertyType::YoungModulus, young))
                .unwrap();
            c.set_property(TpProperty::with_constant(PropertyType::PoissonRatio, 0.3))
                .unwrap();
            db.add_compound(c);
        }
        db
    }

    #[test]
    fn table_is_symmetric() {
        let db = database();
        let materials = vec!["steel".to_string(), "glass".to_string()];
        let table = InteractionTable::build(&db, &materials, 300.0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.temperature(), 300.0);
        assert_eq!(table.get(0, 1), table.get(1, 0));
        assert_ne!(
            table.get(0, 0).unwrap().equiv_young_modulus,
            table.get(0, 1).unwrap().equiv_young_modulus
        );
    }

    #[test]
    fn out_of_range_indices_are_undefined() {
        let db = database();
        let table = InteractionTable::build(&db, &["steel".to_string()], 300.0);
        assert!(table.get(0, 1).is_none());
        assert!(table.get_or_undefined(3, 0).equiv_young_modulus.is_nan());
    }
}
