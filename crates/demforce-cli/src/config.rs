use crate::cli::MaterialsArgs;
use crate::error::{CliError, Result};
use crate::utils::parser::{self, ModelSlot, ParameterOverride};
use demforce::core::materials::database::MaterialsDatabase;
use demforce::workflows::snapshot::{ModelEntry, Snapshot};
use tracing::debug;

pub fn load_materials(args: &MaterialsArgs) -> Result<MaterialsDatabase> {
    let db = MaterialsDatabase::load(&args.compounds, args.interactions.as_deref())?;
    debug!(
        compounds = db.compound_keys().count(),
        "Loaded materials database from {:?}",
        args.compounds
    );
    Ok(db)
}

fn slot_entry<'a>(snapshot: &'a mut Snapshot, slot: ModelSlot) -> Result<&'a mut ModelEntry> {
    let missing = |what: String| CliError::Config(format!("snapshot has no {} to override", what));
    match slot {
        ModelSlot::Contact => snapshot
            .contact_model
            .as_mut()
            .ok_or_else(|| missing("contact model".to_string())),
        ModelSlot::Bond => snapshot
            .bond_model
            .as_mut()
            .ok_or_else(|| missing("bond model".to_string())),
        ModelSlot::Field(index) => snapshot
            .field_models
            .get_mut(index)
            .ok_or_else(|| missing(format!("field model #{}", index))),
    }
}

pub fn apply_overrides(snapshot: &mut Snapshot, overrides: &[ParameterOverride]) -> Result<()> {
    for o in overrides {
        let entry = slot_entry(snapshot, o.slot)?;
        debug!("Override {:?} '{}' = {}", o.slot, o.key, o.value);
        entry.parameters.insert(o.key.clone(), o.value);
    }
    Ok(())
}

/// Loads a snapshot file and applies the command-line overrides on top of it.
pub fn load_snapshot(
    path: &std::path::Path,
    set_values: &[String],
    steps: Option<usize>,
) -> Result<Snapshot> {
    let mut snapshot = Snapshot::load(path)?;
    let overrides = set_values
        .iter()
        .map(|s| parser::parse_override(s))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    apply_overrides(&mut snapshot, &overrides)?;
    if let Some(steps) = steps {
        snapshot.steps = steps;
    }
    Ok(snapshot)
}
