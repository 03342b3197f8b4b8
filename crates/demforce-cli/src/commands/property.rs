use crate::cli::{InteractionArgs, PropertyArgs};
use crate::config;
use crate::error::{CliError, Result};
use demforce::core::interaction::resolver::InteractionResolver;
use demforce::core::materials::properties::{PropertyScope, PropertyType};
use tracing::info;

pub fn run(args: PropertyArgs) -> Result<()> {
    let db = config::load_materials(&args.materials)?;
    let compound = db.compound(&args.compound).ok_or_else(|| {
        CliError::Argument(format!("compound '{}' is not in the database", args.compound))
    })?;

    let properties: Vec<PropertyType> = match &args.property {
        Some(key) => {
            let property = PropertyType::from_key(key)
                .ok_or_else(|| CliError::Argument(format!("unknown property '{}'", key)))?;
            vec![property]
        }
        None => PropertyType::ALL
            .into_iter()
            .filter(|p| p.scope() != PropertyScope::Interaction)
            .filter(|p| compound.property(*p).is_some())
            .collect(),
    };

    info!(
        "Evaluating {} propert(ies) of '{}' at T = {} K, P = {} Pa",
        properties.len(),
        compound.name,
        args.temperature,
        args.pressure
    );
    for property in properties {
        let value = compound.property_value(property, args.temperature, args.pressure);
        println!(
            "{:<32} {:>14} {}",
            property.name(),
            format_value(value),
            property.units()
        );
    }
    Ok(())
}

pub fn run_interaction(args: InteractionArgs) -> Result<()> {
    let db = config::load_materials(&args.materials)?;
    for key in [&args.compound_a, &args.compound_b] {
        if db.compound(key).is_none() {
            return Err(CliError::Argument(format!(
                "compound '{}' is not in the database",
                key
            )));
        }
    }

    let props = InteractionResolver::new(&db)
        .with_pressure(args.pressure)
        .resolve(&args.compound_a, &args.compound_b, args.temperature);

    let rows = [
        ("equivalent Young modulus", props.equiv_young_modulus, "Pa"),
        ("equivalent shear modulus", props.equiv_shear_modulus, "Pa"),
        ("equivalent surface energy", props.equiv_surface_energy, "J/m2"),
        (
            "equivalent thermal conductivity",
            props.equiv_thermal_conductivity,
            "W/(m*K)",
        ),
        ("equivalent yield strength", props.equiv_yield_strength, "Pa"),
        ("restitution coefficient", props.restitution, "-"),
        ("damping coefficient", props.alpha, "-"),
        ("sliding friction", props.sliding_friction, "-"),
        ("rolling friction", props.rolling_friction, "-"),
    ];
    println!(
        "{} / {} at T = {} K, P = {} Pa",
        args.compound_a, args.compound_b, args.temperature, args.pressure
    );
    for (label, value, unit) in rows {
        println!("  {:<32} {:>14} {}", label, format_value(value), unit);
    }
    if !props.is_fully_defined() {
        println!("  (undefined values disable the force terms that depend on them)");
    }
    Ok(())
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "undefined".to_string()
    } else {
        format!("{:.6e}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_values_are_labelled() {
        assert_eq!(format_value(f64::NAN), "undefined");
        assert_eq!(format_value(1500.0), "1.500000e3");
    }
}
