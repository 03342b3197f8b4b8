use crate::cli::ModelsArgs;
use crate::error::Result;
use demforce::core::forces::registry;
use tracing::info;

pub fn run(args: ModelsArgs) -> Result<()> {
    match args.model {
        Some(name) => show_model(&name),
        None => {
            list_models();
            Ok(())
        }
    }
}

fn list_models() {
    println!("{:<16} {:<18} {:<6} UNIQUE KEY", "NAME", "FAMILY", "BATCH");
    for d in registry::catalogue() {
        println!(
            "{:<16} {:<18} {:<6} {}",
            d.name,
            d.family.label(),
            if d.batch_support { "yes" } else { "no" },
            d.unique_key
        );
    }
}

fn show_model(name: &str) -> Result<()> {
    let model = registry::create(name)?;
    let d = model.descriptor();
    info!("Showing parameters of model '{}'", d.name);

    println!("{} ({}, key {})", d.name, d.family, d.unique_key);
    let definitions = model.parameters().definitions();
    if definitions.is_empty() {
        println!("  no parameters");
        return Ok(());
    }
    for p in definitions {
        println!(
            "  {:<20} {:>12} {:<10} {}",
            p.key, p.default, p.unit, p.description
        );
    }
    Ok(())
}
