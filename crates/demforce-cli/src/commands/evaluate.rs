use crate::cli::{EvaluateArgs, PathChoice};
use crate::config;
use crate::error::{CliError, Result};
use demforce::workflows::snapshot::{self as workflow, Evaluation, ExecutionPath};
use tracing::{info, warn};

pub fn run(args: EvaluateArgs) -> Result<()> {
    let db = config::load_materials(&args.materials)?;
    let snapshot = config::load_snapshot(&args.snapshot, &args.set_values, args.steps)?;

    match args.path {
        PathChoice::Host => {
            let evaluation = workflow::evaluate(&snapshot, &db, ExecutionPath::Host)?;
            print_evaluation("host", &evaluation);
        }
        PathChoice::Batch => {
            let evaluation = workflow::evaluate(&snapshot, &db, ExecutionPath::Batch)?;
            print_evaluation("batch", &evaluation);
        }
        PathChoice::Compare => {
            let (comparison, host, _) = workflow::compare(&snapshot, &db)?;
            print_evaluation("host", &host);
            println!();
            println!("Host/batch comparison (relative):");
            println!("  max force difference     {:.3e}", comparison.max_force_diff);
            println!("  max moment difference    {:.3e}", comparison.max_moment_diff);
            println!("  max heat flux difference {:.3e}", comparison.max_heat_flux_diff);
            println!(
                "  step tallies             {}",
                if comparison.tallies_match { "match" } else { "differ" }
            );
            if !comparison.agrees(args.tolerance) {
                warn!(
                    max_diff = comparison.max_diff(),
                    tolerance = args.tolerance,
                    "Execution paths disagree"
                );
                return Err(CliError::Config(format!(
                    "host and batch paths differ by {:.3e} (tolerance {:.3e})",
                    comparison.max_diff(),
                    args.tolerance
                )));
            }
            info!("Execution paths agree within {:e}", args.tolerance);
        }
    }
    Ok(())
}

fn print_evaluation(label: &str, evaluation: &Evaluation) {
    if let Some(last) = evaluation.reports.last() {
        let t = &last.tally;
        println!(
            "Last step ({} path): {} contact(s), {} bond(s), {} broken, {} field particle(s), {} skipped term(s)",
            label, t.contacts, t.bonds, t.broken_bonds, t.field_particles, t.skipped_terms
        );
    }
    println!(
        "{:>5} {:>40} {:>40} {:>12}",
        "#", "FORCE [N]", "MOMENT [N*m]", "HEAT [W]"
    );
    for (i, p) in evaluation.particles.iter().enumerate() {
        println!(
            "{:>5} {:>40} {:>40} {:>12.4e}",
            i,
            format_vector(p.force.as_slice()),
            format_vector(p.moment.as_slice()),
            p.heat_flux
        );
    }
    let broken = evaluation.bonds.iter().filter(|b| !b.active).count();
    if broken > 0 {
        println!("{} of {} bond(s) inactive", broken, evaluation.bonds.len());
    }
}

fn format_vector(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{:.4e}", x)).collect();
    format!("({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_are_formatted_in_scientific_notation() {
        assert_eq!(
            format_vector(&[1.0, -0.5, 0.0]),
            "(1.0000e0, -5.0000e-1, 0.0000e0)"
        );
    }
}
