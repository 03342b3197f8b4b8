use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "demforce CLI - Diagnostics for the demforce force-computation core: model catalogue, material properties and single-snapshot force evaluation.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the available contact, bond and field models, or the parameters of one model.
    Models(ModelsArgs),
    /// Evaluate one material property of a compound at a temperature and pressure.
    Property(PropertyArgs),
    /// Show the derived interaction properties of two compounds.
    Interaction(InteractionArgs),
    /// Run force steps for a snapshot on the host path, the batch path, or both.
    Evaluate(EvaluateArgs),
}

/// Arguments for the `models` subcommand.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Show the parameters of this model (display name or unique key).
    #[arg(value_name = "NAME_OR_KEY")]
    pub model: Option<String>,
}

/// Material database files shared by several subcommands.
#[derive(Args, Debug, Clone)]
pub struct MaterialsArgs {
    /// Path to the compound database in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub compounds: PathBuf,

    /// Path to a CSV file with pairwise interaction properties.
    #[arg(short, long, value_name = "PATH")]
    pub interactions: Option<PathBuf>,
}

/// Arguments for the `property` subcommand.
#[derive(Args, Debug)]
pub struct PropertyArgs {
    #[command(flatten)]
    pub materials: MaterialsArgs,

    /// Key of the compound.
    #[arg(value_name = "COMPOUND")]
    pub compound: String,

    /// Property key (e.g., 'young_modulus'); all properties when omitted.
    #[arg(value_name = "PROPERTY")]
    pub property: Option<String>,

    /// Temperature [K].
    #[arg(short, long, value_name = "FLOAT", default_value_t = 273.15)]
    pub temperature: f64,

    /// Pressure [Pa].
    #[arg(short, long, value_name = "FLOAT", default_value_t = 101_325.0)]
    pub pressure: f64,
}

/// Arguments for the `interaction` subcommand.
#[derive(Args, Debug)]
pub struct InteractionArgs {
    #[command(flatten)]
    pub materials: MaterialsArgs,

    /// Key of the first compound.
    #[arg(value_name = "COMPOUND_A")]
    pub compound_a: String,

    /// Key of the second compound.
    #[arg(value_name = "COMPOUND_B")]
    pub compound_b: String,

    /// Temperature [K].
    #[arg(short, long, value_name = "FLOAT", default_value_t = 273.15)]
    pub temperature: f64,

    /// Pressure [Pa].
    #[arg(short, long, value_name = "FLOAT", default_value_t = 101_325.0)]
    pub pressure: f64,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathChoice {
    /// Per-record evaluation.
    Host,
    /// Structure-of-arrays evaluation with marshaled parameters.
    Batch,
    /// Run both paths and report the largest difference.
    Compare,
}

/// Arguments for the `evaluate` subcommand.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub materials: MaterialsArgs,

    /// Path to the snapshot file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub snapshot: PathBuf,

    /// Execution path to run.
    #[arg(long, value_enum, default_value_t = PathChoice::Host)]
    pub path: PathChoice,

    /// Override the number of steps from the snapshot file.
    #[arg(short = 'n', long, value_name = "INT")]
    pub steps: Option<usize>,

    /// Relative tolerance for `--path compare`.
    #[arg(long, value_name = "FLOAT", default_value_t = 1e-9)]
    pub tolerance: f64,

    /// Set a model parameter, overriding the snapshot file.
    /// Can be used multiple times. Example: -S bond.MU=0.5 or -S field.0.EMISSIVITY=0.8
    #[arg(short = 'S', long = "set", value_name = "SLOT.KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
