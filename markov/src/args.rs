use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use libmarkov::infer::Domain;
use strum::Display;

#[derive(Parser, Debug)]
#[command(name = "markov")]
#[command(
    about = "Generate observations from a discrete Hidden Markov Model, or tag and score observations with it"
)]
pub struct Cli {
    /// The model basename: transitions are read from <BASENAME>.trans and emissions from <BASENAME>.emit
    #[arg(value_name = "BASENAME")]
    pub basename: PathBuf,

    /// Arguments that choose what to run
    #[command(flatten)]
    pub command_args: CommandArgs,

    /// Arguments that are passed to libmarkov functions
    #[command(flatten)]
    pub markov_args: MarkovArgs,

    /// Arguments that control output options
    #[command(flatten)]
    pub output_args: OutputArgs,

    /// Arguments that are common to every run
    #[command(flatten)]
    pub common_args: CommonArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CommandArgs {
    /// Generate an observation of length N from the model
    #[arg(short = 'g', long = "generate", value_name = "N")]
    pub generate: Option<usize>,

    /// Find the most likely state sequence for the observation in this file
    #[arg(long = "viterbi", value_name = "PATH")]
    pub viterbi_path: Option<PathBuf>,

    /// Find the most likely final state for the observation in this file
    #[arg(long = "forward", value_name = "PATH")]
    pub forward_path: Option<PathBuf>,

    /// Treat every non-blank line of an observation file as its own observation
    #[arg(short = 'l', long = "per-line", default_value_t = false)]
    pub per_line: bool,
}

#[derive(Args, Debug, Clone)]
pub struct MarkovArgs {
    /// The number space that DP lattices are computed in
    #[arg(long = "domain", value_enum, default_value_t = DomainArg::Linear)]
    pub domain: DomainArg,

    /// Fail when every Viterbi state path has probability zero
    #[arg(long, action)]
    pub strict: bool,

    /// Seed for the random number generator used by --generate
    #[arg(short = 's', long = "seed", value_name = "N")]
    pub seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// How results are written to stdout
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Where to write the DP lattices computed by --viterbi and --forward
    #[arg(short = 'D', long = "dump-lattice", value_name = "path")]
    pub lattice_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// The number of threads that markov will use
    #[arg(
        short = 't',
        long = "threads",
        default_value_t = 8usize,
        value_name = "n"
    )]
    pub num_threads: usize,

    /// Allow markov to overwrite files
    #[arg(short = 'q', long = "allow-overwrite", default_value_t = false)]
    pub allow_overwrite: bool,

    /// Log more; repeat for more detail (RUST_LOG takes precedence)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Display, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum DomainArg {
    #[default]
    Linear,
    Log,
}

impl From<DomainArg> for Domain {
    fn from(value: DomainArg) -> Self {
        match value {
            DomainArg::Linear => Domain::Linear,
            DomainArg::Log => Domain::Log,
        }
    }
}

#[derive(ValueEnum, Display, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
