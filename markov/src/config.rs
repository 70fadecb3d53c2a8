use std::path::PathBuf;

use derive_builder::Builder;
use libmarkov::infer::{Domain, ViterbiParams};

use crate::args::{Cli, OutputFormat};

/// Everything a single markov run needs to know, resolved from the command line.
#[derive(Builder, Debug, Clone, Default)]
#[builder(setter(into, strip_option), default)]
pub struct RunConfig {
    pub basename: PathBuf,
    pub generate: Option<usize>,
    pub viterbi_path: Option<PathBuf>,
    pub forward_path: Option<PathBuf>,
    pub per_line: bool,
    pub seed: Option<u64>,
    pub domain: Domain,
    pub strict: bool,
    pub format: OutputFormat,
    pub lattice_path: Option<PathBuf>,
    pub allow_overwrite: bool,
}

impl RunConfig {
    pub fn viterbi_params(&self) -> ViterbiParams {
        ViterbiParams {
            domain: self.domain,
            strict: self.strict,
        }
    }

    pub fn has_work(&self) -> bool {
        self.generate.is_some() || self.viterbi_path.is_some() || self.forward_path.is_some()
    }
}

impl TryFrom<&Cli> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(cli: &Cli) -> anyhow::Result<Self> {
        let mut builder = RunConfigBuilder::default();

        builder
            .basename(cli.basename.clone())
            .per_line(cli.command_args.per_line)
            .domain(Domain::from(cli.markov_args.domain))
            .strict(cli.markov_args.strict)
            .format(cli.output_args.format)
            .allow_overwrite(cli.common_args.allow_overwrite);

        if let Some(length) = cli.command_args.generate {
            builder.generate(length);
        }
        if let Some(ref path) = cli.command_args.viterbi_path {
            builder.viterbi_path(path.clone());
        }
        if let Some(ref path) = cli.command_args.forward_path {
            builder.forward_path(path.clone());
        }
        if let Some(seed) = cli.markov_args.seed {
            builder.seed(seed);
        }
        if let Some(ref path) = cli.output_args.lattice_path {
            builder.lattice_path(path.clone());
        }

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use clap::Parser;

    #[test]
    fn test_config_from_cli() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "markov",
            "cat",
            "--viterbi",
            "cat.obs",
            "--domain",
            "log",
            "--strict",
            "-D",
            "lattice.txt",
        ])?;
        let config = RunConfig::try_from(&cli)?;

        check!(config.basename == PathBuf::from("cat"));
        check!(config.generate.is_none());
        check!(config.viterbi_path == Some(PathBuf::from("cat.obs")));
        check!(config.forward_path.is_none());
        check!(config.lattice_path == Some(PathBuf::from("lattice.txt")));
        check!(config.domain == Domain::Log);
        check!(config.has_work());

        let params = config.viterbi_params();
        check!(params.domain == Domain::Log);
        check!(params.strict);
        Ok(())
    }

    #[test]
    fn test_config_without_commands() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["markov", "cat", "--seed", "3"])?;
        let config = RunConfig::try_from(&cli)?;

        check!(!config.has_work());
        check!(config.seed == Some(3));
        check!(config.format == OutputFormat::Text);
        Ok(())
    }

    #[test]
    fn test_builder_defaults() -> anyhow::Result<()> {
        let config = RunConfigBuilder::default().basename("weather").build()?;

        check!(config.basename == PathBuf::from("weather"));
        check!(config.domain == Domain::Linear);
        check!(!config.per_line);
        check!(!config.allow_overwrite);
        Ok(())
    }
}
