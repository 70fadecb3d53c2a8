use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use libmarkov::infer::structs::{Backpointers, DpMatrix, DpMatrixFlat};
use libmarkov::infer::{generate, most_likely_path, most_likely_state};
use libmarkov::structs::{Model, Observation};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use rayon::prelude::*;
use strum::Display;

use crate::config::RunConfig;
use crate::output::Report;
use crate::util::PathBufExt;

#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Algorithm {
    Viterbi,
    Forward,
}

/// The lattices that one worker reuses from one observation to the next.
#[derive(Default)]
struct Scratch {
    dp_matrix: DpMatrixFlat,
    backpointers: Backpointers,
}

struct Inference {
    report: Report,
    lattice: Option<Vec<u8>>,
}

pub fn run(config: &RunConfig) -> Result<()> {
    let model = Model::from_basename(&config.basename)?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    run_model(config, &model, &mut out)
}

/// Run every command the config asks for, in the order generate, viterbi, forward.
pub fn run_model(config: &RunConfig, model: &Model, out: &mut impl Write) -> Result<()> {
    if !config.has_work() {
        log::warn!("none of --generate, --viterbi or --forward were given; only the model was loaded");
    }

    let mut lattice_out = match config.lattice_path {
        Some(ref path) => Some(path.open(config.allow_overwrite)?),
        None => None,
    };

    if let Some(length) = config.generate {
        let mut rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        let observation = generate(model, length, &mut rng)?;
        Report::Generate { observation }.write(out, config.format)?;
    }

    for (algorithm, path) in [
        (Algorithm::Viterbi, &config.viterbi_path),
        (Algorithm::Forward, &config.forward_path),
    ] {
        let Some(path) = path else { continue };

        let observations = load_observations(path, config.per_line)?;
        log::info!(
            "running {algorithm} over {} observation(s) from {}",
            observations.len(),
            path.to_string_lossy()
        );

        let results: Vec<Result<Inference>> = observations
            .par_iter()
            .enumerate()
            .map_init(Scratch::default, |scratch, (index, observation)| {
                infer(model, algorithm, index, observation, config, scratch)
            })
            .collect();

        for (index, result) in results.into_iter().enumerate() {
            let inference = result.with_context(|| {
                format!(
                    "{algorithm} failed on observation {index} of: {}",
                    path.to_string_lossy()
                )
            })?;

            inference.report.write(out, config.format)?;

            if let (Some(lattice_out), Some(lattice)) = (lattice_out.as_mut(), inference.lattice) {
                lattice_out.write_all(&lattice)?;
            }
        }
    }

    out.flush()?;
    if let Some(ref mut lattice_out) = lattice_out {
        lattice_out.flush()?;
    }

    Ok(())
}

fn load_observations(path: &Path, per_line: bool) -> Result<Vec<Observation>> {
    if per_line {
        Observation::lines_from_path(path)
    } else {
        Ok(vec![Observation::from_path(path)?])
    }
}

fn infer(
    model: &Model,
    algorithm: Algorithm,
    index: usize,
    observation: &Observation,
    config: &RunConfig,
    scratch: &mut Scratch,
) -> Result<Inference> {
    let report = match algorithm {
        Algorithm::Viterbi => {
            let trace = most_likely_path(
                model,
                observation,
                &config.viterbi_params(),
                &mut scratch.dp_matrix,
                &mut scratch.backpointers,
            )?;
            Report::viterbi(index, &trace, model, config.domain)
        }
        Algorithm::Forward => {
            let terminal =
                most_likely_state(model, observation, config.domain, &mut scratch.dp_matrix)?;
            Report::forward(index, &terminal, model)
        }
    };

    let lattice = match config.lattice_path {
        Some(_) => {
            let mut buf: Vec<u8> = vec![];
            writeln!(buf, "# {algorithm} {index} ({})", config.domain)?;
            scratch.dp_matrix.dump(&mut buf, model.states())?;
            Some(buf)
        }
        None => None,
    };

    Ok(Inference { report, lattice })
}
