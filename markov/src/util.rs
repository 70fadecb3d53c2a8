use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;

pub trait PathBufExt {
    fn open(&self, allow_overwrite: bool) -> anyhow::Result<BufWriter<File>>;
}

impl PathBufExt for PathBuf {
    fn open(&self, allow_overwrite: bool) -> anyhow::Result<BufWriter<File>> {
        let mut file_options = File::options();

        if allow_overwrite {
            file_options.write(true).truncate(true).create(true);
        } else {
            file_options.write(true).create_new(true);
        };

        let file = file_options
            .open(self)
            .context(format!("failed to create file: {}", self.to_string_lossy()))?;

        Ok(BufWriter::new(file))
    }
}

pub fn set_threads(num_threads: usize) -> anyhow::Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .context("failed to build rayon global threadpool")
}

/// The log filter used when RUST_LOG isn't set.
pub fn default_log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init_logging(verbose: u8) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(verbose)),
    )
    .format_timestamp(None)
    .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use std::io::Write;

    #[test]
    fn test_default_log_filter() {
        check!(default_log_filter(0) == "warn");
        check!(default_log_filter(1) == "info");
        check!(default_log_filter(2) == "debug");
        check!(default_log_filter(9) == "trace");
    }

    #[test]
    fn test_open_respects_overwrite() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join(format!("markov-open-{}.txt", std::process::id()));
        let _ = std::fs::remove_file(&path);

        {
            let mut out = path.open(false)?;
            writeln!(out, "first")?;
        }
        let_assert!(Err(_) = path.open(false));

        {
            let mut out = path.open(true)?;
            writeln!(out, "second")?;
        }
        check!(std::fs::read_to_string(&path)? == "second\n");

        std::fs::remove_file(&path)?;
        Ok(())
    }
}
