//! Strata's main application entry point and orchestration logic.
//! Handles command-line argument parsing, metadata loading, and hands the
//! overlay list to the materialization engine.

use std::path::{Path, PathBuf};

use strata::{
    cli::{get_args, Args},
    config::{find_config_file, load_metadata, Metadata},
    engine::Engine,
    error::{default_error_handler, Error, Result},
    template::TemplateRegistry,
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Ensures the output directory is safe to write to.
///
/// # Errors
/// * `Error::OutputDirectoryExists` if the directory exists and `force` is
///   false
pub fn get_output_dir<P: AsRef<Path>>(output_dir: P, force: bool) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if output_dir.exists() && !force {
        return Err(Error::OutputDirectoryExists {
            output_dir: output_dir.display().to_string(),
        });
    }
    Ok(output_dir.to_path_buf())
}

/// Builds the run metadata from the config file and CLI overrides.
///
/// The explicit `--config` file wins over an auto-discovered one in the
/// current directory; `--framework`, `--database` and `--flag` override
/// whatever the file said.
fn build_metadata(args: &Args) -> Result<Metadata> {
    let from_file = match &args.config {
        Some(path) => Some(load_metadata(path)?),
        None => match find_config_file(".") {
            Some(path) => Some(load_metadata(path)?),
            None => None,
        },
    };

    let mut metadata = match (from_file, &args.framework) {
        (Some(metadata), _) => metadata,
        (None, Some(framework)) => Metadata::new(framework.clone(), None),
        (None, None) => {
            return Err(Error::Config(
                "no metadata found: pass --framework or provide a strata.json/strata.yml"
                    .to_string(),
            ))
        }
    };

    if let Some(framework) = &args.framework {
        metadata.framework = framework.clone();
    }
    if let Some(database) = &args.database {
        metadata.database =
            if database.as_str() == "none" { None } else { Some(database.clone()) };
    }
    for flag in &args.flags {
        let (name, enabled) = match flag.split_once('=') {
            Some((name, value)) => {
                let enabled: bool = value.parse().map_err(|_| {
                    Error::Config(format!("invalid flag value in '--flag {}'", flag))
                })?;
                (name, enabled)
            }
            None => (flag.as_str(), true),
        };
        metadata.flags.insert(name.to_lowercase(), enabled);
    }

    Ok(metadata)
}

/// Main application logic execution.
///
/// # Flow
/// 1. Validates the output directory
/// 2. Loads metadata (config file, then CLI overrides)
/// 3. Materializes all overlays in declared order
fn run(args: Args) -> Result<()> {
    let output_root = get_output_dir(&args.output, args.force)?;
    let metadata = build_metadata(&args)?;

    // The binary runs with an empty registry; generators for `$`-marked
    // templates are registered by consumers embedding the engine as a
    // library.
    let registry = TemplateRegistry::new();

    let mut engine = Engine::new(args.overlays, output_root.clone(), metadata, registry);
    engine.materialize()?;

    println!("Materialization completed successfully in {}.", output_root.display());
    Ok(())
}
