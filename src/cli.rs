//! Command-line interface implementation for Strata.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments structure for Strata.
#[derive(Parser, Debug)]
#[command(author, version, about = "Strata: layered template-tree materializer for project scaffolding", long_about = None)]
pub struct Args {
    /// Overlay template directories, in precedence order (later overlays win)
    #[arg(value_name = "OVERLAY", required = true)]
    pub overlays: Vec<PathBuf>,

    /// Directory where the generated project will be created
    #[arg(short, long, value_name = "OUTPUT_DIR")]
    pub output: PathBuf,

    /// Selected framework (overrides the config file)
    #[arg(long)]
    pub framework: Option<String>,

    /// Selected database (overrides the config file)
    #[arg(long)]
    pub database: Option<String>,

    /// Extra boolean feature flag, NAME or NAME=false. May be repeated.
    #[arg(long = "flag", value_name = "NAME[=BOOL]")]
    pub flags: Vec<String>,

    /// Path to a metadata file (strata.json / strata.yml / strata.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Force overwrite of existing output directory
    #[arg(short, long)]
    pub force: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help()
                    .unwrap();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
