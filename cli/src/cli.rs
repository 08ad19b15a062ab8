use std::path::PathBuf;

/// Survey/boundary reconciliation CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "geohealth", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Fetch both sources, reconcile them and store the two output tables
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// TOML config file; flags below override its values
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Survey CSV location (URL, file:// URL or path)
    #[arg(long)]
    pub tabular_url: Option<String>,

    /// Boundary GeoJSON location (URL, file:// URL or path)
    #[arg(long)]
    pub geographic_url: Option<String>,

    /// Output directory, defaults to "."
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub report: bool,
}
