use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use buildbom::sbom_generation::domain::MetadataOverrides;

/// Build-time SBOMs from traced file access and the OS package database
#[derive(Parser, Debug)]
#[command(name = "buildbom")]
#[command(version)]
#[command(
    about = "Generate build-time SBOMs by attributing observed headers and toolchain binaries to OS packages",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build one target's SBOM from its observation log
    Generate(GenerateArgs),
    /// Merge SBOM documents of several targets into one
    Merge(MergeArgs),
}

#[derive(ClapArgs, Debug)]
pub struct GenerateArgs {
    /// Observation log recorded during the build (JSON with "opened" and "executed" lists)
    #[arg(short = 'i', long, value_name = "FILE")]
    pub observations: PathBuf,

    /// Name of the build target
    #[arg(short, long)]
    pub name: String,

    /// Version of the build target
    #[arg(long = "version", value_name = "VERSION", default_value = "")]
    pub target_version: String,

    /// Root of the filesystem holding the package database (defaults to /)
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Config file (defaults to ./buildbom.config.yml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct MergeArgs {
    /// Documents to merge; the first one provides the root component
    #[arg(required = true, value_name = "DOCUMENT")]
    pub documents: Vec<PathBuf>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Config file (defaults to ./buildbom.config.yml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Root identity overrides; each one wins over the config file's `metadata` section
#[derive(ClapArgs, Debug, Default)]
pub struct OverrideArgs {
    /// Name of the merged root component
    #[arg(long)]
    pub name: Option<String>,

    /// Version of the merged root component
    #[arg(long = "version", value_name = "VERSION")]
    pub target_version: Option<String>,

    /// Group (namespace) of the merged root component
    #[arg(long)]
    pub group: Option<String>,

    /// Declared license of the merged root component
    #[arg(long)]
    pub license: Option<String>,

    #[arg(long)]
    pub supplier: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    #[arg(long)]
    pub manufacturer: Option<String>,
}

impl OverrideArgs {
    /// Layers the command-line values over `base`
    pub fn apply_to(self, base: MetadataOverrides) -> MetadataOverrides {
        MetadataOverrides {
            name: self.name.or(base.name),
            version: self.target_version.or(base.version),
            group: self.group.or(base.group),
            license: self.license.or(base.license),
            supplier: self.supplier.or(base.supplier),
            author: self.author.or(base.author),
            manufacturer: self.manufacturer.or(base.manufacturer),
        }
    }
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
