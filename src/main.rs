mod cli;

use buildbom::adapters::outbound::console::StderrProgressReporter;
use buildbom::adapters::outbound::filesystem::{
    FileSystemReader, FileSystemWriter, RootedFileSystem, StdoutPresenter,
};
use buildbom::adapters::outbound::formatters::CycloneDxFormatter;
use buildbom::adapters::outbound::license::Dep5LicenseDetector;
use buildbom::adapters::outbound::package_db::open_package_database;
use buildbom::application::dto::{MergeRequest, SbomRequest};
use buildbom::application::use_cases::{GenerateSbomUseCase, MergeSbomsUseCase};
use buildbom::config::{discover_config, load_config_from_path, ConfigFile};
use buildbom::ports::outbound::{OutputPresenter, SbomFormatter};
use buildbom::sbom_generation::domain::Bom;
use buildbom::shared::error::ExitCode;
use buildbom::shared::Result;
use cli::{Args, Command, GenerateArgs, MergeArgs};
use std::path::{Path, PathBuf};
use std::process;

/// Filesystem root used when neither `--root` nor the config names one
const DEFAULT_ROOT: &str = "/";

fn main() {
    let exit_code = match run() {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            for cause in e.chain().skip(1) {
                eprintln!("\nCaused by: {}", cause);
            }

            eprintln!();
            ExitCode::ApplicationError
        }
    };

    process::exit(exit_code.as_i32());
}

fn run() -> Result<()> {
    // Parse command-line arguments (clap exits with code 2 on usage errors)
    let args = Args::parse_args();

    match args.command {
        Command::Generate(generate) => run_generate(generate),
        Command::Merge(merge) => run_merge(merge),
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let root = args
        .root
        .or_else(|| config.root.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));

    eprintln!("📦 Indexing package database under: {}", root.display());
    let indexer = open_package_database(&root, Box::new(Dep5LicenseDetector::new()))?;

    // Create adapters (Dependency Injection)
    let rooted_fs = RootedFileSystem::new(root);
    let use_case = GenerateSbomUseCase::new(
        FileSystemReader::new(),
        indexer,
        rooted_fs.clone(),
        rooted_fs,
        StderrProgressReporter::new(),
    );

    let request = SbomRequest::new(
        args.observations,
        args.name,
        args.target_version,
        config.observation_filter(),
    );
    let response = use_case.execute(request)?;

    present(&response.bom, args.output)
}

fn run_merge(args: MergeArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let overrides = args.overrides.apply_to(config.metadata_overrides());

    let use_case = MergeSbomsUseCase::new(
        FileSystemReader::new(),
        CycloneDxFormatter::new(),
        StderrProgressReporter::new(),
    );
    let response = use_case.execute(MergeRequest::new(args.documents, overrides))?;

    present(&response.bom, args.output)
}

/// Explicit `--config` must exist; otherwise the working directory is searched
fn load_config(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_config_from_path(path);
    }
    let cwd = std::env::current_dir()?;
    Ok(discover_config(&cwd)?.unwrap_or_default())
}

fn present(bom: &Bom, output: Option<String>) -> Result<()> {
    eprintln!("📝 Generating CycloneDX JSON format output...");
    let formatted_output = CycloneDxFormatter::new().format(bom)?;

    let presenter: Box<dyn OutputPresenter> = if let Some(output_path) = output {
        Box::new(FileSystemWriter::new(PathBuf::from(output_path)))
    } else {
        Box::new(StdoutPresenter::new())
    };

    presenter.present(&formatted_output)
}
