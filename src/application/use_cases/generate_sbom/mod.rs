use crate::application::dto::{SbomRequest, SbomResponse};
use crate::ports::inbound::SbomGenerationPort;
use crate::ports::outbound::{
    FileHasher, LinkResolver, ObservationReader, PackageIndexer, ProgressReporter,
};
use crate::sbom_generation::domain::{
    Bom, BuildDependencies, Observations, RawBuildDependencies, Warnings,
};
use crate::sbom_generation::services::{
    root_component, BomAssembler, DependencyIdRewriter, DependencyResolver, SbomGenerator,
};
use crate::shared::error::SbomError;
use crate::shared::Result;

/// GenerateSbomUseCase - Core use case for SBOM generation
///
/// This use case orchestrates the per-target pipeline using generic
/// dependency injection for all infrastructure dependencies. The stages run
/// strictly in order: filter, attribute and close, rewrite ids, assemble.
///
/// # Type Parameters
/// * `OR` - ObservationReader implementation
/// * `I` - PackageIndexer implementation (already indexed)
/// * `L` - LinkResolver implementation
/// * `H` - FileHasher implementation
/// * `PR` - ProgressReporter implementation
pub struct GenerateSbomUseCase<OR, I, L, H, PR> {
    observation_reader: OR,
    indexer: I,
    link_resolver: L,
    hasher: H,
    progress_reporter: PR,
}

impl<OR, I, L, H, PR> GenerateSbomUseCase<OR, I, L, H, PR>
where
    OR: ObservationReader,
    I: PackageIndexer,
    L: LinkResolver,
    H: FileHasher,
    PR: ProgressReporter,
{
    /// Creates a new GenerateSbomUseCase with injected dependencies
    pub fn new(
        observation_reader: OR,
        indexer: I,
        link_resolver: L,
        hasher: H,
        progress_reporter: PR,
    ) -> Self {
        Self {
            observation_reader,
            indexer,
            link_resolver,
            hasher,
            progress_reporter,
        }
    }

    /// Executes the SBOM generation use case
    ///
    /// # Arguments
    /// * `request` - Observation log location, target identity and filter settings
    ///
    /// # Returns
    /// SbomResponse containing the document, the resolved partitions and all warnings
    pub fn execute(&self, request: SbomRequest) -> Result<SbomResponse> {
        if request.target_name.trim().is_empty() {
            return Err(SbomError::Validation {
                message: "Target name cannot be empty".to_string(),
            }
            .into());
        }

        let mut warnings = Warnings::new();

        // Step 1: Read and filter observations
        let observations = self.read_and_filter_observations(&request)?;

        // Step 2: Attribute observations and compute the transitive closure
        let raw = self.resolve_packages(&observations, &mut warnings)?;

        // Step 3: Rewrite dependency names into package ids
        let build_dependencies = DependencyIdRewriter::new(&self.indexer).rewrite(raw, &mut warnings);

        // Step 4: Assemble the document
        let bom = self.assemble(&request, &build_dependencies, &mut warnings);

        // Step 5: Surface recoverable problems
        for warning in warnings.iter() {
            self.progress_reporter.report_warning(warning);
        }

        self.progress_reporter.report_completion(&format!(
            "SBOM for {} contains {} component(s) with {} warning(s)",
            request.target_name,
            bom.components.len(),
            warnings.len()
        ));

        Ok(SbomResponse::new(bom, build_dependencies, warnings.into_vec()))
    }

    /// Reads the observation log and keeps the dependency-relevant entries
    fn read_and_filter_observations(&self, request: &SbomRequest) -> Result<Observations> {
        self.progress_reporter.report(&format!(
            "📖 Loading observations from: {}",
            request.observations_path.display()
        ));

        let raw = self
            .observation_reader
            .read_observations(&request.observations_path)?;
        let total = raw.len();
        let observations = request.filter.filter(raw);

        self.progress_reporter.report(&format!(
            "✅ Kept {} header(s) and {} tool invocation(s) out of {} observation(s)",
            observations.opened.len(),
            observations.executed.len(),
            total
        ));

        Ok(observations)
    }

    fn resolve_packages(
        &self,
        observations: &Observations,
        warnings: &mut Warnings,
    ) -> Result<RawBuildDependencies> {
        self.progress_reporter.report(&format!(
            "🔍 Attributing observations to {} packages...",
            self.indexer.os_family().manager()
        ));

        let on_attributed = |done: usize, total: usize| {
            self.progress_reporter
                .report_progress(done, total, Some("attributing"));
        };
        let raw = DependencyResolver::new(&self.indexer, &self.link_resolver)
            .with_progress(&on_attributed)
            .resolve(observations, warnings)?;

        self.progress_reporter.report(&format!(
            "✅ Found {} code, {} tool and {} transitive package(s)",
            raw.code.len(),
            raw.tools.len(),
            raw.transitive.len()
        ));

        Ok(raw)
    }

    fn assemble(
        &self,
        request: &SbomRequest,
        build_dependencies: &BuildDependencies,
        warnings: &mut Warnings,
    ) -> Bom {
        self.progress_reporter.report("🧩 Assembling SBOM document...");

        let metadata = SbomGenerator::generate_default_metadata();
        let root = root_component(&request.target_name, &request.target_version);
        BomAssembler::new(&self.hasher).assemble(root, build_dependencies, &metadata, warnings)
    }
}

impl<OR, I, L, H, PR> SbomGenerationPort for GenerateSbomUseCase<OR, I, L, H, PR>
where
    OR: ObservationReader,
    I: PackageIndexer,
    L: LinkResolver,
    H: FileHasher,
    PR: ProgressReporter,
{
    fn generate(&self, request: SbomRequest) -> Result<SbomResponse> {
        self.execute(request)
    }
}
