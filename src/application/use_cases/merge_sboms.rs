use crate::application::dto::{MergeRequest, MergeResponse};
use crate::ports::inbound::SbomMergePort;
use crate::ports::outbound::{DocumentReader, ProgressReporter, SbomParser};
use crate::sbom_generation::domain::{Bom, Warnings};
use crate::sbom_generation::services::BomMerger;
use crate::shared::error::SbomError;
use crate::shared::Result;

/// MergeSbomsUseCase - Folds per-target documents into a single SBOM
///
/// # Type Parameters
/// * `DR` - DocumentReader implementation
/// * `P` - SbomParser implementation
/// * `PR` - ProgressReporter implementation
pub struct MergeSbomsUseCase<DR, P, PR> {
    document_reader: DR,
    parser: P,
    progress_reporter: PR,
}

impl<DR, P, PR> MergeSbomsUseCase<DR, P, PR>
where
    DR: DocumentReader,
    P: SbomParser,
    PR: ProgressReporter,
{
    pub fn new(document_reader: DR, parser: P, progress_reporter: PR) -> Self {
        Self {
            document_reader,
            parser,
            progress_reporter,
        }
    }

    pub fn execute(&self, request: MergeRequest) -> Result<MergeResponse> {
        // Step 1: Load every document before folding so a bad input fails fast
        let documents = self.load_documents(&request)?;

        // Step 2: Fold, apply overrides and drop dangling edges
        self.progress_reporter
            .report(&format!("🔗 Merging {} document(s)...", documents.len()));
        let mut warnings = Warnings::new();
        let bom = BomMerger::merge(documents, &request.overrides, &mut warnings)?;

        for warning in warnings.iter() {
            self.progress_reporter.report_warning(warning);
        }
        self.progress_reporter.report_completion(&format!(
            "Merged SBOM contains {} component(s) with {} warning(s)",
            bom.components.len(),
            warnings.len()
        ));

        Ok(MergeResponse::new(bom, warnings.into_vec()))
    }

    fn load_documents(&self, request: &MergeRequest) -> Result<Vec<Bom>> {
        let total = request.document_paths.len();
        let mut documents = Vec::with_capacity(total);

        for (index, path) in request.document_paths.iter().enumerate() {
            self.progress_reporter
                .report_progress(index + 1, total, Some("reading documents"));

            let content = self.document_reader.read_document(path)?;
            let bom = self
                .parser
                .parse(&content)
                .map_err(|e| SbomError::DocumentParseError {
                    path: path.clone(),
                    details: format!("{:#}", e),
                })?;
            documents.push(bom);
        }

        Ok(documents)
    }
}

impl<DR, P, PR> SbomMergePort for MergeSbomsUseCase<DR, P, PR>
where
    DR: DocumentReader,
    P: SbomParser,
    PR: ProgressReporter,
{
    fn merge(&self, request: MergeRequest) -> Result<MergeResponse> {
        self.execute(request)
    }
}
