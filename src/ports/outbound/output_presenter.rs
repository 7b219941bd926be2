use crate::shared::Result;

/// OutputPresenter port for presenting final output
///
/// This port abstracts where the serialized SBOM document goes (stdout, file, etc.).
pub trait OutputPresenter {
    /// Presents the formatted document
    ///
    /// # Errors
    /// Returns an error if:
    /// - Writing to the output destination fails
    /// - File permissions prevent writing
    fn present(&self, content: &str) -> Result<()>;
}
