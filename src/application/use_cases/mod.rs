/// Use cases module containing application business logic orchestration
mod generate_sbom;
mod merge_sboms;

pub use generate_sbom::GenerateSbomUseCase;
pub use merge_sboms::MergeSbomsUseCase;
