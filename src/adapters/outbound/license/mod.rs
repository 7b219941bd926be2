/// License detection adapters
mod dep5_detector;

pub use dep5_detector::Dep5LicenseDetector;
