//! # Bundles
//!
//! Artifact format, storage paths, the locale registry and the generator.

pub mod artifact;
pub mod generator;
pub mod locales;
pub mod paths;

pub use artifact::{decode_bundle, Bundle, BundleMetadata, EncodedBundle};
pub use generator::{
    BundleGenerator, GenerationReport, GenerationScope, GeneratorSettings, JobSelection, OutputMode,
};
pub use locales::LocaleRegistry;
pub use paths::{distribution_code, on_demand_path, pregen_path, BundleTriple};
