#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_doc_code_examples)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

mod analytic;
mod bonding;
mod config;
mod errors;
mod field;
mod geometry;
mod interpolate;
mod mapping;
mod output;
mod pipeline;
mod rotation;
mod shrink;

pub use analytic::{map_cylinder, map_cylinder_along_x, map_sphere};
pub use bonding::{
    bonding_centers, load_bonding_regions, parse_bonding_regions, BondingRegion, BondingShape,
};
pub use config::{Config, StrategyConfig};
pub use errors::{
    ConfigError, ConsistencyError, DomainError, InputError, ParseError, ParseErrorKind,
    PipelineError,
};
pub use field::{map_discrete, DeformationField, FieldSample};
pub use geometry::{point2d, MappedPoint, Point2D};
pub use interpolate::CloughTocher2d;
pub use mapping::{map, map_array, MappingStrategy};
pub use output::{
    format_row, format_scientific, write_displacements, BondingDisplacement, BONDING_DISP_HEADER,
};
pub use pipeline::{compute_displacements, run, RunSummary};
pub use rotation::{rotation_matrix, rotation_vector, rotation_vectors, rotation_vectors_array};
pub use shrink::Shrinkage;
