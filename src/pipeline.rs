//! End-to-end run: load, pre-shrink, map and write.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use log::{info, warn};

use crate::bonding::{bonding_centers, load_bonding_regions};
use crate::config::Config;
use crate::errors::{DomainError, PipelineError};
use crate::geometry::Point2D;
use crate::mapping::{map, MappingStrategy};
use crate::output::{write_displacements, BondingDisplacement};
use crate::shrink::Shrinkage;

/// Counts and extrema of a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Number of bonding regions read.
    pub regions: usize,
    /// Number of regions carrying the `ROTATABLE` marker.
    pub rotatable: usize,
    /// Name of the mapping strategy.
    pub strategy: &'static str,
    /// Largest translation magnitude.
    pub max_translation: f64,
    /// Largest rotation angle in radians.
    pub max_rotation: f64,
    /// File the displacements were written to.
    pub output_path: PathBuf,
}

/// Pre-shrink `points`, map them and measure each displacement from the
/// unshrunk location.
///
/// # Errors
///
/// Returns the [`DomainError`] of the first point that cannot be mapped.
///
/// # Examples
/// ```
/// use bondmap::{compute_displacements, point2d, MappingStrategy, Shrinkage};
///
/// let rows = compute_displacements(
///     &[point2d(0.0, 0.0), point2d(1.0, 0.0)],
///     &Shrinkage::new(point2d(0.0, 0.0), 0.3),
///     &MappingStrategy::cylinder(2.0, 0.0),
/// )
/// .unwrap();
/// assert_eq!(rows[0].translation.norm(), 0.0);
/// assert!((rows[1].translation.x + 0.3).abs() < 1.0e-12);
/// ```
pub fn compute_displacements(
    points: &[Point2D],
    shrinkage: &Shrinkage,
    strategy: &MappingStrategy,
) -> Result<Vec<BondingDisplacement>, DomainError> {
    let shrunk = shrinkage.apply_all(points);
    let mapped = map(&shrunk, strategy)?;
    Ok(points
        .iter()
        .zip(&mapped)
        .map(|(&original, mapped)| BondingDisplacement::from_mapping(original, mapped))
        .collect())
}

/// Execute a full run described by `config`.
///
/// Nothing is written unless every bonding center maps successfully.
///
/// # Errors
///
/// Returns [`PipelineError`] for invalid configuration, unreadable or
/// malformed inputs, mapping failures, a strict consistency mismatch or an
/// output write failure.
pub fn run(config: &Config) -> Result<RunSummary, PipelineError> {
    config.validate()?;
    if let Some(assembly) = &config.assembly_shrinkage {
        if let Err(error) = config.shrinkage.check_consistency(assembly) {
            if config.strict_consistency {
                return Err(error.into());
            }
            warn!("{error}");
        }
    }

    let regions = load_bonding_regions(&config.bonding_file)?;
    let rotatable = regions.iter().filter(|region| region.rotatable).count();
    info!(
        "loaded {} bonding regions ({rotatable} rotatable) from `{}`",
        regions.len(),
        config.bonding_file.display()
    );

    let strategy = config.strategy.build()?;
    info!(
        "mapping onto a {} after pre-shrink with {}",
        strategy.name(),
        config.shrinkage
    );
    let rows = compute_displacements(&bonding_centers(&regions), &config.shrinkage, &strategy)?;

    let output_error = |source| PipelineError::Output {
        path: config.output_file.clone(),
        source,
    };
    let file = File::create(&config.output_file).map_err(output_error)?;
    write_displacements(BufWriter::new(file), &rows).map_err(output_error)?;
    info!(
        "bonding displacement data written to `{}`",
        config.output_file.display()
    );

    Ok(RunSummary {
        regions: regions.len(),
        rotatable,
        strategy: strategy.name(),
        max_translation: rows
            .iter()
            .map(|row| row.translation.norm())
            .fold(0.0, f64::max),
        max_rotation: rows.iter().map(|row| row.rotation.norm()).fold(0.0, f64::max),
        output_path: config.output_file.clone(),
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use super::*;
    use crate::geometry::point2d;

    #[test]
    fn identity_shrink_on_flat_axis_gives_zero_rows() {
        let points = [point2d(-1.0, 0.0), point2d(2.0, 0.0)];
        let rows = compute_displacements(
            &points,
            &Shrinkage::identity(),
            &MappingStrategy::cylinder(3.0, 0.0),
        )
        .expect("finite");
        for row in rows {
            assert_eq!(row.translation, Vector3::zeros());
            assert_eq!(row.rotation, Vector3::zeros());
        }
    }

    #[test]
    fn translation_combines_shrink_and_wrap() {
        let radius = 2.0;
        let point = point2d(0.0, 1.0);
        let shrinkage = Shrinkage::new(point2d(0.0, 0.0), 0.5);
        let rows = compute_displacements(&[point], &shrinkage, &MappingStrategy::cylinder(radius, 0.0))
            .expect("finite");
        let angle: f64 = 0.5 / radius;
        assert_relative_eq!(
            rows[0].translation,
            Vector3::new(0.0, radius * angle.sin() - 1.0, -radius * (1.0 - angle.cos())),
            epsilon = 1.0e-12
        );
        assert_relative_eq!(rows[0].rotation, Vector3::new(-angle, 0.0, 0.0), epsilon = 1.0e-12);
    }

    #[test]
    fn failed_mapping_writes_nothing() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let bonding_file = dir.path().join("bonding.txt");
        std::fs::write(&bonding_file, "CIRCLE 0 0 0.1\nCIRCLE 5 5 0.1\n").expect("written");
        let field_file = dir.path().join("field.txt");
        std::fs::write(&field_file, "0 0 0 0 0\n1 0 1 0 0\n0 1 0 1 0\n1 1 1 1 0\n")
            .expect("written");
        let config = Config {
            shrinkage: Shrinkage::identity(),
            strategy: crate::config::StrategyConfig::DiscreteField { field_file },
            ..Config::default()
        }
        .with_base_dir(dir.path());

        let error = run(&config).expect_err("second center outside field");
        assert!(matches!(
            error,
            PipelineError::Domain(DomainError::OutsideConvexHull { index: 1, .. })
        ));
        assert!(!config.output_file.exists());
    }

    #[test]
    fn strict_mode_rejects_diverging_assembly_shrinkage() {
        let dir = tempfile::tempdir().expect("temporary directory");
        std::fs::write(dir.path().join("bonding.txt"), "CIRCLE 1 1 0.1\n").expect("written");
        let mut config = Config {
            assembly_shrinkage: Some(Shrinkage::new(point2d(0.0, 0.0), 0.2)),
            strict_consistency: true,
            ..Config::default()
        }
        .with_base_dir(dir.path());

        let error = run(&config).expect_err("strict mismatch");
        assert!(matches!(error, PipelineError::Consistency(_)));
        assert!(!config.output_file.exists());

        config.strict_consistency = false;
        let summary = run(&config).expect("advisory mismatch only warns");
        assert_eq!(summary.regions, 1);
        assert!(config.output_file.exists());
    }
}
