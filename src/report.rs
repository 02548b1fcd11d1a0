use bondmap::RunSummary;
use std::fmt::Write;

/// Render a textual summary of a mapping run.
///
/// Rotations are reported in radians, the unit of the `UR` columns in the
/// displacement file.
#[must_use]
pub fn render_summary(summary: &RunSummary) -> String {
    let mut output = String::new();

    writeln!(
        &mut output,
        "Bonding displacement ({} mapping)",
        summary.strategy
    )
    .expect("writing to string cannot fail");

    writeln!(
        &mut output,
        "Bonding regions: {} ({} rotatable)",
        summary.regions, summary.rotatable
    )
    .expect("writing to string cannot fail");

    // Extremes give a quick sanity check against the surface size.
    writeln!(
        &mut output,
        "Largest translation: {:.3e}, largest rotation: {:.3e} rad",
        summary.max_translation, summary.max_rotation
    )
    .expect("writing to string cannot fail");

    writeln!(
        &mut output,
        "Bonding displacement data written to \"{}\".",
        summary.output_path.display()
    )
    .expect("writing to string cannot fail");

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn formats_human_readable_report() {
        let summary = RunSummary {
            regions: 4,
            rotatable: 1,
            strategy: "cylinder",
            max_translation: 0.25,
            max_rotation: 1.5e-2,
            output_path: PathBuf::from("bonding_disp.txt"),
        };
        let report = render_summary(&summary);
        assert!(report.contains("cylinder mapping"));
        assert!(report.contains("4 (1 rotatable)"));
        assert!(report.contains("1.500e-2 rad"));
        assert!(report.contains("\"bonding_disp.txt\""));
    }
}
