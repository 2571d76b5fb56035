use earth_moon_fields::pipeline::{self, PipelineError, RunOptions};
use earth_moon_fields::render::RenderError;
use earth_moon_fields::scenario::Scenario;

#[test]
fn run_renders_every_figure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scenario = Scenario::load(None, Some(12)).expect("scenario");
    let options = RunOptions {
        figure_dir: Some(dir.path().join("figures")),
        contour_levels: 6,
        streamline_seeds_per_axis: 4,
        figure_size: (480, 360),
        ..RunOptions::default()
    };

    let report = match pipeline::run(&scenario, &options) {
        Ok(report) => report,
        Err(PipelineError::Render(RenderError::Backend(msg))) => {
            eprintln!("Skipping render test: plot backend unavailable ({msg})");
            return;
        }
        Err(err) => panic!("pipeline failed: {err}"),
    };

    let names: Vec<_> = report
        .figures
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .collect();
    assert_eq!(
        names,
        [
            "potential_curve.png",
            "potential_earth.png",
            "potential_combined.png",
            "potential_contours.png",
            "force_streamlines.png",
        ]
    );
    for path in &report.figures {
        let bytes = std::fs::read(path).expect("figure written");
        assert!(bytes.starts_with(b"\x89PNG"), "{} is not a PNG", path.display());
    }
}
