use malaria_calib::analysis::DurationSummary;

pub const DURATION_HEADERS: [&str; 5] = ["simulation", "bin_start", "bin_end", "count", "mean"];

/// One CSV row per histogram bin, labelled with the simulation it came from.
pub fn duration_rows(simulation: &str, summary: &DurationSummary) -> Vec<Vec<String>> {
    summary
        .edges
        .windows(2)
        .zip(&summary.histogram)
        .map(|(edges, count)| {
            vec![
                simulation.to_string(),
                edges[0].to_string(),
                edges[1].to_string(),
                count.to_string(),
                summary.mean.to_string(),
            ]
        })
        .collect()
}
