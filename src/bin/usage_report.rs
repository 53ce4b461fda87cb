use std::path::PathBuf;

use smartusage::{
    init_logging, load_frequency_dir, reading_envelope, reconcile, step_bars, Frequency,
    SeasonalDemandModel, ALL_SUPPLIES, HALF_HOURS_PER_DAY,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./json"));
    if !root.is_dir() {
        return Err(format!("data root {} is not a directory", root.display()).into());
    }

    let model = SeasonalDemandModel::default();

    println!("Usage audit over {}", root.display());

    for frequency in [Frequency::Daily, Frequency::HalfHourly] {
        if !root.join(frequency.as_str()).is_dir() {
            println!("\n{frequency}: no data directory, skipping");
            continue;
        }

        let merged = load_frequency_dir(&root, frequency)?;
        println!(
            "\n{frequency}: {} intervals merged",
            merged.all_times.len()
        );

        for supply in ALL_SUPPLIES {
            let reconciled = reconcile(&merged, supply, frequency, &model);
            let observed = reconciled.observed_count();
            let total = reconciled.times.len();
            println!(
                "  {supply} | observed={observed}/{total} residual_ss={:.3} final_estimated_reading={:.2}",
                reconciled.residual_sum_of_squares(),
                reconciled.cumulative_reading.last().copied().unwrap_or(0.0)
            );

            match frequency {
                Frequency::Daily => {
                    let envelope = reading_envelope(&merged, supply);
                    let monotone = envelope.hi.windows(2).all(|p| p[1] >= p[0]);
                    println!(
                        "  {supply} | reading envelope hi ends at {:.2} (monotone={monotone})",
                        envelope.hi.last().copied().unwrap_or(0.0)
                    );
                }
                Frequency::HalfHourly => {
                    // One bar per day makes the seasonal shape readable.
                    let (x, _y) = step_bars(
                        &reconciled.times,
                        &reconciled.estimate,
                        HALF_HOURS_PER_DAY as usize,
                    )?;
                    println!("  {supply} | {} daily bar edges for rendering", x.len());
                }
            }
        }
    }

    Ok(())
}
