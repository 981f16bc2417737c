// In app/src/analyzer.rs

use crate::optimizer::{CandidateResult, TrainingOutcome};

/// Sorts candidates by total return, best first. Equal returns keep their
/// generation order, so the first generated candidate wins a tie.
pub fn rank_candidates(mut results: Vec<CandidateResult>) -> Vec<CandidateResult> {
    results.sort_by(|a, b| b.report.total_return.total_cmp(&a.report.total_return));
    results
}

/// Prints the leading candidates of a training run.
pub fn print_optimization_report(outcome: &TrainingOutcome) {
    let params = &outcome.params;
    println!(
        "\n--- Training Complete: {} ({}) ---",
        params.stock_id, params.strategy_name
    );
    println!("Evaluated {} window pairs.", outcome.candidates);
    println!("---------------------------------");
    println!("Top {} Window Pairs by Total Return:", outcome.leaders.len());
    println!("---------------------------------");

    for (i, candidate) in outcome.leaders.iter().enumerate() {
        let report = &candidate.report;
        println!(
            "[Rank {}] short {:>3} | long {:>3} | Return: {:>8.2}% | \
             Max Drawdown: {:.2}% ({} bars) | Trades: {}",
            i + 1,
            candidate.windows.short,
            candidate.windows.long,
            report.total_return * 100.0,
            report.max_drawdown,
            report.max_drawdown_period,
            report.total_trades
        );
    }
    println!("---------------------------------");
    println!(
        "Saved: short {} | long {} | Return: {:.2}%",
        params.ma_period_short,
        params.ma_period_long,
        params.total_return * 100.0
    );
}
