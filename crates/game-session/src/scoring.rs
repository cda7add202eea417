//! End-of-game comparison of the player against buy-and-hold.

use market_core::GameError;
use serde::{Deserialize, Serialize};

/// Everything the results screen needs, and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub player_value: f64,
    pub baseline_value: f64,
    pub player_return_pct: f64,
    pub baseline_return_pct: f64,
    /// Player return minus baseline return, in percentage points
    pub outperformance: f64,
    /// Strictly beat the baseline; a tie is a loss
    pub did_win: bool,
    pub events_triggered_count: usize,
    pub grade: String,
    pub summary: String,
}

/// Compare terminal values against the shared starting investment.
pub fn score_game(
    initial_investment: f64,
    player_value: f64,
    baseline_value: f64,
    events_triggered_count: usize,
) -> Result<ScoreCard, GameError> {
    if !(initial_investment > 0.0) {
        return Err(GameError::InvalidInput(format!(
            "initial investment must be positive, got {}",
            initial_investment
        )));
    }

    let player_return_pct = (player_value - initial_investment) / initial_investment * 100.0;
    let baseline_return_pct = (baseline_value - initial_investment) / initial_investment * 100.0;
    let outperformance = player_return_pct - baseline_return_pct;
    let did_win = player_value > baseline_value;

    Ok(ScoreCard {
        player_value,
        baseline_value,
        player_return_pct,
        baseline_return_pct,
        outperformance,
        did_win,
        events_triggered_count,
        grade: calculate_grade(outperformance, did_win).to_string(),
        summary: summarize(outperformance, did_win),
    })
}

/// Letter grade from the margin over buy-and-hold.
fn calculate_grade(outperformance: f64, did_win: bool) -> &'static str {
    if outperformance >= 20.0 {
        "A+"
    } else if outperformance >= 10.0 {
        "A"
    } else if did_win {
        "B"
    } else if outperformance > -10.0 {
        "C"
    } else if outperformance > -25.0 {
        "D"
    } else {
        "F"
    }
}

fn summarize(outperformance: f64, did_win: bool) -> String {
    if did_win {
        format!("You beat the market by {:.1} points.", outperformance)
    } else if outperformance == 0.0 {
        "You matched the market exactly. Buy-and-hold was just as good.".to_string()
    } else {
        format!(
            "The market beat you by {:.1} points. Time in the market beats timing the market.",
            -outperformance
        )
    }
}
