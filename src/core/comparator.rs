use super::engine::project_with;
use super::types::{
    AlignedYear, ComparisonResult, ProjectionOptions, ProjectionResult, ScenarioInput, Winner,
};

/// Final balances closer than this many currency units are a tie, whatever the currency.
pub const TIE_THRESHOLD: f64 = 1.0;

pub fn compare(a: &ScenarioInput, b: &ScenarioInput) -> ComparisonResult {
    compare_with(a, b, ProjectionOptions::default())
}

pub fn compare_with(
    a: &ScenarioInput,
    b: &ScenarioInput,
    options: ProjectionOptions,
) -> ComparisonResult {
    let scenario_a = project_with(a, options);
    let scenario_b = project_with(b, options);
    compare_projections(scenario_a, scenario_b)
}

pub fn compare_projections(
    scenario_a: ProjectionResult,
    scenario_b: ProjectionResult,
) -> ComparisonResult {
    let balance_difference = scenario_a.final_balance - scenario_b.final_balance;
    let aligned_series = align_series(&scenario_a, &scenario_b);

    ComparisonResult {
        winner: decide_winner(balance_difference),
        balance_difference,
        aligned_series,
        scenario_a,
        scenario_b,
    }
}

fn decide_winner(balance_difference: f64) -> Winner {
    if balance_difference.abs() < TIE_THRESHOLD {
        Winner::Tie
    } else if balance_difference > 0.0 {
        Winner::A
    } else {
        Winner::B
    }
}

fn align_series(a: &ProjectionResult, b: &ProjectionResult) -> Vec<AlignedYear> {
    let span = a.completed_years().max(b.completed_years());
    (1..=span)
        .map(|year_index| AlignedYear {
            year_index,
            total_a: a.balance_at_year(year_index),
            total_b: b.balance_at_year(year_index),
        })
        .collect()
}
