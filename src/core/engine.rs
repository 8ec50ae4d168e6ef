use super::types::{
    InflationExponent, ProjectionOptions, ProjectionResult, ScenarioInput, YearlySnapshot,
};

const MONTHS_PER_YEAR: u32 = 12;

pub fn project(input: &ScenarioInput) -> ProjectionResult {
    project_with(input, ProjectionOptions::default())
}

/// Compounds the scenario month by month and records a snapshot at every
/// completed year. Interest accrues on the previous month's balance before
/// that month's contribution lands.
pub fn project_with(input: &ScenarioInput, options: ProjectionOptions) -> ProjectionResult {
    let monthly_rate = monthly_rate(input.annual_rate_percent);
    let horizon_months = input.horizon_months();
    let contribution = input.monthly_contribution;

    let mut balance = input.initial_capital;
    let mut invested = input.initial_capital;
    let mut yearly_series = Vec::with_capacity((horizon_months / MONTHS_PER_YEAR) as usize);

    for month in 1..=horizon_months {
        balance = balance * (1.0 + monthly_rate) + contribution;
        invested += contribution;

        if month % MONTHS_PER_YEAR == 0 {
            let year_index = month / MONTHS_PER_YEAR;
            yearly_series.push(YearlySnapshot {
                year_index,
                age: input
                    .current_age
                    .map(|age| (age + f64::from(year_index)).round() as u32),
                total_invested: invested,
                total_balance: balance,
                interest_earned: balance - invested,
                real_balance: input
                    .inflation_rate_percent
                    .map(|rate| deflate(balance, rate, f64::from(year_index))),
            });
        }
    }

    let final_interest = balance - invested;
    let terminal_years = match options.inflation_exponent {
        InflationExponent::InputYears => input.years,
        InflationExponent::ProjectedMonths => {
            f64::from(horizon_months) / f64::from(MONTHS_PER_YEAR)
        }
    };

    ProjectionResult {
        years: input.years,
        horizon_months,
        final_invested: invested,
        final_balance: balance,
        final_interest,
        return_percent: return_percent(final_interest, invested),
        final_real_balance: input
            .inflation_rate_percent
            .map(|rate| deflate(balance, rate, terminal_years)),
        yearly_series,
    }
}

/// Effective monthly rate that compounds to the nominal annual rate over twelve months.
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    (1.0 + annual_rate_percent / 100.0).powf(1.0 / 12.0) - 1.0
}

fn deflate(nominal: f64, inflation_rate_percent: f64, years: f64) -> f64 {
    nominal / (1.0 + inflation_rate_percent / 100.0).powf(years)
}

fn return_percent(interest: f64, invested: f64) -> Option<f64> {
    if invested == 0.0 {
        return None;
    }
    Some(interest / invested * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_relative(actual: f64, expected: f64, tol: f64) {
        let scale = expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tol * scale,
            "expected {expected}, got {actual}, relative tolerance {tol}"
        );
    }

    fn reference_balance(capital: f64, annual_rate_percent: f64, monthly: f64, months: u32) -> f64 {
        let growth = 1.0 + monthly_rate(annual_rate_percent);
        (0..months).fold(capital, |balance, _| balance * growth + monthly)
    }

    #[test]
    fn monthly_rate_is_geometric_not_divided() {
        let rate = monthly_rate(12.0);
        assert_approx(rate, 1.12_f64.powf(1.0 / 12.0) - 1.0);
        assert!((rate - 0.009489).abs() < 1e-6);
        assert!(rate < 0.12 / 12.0);
        assert_approx((1.0 + rate).powi(12), 1.12);
    }

    #[test]
    fn one_year_with_contributions_matches_iterative_reference() {
        let result = project(&ScenarioInput::new(1_000.0, 1.0, 12.0, 100.0));

        assert_eq!(result.horizon_months, 12);
        assert_eq!(result.yearly_series.len(), 1);
        let year = &result.yearly_series[0];
        assert_eq!(year.year_index, 1);
        assert_approx(year.total_invested, 2_200.0);
        assert_relative(
            year.total_balance,
            reference_balance(1_000.0, 12.0, 100.0, 12),
            1e-6,
        );
        assert_approx(result.final_invested, 2_200.0);
        assert_eq!(result.final_balance, year.total_balance);
        assert!(year.real_balance.is_none());
        assert!(result.final_real_balance.is_none());
    }

    #[test]
    fn contribution_does_not_earn_interest_in_its_own_month() {
        let result = project(&ScenarioInput::new(0.0, 1.0 / 12.0, 12.0, 100.0));
        assert_eq!(result.horizon_months, 1);
        assert_approx(result.final_balance, 100.0);
        assert_approx(result.final_interest, 0.0);
        assert!(result.yearly_series.is_empty());
    }

    #[test]
    fn zero_investment_reports_undefined_return() {
        let result = project(&ScenarioInput::new(0.0, 5.0, 5.0, 0.0));

        assert_eq!(result.yearly_series.len(), 5);
        assert!(result.yearly_series.iter().all(|y| y.total_invested == 0.0));
        assert_eq!(result.final_invested, 0.0);
        assert_eq!(result.return_percent, None);
    }

    #[test]
    fn zero_month_horizon_keeps_initial_state() {
        let result = project(&ScenarioInput::new(2_500.0, 0.0, 7.0, 50.0).with_inflation(3.0));

        assert_eq!(result.horizon_months, 0);
        assert!(result.yearly_series.is_empty());
        assert_eq!(result.final_invested, 2_500.0);
        assert_eq!(result.final_balance, 2_500.0);
        assert_eq!(result.final_interest, 0.0);
        assert_eq!(result.return_percent, Some(0.0));
        assert_eq!(result.final_real_balance, Some(2_500.0));
    }

    #[test]
    fn fractional_horizon_rounds_once_and_drops_partial_year_snapshot() {
        let result = project(&ScenarioInput::new(1_000.0, 10.4, 6.0, 10.0));

        // 10.4 * 12 = 124.8 -> 125 months.
        assert_eq!(result.horizon_months, 125);
        assert_eq!(result.yearly_series.len(), 10);
        assert_approx(result.final_invested, 1_000.0 + 125.0 * 10.0);
        assert_relative(
            result.final_balance,
            reference_balance(1_000.0, 6.0, 10.0, 125),
            1e-9,
        );
    }

    #[test]
    fn whole_year_inflation_deflates_snapshot_and_terminal_alike() {
        let result = project(&ScenarioInput::new(1_000.0, 2.0, 10.0, 0.0).with_inflation(5.0));

        let year_two = &result.yearly_series[1];
        assert_approx(
            year_two.real_balance.expect("inflation requested"),
            year_two.total_balance / 1.05_f64.powi(2),
        );
        assert_approx(
            result.final_real_balance.expect("inflation requested"),
            result.final_balance / 1.05_f64.powf(2.0),
        );
        assert_approx(year_two.total_balance, 1_000.0 * 1.1_f64.powi(2));
    }

    #[test]
    fn terminal_deflation_uses_fractional_years_while_snapshots_use_year_index() {
        let input = ScenarioInput::new(1_000.0, 2.5, 10.0, 0.0).with_inflation(5.0);
        let result = project(&input);

        assert_eq!(result.yearly_series.len(), 2);
        let year_two = &result.yearly_series[1];
        assert_approx(
            year_two.real_balance.expect("inflation requested"),
            year_two.total_balance / 1.05_f64.powi(2),
        );
        assert_approx(
            result.final_real_balance.expect("inflation requested"),
            result.final_balance / 1.05_f64.powf(2.5),
        );
    }

    #[test]
    fn projected_months_exponent_follows_compounded_horizon() {
        // 2.54 years -> 30 months -> 2.5 compounded years.
        let input = ScenarioInput::new(1_000.0, 2.54, 10.0, 0.0).with_inflation(5.0);
        let legacy = project(&input);
        let corrected = project_with(
            &input,
            ProjectionOptions {
                inflation_exponent: InflationExponent::ProjectedMonths,
            },
        );

        assert_eq!(legacy.final_balance, corrected.final_balance);
        assert_eq!(legacy.yearly_series, corrected.yearly_series);
        assert_approx(
            legacy.final_real_balance.expect("inflation requested"),
            legacy.final_balance / 1.05_f64.powf(2.54),
        );
        assert_approx(
            corrected.final_real_balance.expect("inflation requested"),
            corrected.final_balance / 1.05_f64.powf(2.5),
        );
    }

    #[test]
    fn snapshots_carry_rounded_age_when_known() {
        let result = project(&ScenarioInput::new(100.0, 3.0, 5.0, 10.0).with_current_age(30.6));
        let ages: Vec<_> = result.yearly_series.iter().map(|y| y.age).collect();
        assert_eq!(ages, vec![Some(32), Some(33), Some(34)]);

        let without_age = project(&ScenarioInput::new(100.0, 1.0, 5.0, 10.0));
        assert_eq!(without_age.yearly_series[0].age, None);
    }

    #[test]
    fn tiny_rate_without_contributions_barely_grows() {
        let result = project(&ScenarioInput::new(5_000.0, 30.0, 1e-9, 0.0));
        assert_relative(result.final_balance, 5_000.0, 1e-9);
    }

    #[test]
    fn repeated_calls_do_not_share_accumulators() {
        let input = ScenarioInput::new(1_000.0, 7.0, 9.0, 250.0);
        let first = project(&input);
        let _other = project(&ScenarioInput::new(50_000.0, 40.0, 15.0, 5_000.0));
        let again = project(&input);
        assert_eq!(first, again);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_series_shape_and_accounting_identities(
            capital in 0.0f64..1_000_000.0,
            years in 0.0f64..60.0,
            rate in 0.01f64..30.0,
            monthly in 0.0f64..10_000.0,
            inflation in proptest::option::of(0.0f64..20.0),
        ) {
            let mut input = ScenarioInput::new(capital, years, rate, monthly);
            input.inflation_rate_percent = inflation;
            let result = project(&input);

            let months = (years * 12.0).round() as u32;
            prop_assert_eq!(result.horizon_months, months);
            prop_assert_eq!(result.yearly_series.len() as u32, months / 12);
            prop_assert_eq!(result.final_interest, result.final_balance - result.final_invested);
            prop_assert!(result.final_balance >= result.final_invested);
            prop_assert_eq!(result.final_real_balance.is_some(), inflation.is_some());

            let mut previous_invested = capital;
            for (idx, year) in result.yearly_series.iter().enumerate() {
                prop_assert_eq!(year.year_index as usize, idx + 1);
                prop_assert_eq!(year.interest_earned, year.total_balance - year.total_invested);
                prop_assert!(year.total_invested >= previous_invested);
                prop_assert!(year.total_balance >= year.total_invested);
                prop_assert_eq!(year.real_balance.is_some(), inflation.is_some());
                previous_invested = year.total_invested;
            }
        }

        #[test]
        fn prop_without_contributions_balance_is_pure_compounding(
            capital in 1.0f64..1_000_000.0,
            years in 1u32..40,
            rate in 0.01f64..25.0,
        ) {
            let result = project(&ScenarioInput::new(capital, f64::from(years), rate, 0.0));
            let growth = 1.0 + monthly_rate(rate);
            for year in &result.yearly_series {
                let expected = capital * growth.powi(12 * year.year_index as i32);
                prop_assert!((year.total_balance - expected).abs() <= 1e-9 * expected);
            }
        }
    }
}
