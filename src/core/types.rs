use serde::Serialize;

/// Longest horizon accepted at the input boundary: 200 years.
pub const MAX_HORIZON_MONTHS: u32 = 2_400;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum InflationExponent {
    /// Deflate the terminal balance by the horizon exactly as entered, fractional years included.
    #[default]
    InputYears,
    /// Deflate the terminal balance by the compounded horizon, `horizon_months / 12`.
    ProjectedMonths,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct ProjectionOptions {
    pub inflation_exponent: InflationExponent,
}

/// Validated parameters of one savings scenario.
///
/// Rates are in percent units. Build through `api::build_scenario_input` when
/// the values come from a user; the engine trusts whatever it is given.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioInput {
    pub initial_capital: f64,
    pub years: f64,
    pub annual_rate_percent: f64,
    pub monthly_contribution: f64,
    pub inflation_rate_percent: Option<f64>,
    pub current_age: Option<f64>,
}

impl ScenarioInput {
    pub fn new(
        initial_capital: f64,
        years: f64,
        annual_rate_percent: f64,
        monthly_contribution: f64,
    ) -> Self {
        Self {
            initial_capital,
            years,
            annual_rate_percent,
            monthly_contribution,
            inflation_rate_percent: None,
            current_age: None,
        }
    }

    pub fn with_inflation(mut self, inflation_rate_percent: f64) -> Self {
        self.inflation_rate_percent = Some(inflation_rate_percent);
        self
    }

    pub fn with_current_age(mut self, current_age: f64) -> Self {
        self.current_age = Some(current_age);
        self
    }

    /// Whole months compounded; the only place the horizon is rounded.
    ///
    /// Saturates at `u32::MAX`; validated inputs stay within `MAX_HORIZON_MONTHS`.
    pub fn horizon_months(&self) -> u32 {
        (self.years * 12.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlySnapshot {
    pub year_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub total_invested: f64,
    pub total_balance: f64,
    pub interest_earned: f64,
    pub real_balance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub years: f64,
    pub horizon_months: u32,
    pub final_invested: f64,
    pub final_balance: f64,
    pub final_interest: f64,
    /// `None` when nothing was invested, so "0 %" and "undefined" stay distinct.
    pub return_percent: Option<f64>,
    pub final_real_balance: Option<f64>,
    pub yearly_series: Vec<YearlySnapshot>,
}

/// Invested vs. interest as percent of the final balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub invested: f64,
    pub interest: f64,
    pub invested_share: Option<f64>,
    pub interest_share: Option<f64>,
}

impl ProjectionResult {
    pub fn completed_years(&self) -> u32 {
        self.yearly_series.len() as u32
    }

    pub fn balance_at_year(&self, year_index: u32) -> Option<f64> {
        self.yearly_series
            .iter()
            .find(|snapshot| snapshot.year_index == year_index)
            .map(|snapshot| snapshot.total_balance)
    }

    pub fn breakdown(&self) -> Breakdown {
        let share = |part: f64| {
            (self.final_balance != 0.0).then(|| part / self.final_balance * 100.0)
        };
        Breakdown {
            invested: self.final_invested,
            interest: self.final_interest,
            invested_share: share(self.final_invested),
            interest_share: share(self.final_interest),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Winner {
    A,
    B,
    Tie,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedYear {
    pub year_index: u32,
    pub total_a: Option<f64>,
    pub total_b: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub scenario_a: ProjectionResult,
    pub scenario_b: ProjectionResult,
    pub balance_difference: f64,
    pub winner: Winner,
    pub aligned_series: Vec<AlignedYear>,
}

impl ComparisonResult {
    /// How far ahead the winner finished; `None` on a tie.
    pub fn margin(&self) -> Option<f64> {
        match self.winner {
            Winner::Tie => None,
            Winner::A | Winner::B => Some(self.balance_difference.abs()),
        }
    }
}
