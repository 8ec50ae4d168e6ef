mod comparator;
mod engine;
mod error;
mod types;

pub use comparator::{TIE_THRESHOLD, compare, compare_projections, compare_with};
pub use engine::{monthly_rate, project, project_with};
pub use error::{FieldError, InputError};
pub use types::{
    AlignedYear, Breakdown, ComparisonResult, InflationExponent, MAX_HORIZON_MONTHS,
    ProjectionOptions, ProjectionResult, ScenarioInput, Winner, YearlySnapshot,
};
