use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, ValueEnum};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    Breakdown, ComparisonResult, FieldError, InflationExponent, InputError, MAX_HORIZON_MONTHS,
    ProjectionOptions, ProjectionResult, ScenarioInput, compare_with, project_with,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliTargetType {
    Years,
    Age,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliInflationExponent {
    InputYears,
    ProjectedMonths,
}

impl From<CliInflationExponent> for InflationExponent {
    fn from(value: CliInflationExponent) -> Self {
        match value {
            CliInflationExponent::InputYears => InflationExponent::InputYears,
            CliInflationExponent::ProjectedMonths => InflationExponent::ProjectedMonths,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiTargetType {
    #[serde(alias = "Years")]
    Years,
    #[serde(alias = "Age")]
    Age,
}

impl From<ApiTargetType> for CliTargetType {
    fn from(value: ApiTargetType) -> Self {
        match value {
            ApiTargetType::Years => CliTargetType::Years,
            ApiTargetType::Age => CliTargetType::Age,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiInflationExponent {
    #[serde(alias = "inputYears", alias = "input_years", alias = "legacy")]
    InputYears,
    #[serde(alias = "projectedMonths", alias = "projected_months")]
    ProjectedMonths,
}

impl From<ApiInflationExponent> for CliInflationExponent {
    fn from(value: ApiInflationExponent) -> Self {
        match value {
            ApiInflationExponent::InputYears => CliInflationExponent::InputYears,
            ApiInflationExponent::ProjectedMonths => CliInflationExponent::ProjectedMonths,
        }
    }
}

/// One savings scenario as entered by a user, before validation.
#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    #[arg(long, default_value_t = 10_000.0, help = "Starting capital")]
    pub initial_capital: f64,
    #[arg(long, default_value_t = 500.0, help = "Contribution added at the end of every month")]
    pub monthly_contribution: f64,
    #[arg(long, default_value_t = 8.0, help = "Expected annual return in percent, e.g. 8")]
    pub annual_rate: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliTargetType::Years,
        help = "Horizon given as a number of years or as current age and target age"
    )]
    pub target_type: CliTargetType,
    #[arg(long, default_value_t = 10.0, help = "Years to invest, fractions allowed")]
    pub years: f64,
    #[arg(long, help = "Current age; required with --target-type=age")]
    pub current_age: Option<f64>,
    #[arg(long, help = "Age to invest until, used with --target-type=age")]
    pub target_age: Option<f64>,
    #[arg(long, help = "Annual inflation in percent; adds inflation-adjusted values")]
    pub inflation_rate: Option<f64>,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[arg(long, default_value_t = 10_000.0)]
    pub a_initial_capital: f64,
    #[arg(long, default_value_t = 10.0)]
    pub a_years: f64,
    #[arg(long, default_value_t = 8.0, help = "Scenario A annual return in percent")]
    pub a_annual_rate: f64,
    #[arg(long, default_value_t = 500.0)]
    pub a_monthly_contribution: f64,
    #[arg(long, default_value_t = 10_000.0)]
    pub b_initial_capital: f64,
    #[arg(long, default_value_t = 10.0)]
    pub b_years: f64,
    #[arg(long, default_value_t = 6.0, help = "Scenario B annual return in percent")]
    pub b_annual_rate: f64,
    #[arg(long, default_value_t = 500.0)]
    pub b_monthly_contribution: f64,
}

impl CompareArgs {
    fn scenario(capital: f64, years: f64, rate: f64, monthly: f64) -> ScenarioArgs {
        ScenarioArgs {
            initial_capital: capital,
            monthly_contribution: monthly,
            annual_rate: rate,
            target_type: CliTargetType::Years,
            years,
            current_age: None,
            target_age: None,
            inflation_rate: None,
        }
    }

    pub fn scenario_a(&self) -> ScenarioArgs {
        Self::scenario(
            self.a_initial_capital,
            self.a_years,
            self.a_annual_rate,
            self.a_monthly_contribution,
        )
    }

    pub fn scenario_b(&self) -> ScenarioArgs {
        Self::scenario(
            self.b_initial_capital,
            self.b_years,
            self.b_annual_rate,
            self.b_monthly_contribution,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    initial_capital: Option<f64>,
    monthly_contribution: Option<f64>,
    annual_rate: Option<f64>,
    target_type: Option<ApiTargetType>,
    years: Option<f64>,
    current_age: Option<f64>,
    target_age: Option<f64>,
    inflation_enabled: Option<bool>,
    inflation_rate: Option<f64>,
    inflation_exponent: Option<ApiInflationExponent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScenarioPayload {
    initial_capital: Option<f64>,
    years: Option<f64>,
    annual_rate: Option<f64>,
    monthly_contribution: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ComparePayload {
    a: ScenarioPayload,
    b: ScenarioPayload,
}

/// Flat form of `ComparePayload` for query strings, e.g. `?aYears=10&bYears=15`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CompareQuery {
    a_initial_capital: Option<f64>,
    a_years: Option<f64>,
    a_annual_rate: Option<f64>,
    a_monthly_contribution: Option<f64>,
    b_initial_capital: Option<f64>,
    b_years: Option<f64>,
    b_annual_rate: Option<f64>,
    b_monthly_contribution: Option<f64>,
}

impl From<CompareQuery> for ComparePayload {
    fn from(query: CompareQuery) -> Self {
        ComparePayload {
            a: ScenarioPayload {
                initial_capital: query.a_initial_capital,
                years: query.a_years,
                annual_rate: query.a_annual_rate,
                monthly_contribution: query.a_monthly_contribution,
            },
            b: ScenarioPayload {
                initial_capital: query.b_initial_capital,
                years: query.b_years,
                annual_rate: query.b_annual_rate,
                monthly_contribution: query.b_monthly_contribution,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    #[serde(flatten)]
    projection: ProjectionResult,
    breakdown: Breakdown,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    #[serde(flatten)]
    comparison: ComparisonResult,
    margin: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
}

/// Validates raw scenario fields, reporting every rejected field at once.
pub fn build_scenario_input(args: &ScenarioArgs) -> Result<ScenarioInput, InputError> {
    let mut errors = Vec::new();

    let capital = at_least_zero(&mut errors, "initialCapital", args.initial_capital);
    let rate = above_zero(&mut errors, "annualRate", args.annual_rate);
    let monthly = at_least_zero(&mut errors, "monthlyContribution", args.monthly_contribution);

    let (years, current_age) = match args.target_type {
        CliTargetType::Years => {
            let years = above_zero(&mut errors, "years", args.years)
                .and_then(|years| within_horizon(&mut errors, "years", years));
            let age = args
                .current_age
                .and_then(|age| above_zero(&mut errors, "currentAge", age));
            (years, age)
        }
        CliTargetType::Age => horizon_from_ages(&mut errors, args.current_age, args.target_age),
    };

    let inflation = args
        .inflation_rate
        .and_then(|rate| at_least_zero(&mut errors, "inflationRate", rate));

    match (capital, years, rate, monthly) {
        (Some(capital), Some(years), Some(rate), Some(monthly)) if errors.is_empty() => {
            let mut input = ScenarioInput::new(capital, years, rate, monthly);
            input.inflation_rate_percent = inflation;
            input.current_age = current_age;
            Ok(input)
        }
        _ => Err(InputError::Invalid(errors)),
    }
}

pub fn build_comparison_inputs(
    args: &CompareArgs,
) -> Result<(ScenarioInput, ScenarioInput), InputError> {
    let a = build_scenario_input(&args.scenario_a()).map_err(|e| e.in_scenario('A'));
    let b = build_scenario_input(&args.scenario_b()).map_err(|e| e.in_scenario('B'));

    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(err), Ok(_)) | (Ok(_), Err(err)) => Err(err),
        (Err(err_a), Err(err_b)) => Err(InputError::Invalid(
            err_a.fields().into_iter().chain(err_b.fields()).collect(),
        )),
    }
}

fn horizon_from_ages(
    errors: &mut Vec<FieldError>,
    current_age: Option<f64>,
    target_age: Option<f64>,
) -> (Option<f64>, Option<f64>) {
    let current = match current_age {
        Some(age) => above_zero(errors, "currentAge", age),
        None => {
            errors.push(FieldError::new("currentAge", "is required for an age target"));
            None
        }
    };
    let target = match target_age {
        Some(age) => above_zero(errors, "targetAge", age),
        None => {
            errors.push(FieldError::new("targetAge", "is required for an age target"));
            None
        }
    };

    match (current, target) {
        (Some(current), Some(target)) if target <= current => {
            errors.push(FieldError::new(
                "targetAge",
                "must be greater than the current age",
            ));
            (None, Some(current))
        }
        (Some(current), Some(target)) => (
            within_horizon(errors, "targetAge", target - current),
            Some(current),
        ),
        (current, _) => (None, current),
    }
}

fn within_horizon(errors: &mut Vec<FieldError>, field: &'static str, years: f64) -> Option<f64> {
    if (years * 12.0).round() > f64::from(MAX_HORIZON_MONTHS) {
        errors.push(FieldError::new(
            field,
            format!("must not stretch the horizon past {} years", MAX_HORIZON_MONTHS / 12),
        ));
        return None;
    }
    Some(years)
}

fn at_least_zero(errors: &mut Vec<FieldError>, field: &'static str, value: f64) -> Option<f64> {
    if !value.is_finite() || value < 0.0 {
        errors.push(FieldError::new(field, "must be a number >= 0"));
        return None;
    }
    Some(value)
}

fn above_zero(errors: &mut Vec<FieldError>, field: &'static str, value: f64) -> Option<f64> {
    if !value.is_finite() || value <= 0.0 {
        errors.push(FieldError::new(field, "must be a number > 0"));
        return None;
    }
    Some(value)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("savings HTTP API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found", Vec::new())
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn compare_get_handler(Query(query): Query<CompareQuery>) -> Response {
    compare_handler_impl(query.into())
}

async fn compare_post_handler(Json(payload): Json<ComparePayload>) -> Response {
    compare_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    match project_response(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => rejected(err),
    }
}

fn compare_handler_impl(payload: ComparePayload) -> Response {
    match compare_response(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => rejected(err),
    }
}

fn rejected(err: InputError) -> Response {
    warn!("rejected request: {err}");
    error_response(StatusCode::BAD_REQUEST, &err.to_string(), err.fields())
}

fn project_response(payload: ProjectPayload) -> Result<ProjectResponse, InputError> {
    let (args, exponent) = scenario_args_from_payload(payload);
    let input = build_scenario_input(&args)?;
    let projection = project_with(
        &input,
        ProjectionOptions {
            inflation_exponent: exponent.into(),
        },
    );
    debug!(
        "projected {} months: final balance {:.2}, invested {:.2}",
        projection.horizon_months, projection.final_balance, projection.final_invested
    );

    Ok(ProjectResponse {
        breakdown: projection.breakdown(),
        projection,
    })
}

fn compare_response(payload: ComparePayload) -> Result<CompareResponse, InputError> {
    let args = compare_args_from_payload(payload);
    let (a, b) = build_comparison_inputs(&args)?;
    let comparison = compare_with(&a, &b, ProjectionOptions::default());
    debug!(
        "compared scenarios: difference {:.2}, winner {:?}",
        comparison.balance_difference, comparison.winner
    );

    Ok(CompareResponse {
        margin: comparison.margin(),
        comparison,
    })
}

fn scenario_args_from_payload(payload: ProjectPayload) -> (ScenarioArgs, CliInflationExponent) {
    let mut args = default_args_for_api();
    let mut exponent = CliInflationExponent::InputYears;

    if let Some(v) = payload.initial_capital {
        args.initial_capital = v;
    }
    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.annual_rate {
        args.annual_rate = v;
    }
    if let Some(v) = payload.target_type {
        args.target_type = v.into();
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.current_age {
        args.current_age = Some(v);
    }
    if let Some(v) = payload.target_age {
        args.target_age = Some(v);
    }
    if let Some(v) = payload.inflation_exponent {
        exponent = v.into();
    }

    // An explicit toggle wins; otherwise a supplied rate switches inflation on.
    args.inflation_rate = match payload.inflation_enabled {
        Some(false) => None,
        Some(true) => Some(payload.inflation_rate.unwrap_or(0.0)),
        None => payload.inflation_rate,
    };

    (args, exponent)
}

fn compare_args_from_payload(payload: ComparePayload) -> CompareArgs {
    let mut args = default_compare_args_for_api();

    if let Some(v) = payload.a.initial_capital {
        args.a_initial_capital = v;
    }
    if let Some(v) = payload.a.years {
        args.a_years = v;
    }
    if let Some(v) = payload.a.annual_rate {
        args.a_annual_rate = v;
    }
    if let Some(v) = payload.a.monthly_contribution {
        args.a_monthly_contribution = v;
    }
    if let Some(v) = payload.b.initial_capital {
        args.b_initial_capital = v;
    }
    if let Some(v) = payload.b.years {
        args.b_years = v;
    }
    if let Some(v) = payload.b.annual_rate {
        args.b_annual_rate = v;
    }
    if let Some(v) = payload.b.monthly_contribution {
        args.b_monthly_contribution = v;
    }

    args
}

fn default_args_for_api() -> ScenarioArgs {
    ScenarioArgs {
        initial_capital: 10_000.0,
        monthly_contribution: 500.0,
        annual_rate: 8.0,
        target_type: CliTargetType::Years,
        years: 10.0,
        current_age: None,
        target_age: None,
        inflation_rate: None,
    }
}

fn default_compare_args_for_api() -> CompareArgs {
    CompareArgs {
        a_initial_capital: 10_000.0,
        a_years: 10.0,
        a_annual_rate: 8.0,
        a_monthly_contribution: 500.0,
        b_initial_capital: 10_000.0,
        b_years: 10.0,
        b_annual_rate: 6.0,
        b_monthly_contribution: 500.0,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str, fields: Vec<FieldError>) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            fields,
        },
    )
}
