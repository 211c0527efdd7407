use axum::{
    Router,
    extract::{Json, Query},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    ActivationDelay, ActivationOrder, CapitalPolicy, Inputs, Ledger, LedgerRow, LedgerSummary,
    PolicyComparison, RunConfig, SimulationEngine, compare_policies,
};
use crate::report::{CsvOptions, ledger_to_csv, render_table};

const MAX_TOTAL_MONTHS: u32 = 1_200;
const MAX_CONTRACT_LENGTH: u32 = 120;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliActivationOrder {
    BeforeCollection,
    AfterCollection,
}

impl From<CliActivationOrder> for ActivationOrder {
    fn from(value: CliActivationOrder) -> Self {
        match value {
            CliActivationOrder::BeforeCollection => ActivationOrder::BeforeCollection,
            CliActivationOrder::AfterCollection => ActivationOrder::AfterCollection,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliCapitalPolicy {
    ActiveOnly,
    ActivePlusPending,
}

impl From<CliCapitalPolicy> for CapitalPolicy {
    fn from(value: CliCapitalPolicy) -> Self {
        match value {
            CliCapitalPolicy::ActiveOnly => CapitalPolicy::ActiveOnly,
            CliCapitalPolicy::ActivePlusPending => CapitalPolicy::ActivePlusPending,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliOutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiActivationOrder {
    #[serde(alias = "beforeCollection", alias = "before_collection", alias = "before")]
    BeforeCollection,
    #[serde(alias = "afterCollection", alias = "after_collection", alias = "after")]
    AfterCollection,
}

impl From<ApiActivationOrder> for CliActivationOrder {
    fn from(value: ApiActivationOrder) -> Self {
        match value {
            ApiActivationOrder::BeforeCollection => CliActivationOrder::BeforeCollection,
            ApiActivationOrder::AfterCollection => CliActivationOrder::AfterCollection,
        }
    }
}

impl From<ActivationOrder> for ApiActivationOrder {
    fn from(value: ActivationOrder) -> Self {
        match value {
            ActivationOrder::BeforeCollection => ApiActivationOrder::BeforeCollection,
            ActivationOrder::AfterCollection => ApiActivationOrder::AfterCollection,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiCapitalPolicy {
    #[serde(alias = "activeOnly", alias = "active_only")]
    ActiveOnly,
    #[serde(alias = "activePlusPending", alias = "active_plus_pending")]
    ActivePlusPending,
}

impl From<ApiCapitalPolicy> for CliCapitalPolicy {
    fn from(value: ApiCapitalPolicy) -> Self {
        match value {
            ApiCapitalPolicy::ActiveOnly => CliCapitalPolicy::ActiveOnly,
            ApiCapitalPolicy::ActivePlusPending => CliCapitalPolicy::ActivePlusPending,
        }
    }
}

impl From<CapitalPolicy> for ApiCapitalPolicy {
    fn from(value: CapitalPolicy) -> Self {
        match value {
            CapitalPolicy::ActiveOnly => ApiCapitalPolicy::ActiveOnly,
            CapitalPolicy::ActivePlusPending => ApiCapitalPolicy::ActivePlusPending,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    principal: Option<f64>,
    contract_length: Option<u32>,
    monthly_rate: Option<f64>,
    contract_profit_pct: Option<f64>,
    withdraw_pct: Option<f64>,
    total_months: Option<u32>,
    activation_delay: Option<u8>,
    activation_order: Option<ApiActivationOrder>,
    capital_policy: Option<ApiCapitalPolicy>,
    bom: Option<bool>,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "installment-flow",
    about = "Month-by-month cash flow of a capital pool rolled into fixed-term installment contracts"
)]
struct Cli {
    #[arg(long, default_value_t = 100_000_000.0, help = "Initial capital")]
    principal: f64,
    #[arg(long, default_value_t = 6, help = "Contract lifetime in months")]
    contract_length: u32,
    #[arg(long, help = "Monthly profit rate in percent, e.g. 6")]
    monthly_rate: Option<f64>,
    #[arg(
        long,
        help = "Total profit over one contract's lifetime in percent, e.g. 36"
    )]
    contract_profit_pct: Option<f64>,
    #[arg(
        long,
        default_value_t = 20.0,
        help = "Share of each month's installments taken out as cash, in percent"
    )]
    withdraw_pct: f64,
    #[arg(long, default_value_t = 24)]
    total_months: u32,
    #[arg(
        long,
        default_value_t = 0,
        help = "Months before a reinvestment contract may start paying (0 or 1)"
    )]
    activation_delay: u8,
    #[arg(
        long,
        value_enum,
        default_value_t = CliActivationOrder::BeforeCollection,
        help = "With a one-month delay, promote pending contracts before or after collection"
    )]
    activation_order: CliActivationOrder,
    #[arg(
        long,
        value_enum,
        default_value_t = CliCapitalPolicy::ActiveOnly,
        help = "Whether pending contracts count towards active capital"
    )]
    capital_policy: CliCapitalPolicy,
    #[arg(long, value_enum, default_value_t = CliOutputFormat::Table)]
    format: CliOutputFormat,
    #[arg(long, help = "Write the report to this file instead of stdout")]
    output: Option<PathBuf>,
    #[arg(long, help = "Prefix CSV output with a UTF-8 byte-order mark")]
    bom: bool,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: Inputs,
    csv: CsvOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigResponse {
    principal: f64,
    contract_length: u32,
    installment_ratio: f64,
    withdraw_ratio: f64,
    total_months: u32,
    activation_delay: u8,
    activation_order: ApiActivationOrder,
    capital_policy: ApiCapitalPolicy,
}

impl From<&RunConfig> for ConfigResponse {
    fn from(config: &RunConfig) -> Self {
        Self {
            principal: config.principal,
            contract_length: config.contract_length,
            installment_ratio: config.installment_ratio,
            withdraw_ratio: config.withdraw_ratio,
            total_months: config.total_months,
            activation_delay: config.activation_delay.months(),
            activation_order: config.activation_order.into(),
            capital_policy: config.capital_policy.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    config: ConfigResponse,
    summary: Option<LedgerSummary>,
    rows: Vec<LedgerRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparisonEntry {
    name: &'static str,
    activation_delay: u8,
    activation_order: ApiActivationOrder,
    capital_policy: ApiCapitalPolicy,
    summary: LedgerSummary,
}

impl From<PolicyComparison> for ComparisonEntry {
    fn from(value: PolicyComparison) -> Self {
        Self {
            name: value.variant.name(),
            activation_delay: value.variant.activation_delay.months(),
            activation_order: value.variant.activation_order.into(),
            capital_policy: value.variant.capital_policy.into(),
            summary: value.summary,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    variants: Vec<ComparisonEntry>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: &Cli) -> Result<Inputs, String> {
    if !cli.principal.is_finite() || cli.principal <= 0.0 {
        return Err("--principal must be > 0".to_string());
    }

    if cli.contract_length == 0 || cli.contract_length > MAX_CONTRACT_LENGTH {
        return Err(format!(
            "--contract-length must be between 1 and {MAX_CONTRACT_LENGTH}"
        ));
    }

    if cli.total_months == 0 || cli.total_months > MAX_TOTAL_MONTHS {
        return Err(format!(
            "--total-months must be between 1 and {MAX_TOTAL_MONTHS}"
        ));
    }

    if !(0.0..=100.0).contains(&cli.withdraw_pct) {
        return Err("--withdraw-pct must be between 0 and 100".to_string());
    }

    let Some(activation_delay) = ActivationDelay::from_months(cli.activation_delay) else {
        return Err("--activation-delay must be 0 or 1".to_string());
    };

    match (cli.monthly_rate, cli.contract_profit_pct) {
        (Some(_), Some(_)) => {
            return Err(
                "--monthly-rate and --contract-profit-pct are mutually exclusive".to_string(),
            );
        }
        (None, None) => {
            return Err("one of --monthly-rate or --contract-profit-pct is required".to_string());
        }
        _ => {}
    }

    let inputs = Inputs {
        principal: cli.principal,
        contract_length: cli.contract_length,
        monthly_rate: cli.monthly_rate.map(|r| r / 100.0),
        contract_profit_pct: cli.contract_profit_pct,
        withdraw_ratio: cli.withdraw_pct / 100.0,
        total_months: cli.total_months,
        activation_delay,
        activation_order: cli.activation_order.into(),
        capital_policy: cli.capital_policy.into(),
    };

    RunConfig::from_inputs(&inputs).map_err(|e| e.to_string())?;
    Ok(inputs)
}

pub fn run_cli(args: Vec<String>) -> Result<(), String> {
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| e.exit());
    let inputs = build_inputs(&cli)?;
    let engine = SimulationEngine::new(&inputs).map_err(|e| e.to_string())?;
    let config = engine.config().clone();
    let ledger = engine.run();

    let rendered = match cli.format {
        CliOutputFormat::Table => render_table(ledger.rows(), ledger.summary().as_ref()),
        CliOutputFormat::Csv => ledger_to_csv(
            ledger.rows(),
            CsvOptions {
                byte_order_mark: cli.bom,
            },
        ),
        CliOutputFormat::Json => {
            let response = build_simulate_response(&config, ledger.summary(), ledger.into_rows());
            let mut json = serde_json::to_string_pretty(&response)
                .map_err(|e| format!("failed to serialize report: {e}"))?;
            json.push('\n');
            json
        }
    };

    match cli.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route(
            "/api/simulate.csv",
            get(simulate_csv_get_handler).post(simulate_csv_post_handler),
        )
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("installment-flow HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_csv_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_csv_handler_impl(payload).await
}

async fn simulate_csv_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_csv_handler_impl(payload).await
}

async fn compare_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    compare_handler_impl(payload).await
}

fn run_request(payload: SimulatePayload) -> Result<(ApiRequest, RunConfig, Ledger), String> {
    let request = api_request_from_payload(payload)?;
    let engine = SimulationEngine::new(&request.inputs).map_err(|e| e.to_string())?;
    let config = engine.config().clone();
    let ledger = engine.run();
    Ok((request, config, ledger))
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let (_, config, ledger) = match run_request(payload) {
        Ok(run) => run,
        Err(msg) => return bad_request(&msg),
    };

    let response = build_simulate_response(&config, ledger.summary(), ledger.into_rows());
    json_response(StatusCode::OK, response)
}

async fn simulate_csv_handler_impl(payload: SimulatePayload) -> Response {
    let (request, _, ledger) = match run_request(payload) {
        Ok(run) => run,
        Err(msg) => return bad_request(&msg),
    };

    let csv = ledger_to_csv(ledger.rows(), request.csv);
    with_cache_control((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"installment_flow.csv\"",
            ),
        ],
        csv,
    ))
}

async fn compare_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return bad_request(&msg),
    };

    let inputs = request.inputs;
    let comparisons = match tokio::task::spawn_blocking(move || compare_policies(&inputs)).await {
        Ok(Ok(comparisons)) => comparisons,
        Ok(Err(e)) => return bad_request(&e.to_string()),
        Err(e) => {
            warn!(error = %e, "comparison worker failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "comparison failed");
        }
    };

    let response = CompareResponse {
        variants: comparisons.into_iter().map(ComparisonEntry::from).collect(),
    };
    json_response(StatusCode::OK, response)
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn bad_request(msg: &str) -> Response {
    warn!(reason = msg, "rejected simulation request");
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.principal {
        cli.principal = v;
    }
    if let Some(v) = payload.contract_length {
        cli.contract_length = v;
    }
    // A rate in the payload replaces the default rate entirely, so sending
    // both forms is still reported as a conflict.
    if payload.monthly_rate.is_some() || payload.contract_profit_pct.is_some() {
        cli.monthly_rate = payload.monthly_rate;
        cli.contract_profit_pct = payload.contract_profit_pct;
    }
    if let Some(v) = payload.withdraw_pct {
        cli.withdraw_pct = v;
    }
    if let Some(v) = payload.total_months {
        cli.total_months = v;
    }
    if let Some(v) = payload.activation_delay {
        cli.activation_delay = v;
    }
    if let Some(v) = payload.activation_order {
        cli.activation_order = v.into();
    }
    if let Some(v) = payload.capital_policy {
        cli.capital_policy = v.into();
    }
    if let Some(v) = payload.bom {
        cli.bom = v;
    }

    let inputs = build_inputs(&cli)?;
    Ok(ApiRequest {
        inputs,
        csv: CsvOptions {
            byte_order_mark: cli.bom,
        },
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        principal: 100_000_000.0,
        contract_length: 6,
        monthly_rate: Some(6.0),
        contract_profit_pct: None,
        withdraw_pct: 20.0,
        total_months: 24,
        activation_delay: 0,
        activation_order: CliActivationOrder::BeforeCollection,
        capital_policy: CliCapitalPolicy::ActiveOnly,
        format: CliOutputFormat::Json,
        output: None,
        bom: false,
    }
}

fn build_simulate_response(
    config: &RunConfig,
    summary: Option<LedgerSummary>,
    rows: Vec<LedgerRow>,
) -> SimulateResponse {
    SimulateResponse {
        config: config.into(),
        summary,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RateSpec, run_simulation};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    #[test]
    fn build_inputs_converts_percentages_to_fractions() {
        let mut cli = sample_cli();
        cli.withdraw_pct = 35.0;
        cli.monthly_rate = Some(5.0);

        let inputs = build_inputs(&cli).expect("valid inputs");
        assert_approx(inputs.withdraw_ratio, 0.35);
        assert_approx(inputs.monthly_rate.expect("monthly rate"), 0.05);
        assert_eq!(inputs.contract_profit_pct, None);
    }

    #[test]
    fn build_inputs_keeps_contract_profit_as_percentage() {
        let mut cli = sample_cli();
        cli.monthly_rate = None;
        cli.contract_profit_pct = Some(36.0);

        let inputs = build_inputs(&cli).expect("valid inputs");
        let config = RunConfig::from_inputs(&inputs).expect("valid config");
        assert_eq!(config.rate, RateSpec::ContractProfitPct(36.0));
        assert_approx(config.installment_ratio, 1.36 / 6.0);
    }

    #[test]
    fn build_inputs_rejects_both_and_neither_rate() {
        let mut cli = sample_cli();
        cli.contract_profit_pct = Some(36.0);
        let err = build_inputs(&cli).expect_err("both rates must be rejected");
        assert!(err.contains("mutually exclusive"));

        cli.monthly_rate = None;
        cli.contract_profit_pct = None;
        let err = build_inputs(&cli).expect_err("a rate is required");
        assert!(err.contains("required"));
    }

    #[test]
    fn build_inputs_rejects_out_of_range_values() {
        let cases: Vec<(&str, fn(&mut Cli))> = vec![
            ("--principal", |c: &mut Cli| c.principal = 0.0),
            ("--contract-length", |c: &mut Cli| c.contract_length = 0),
            ("--contract-length", |c: &mut Cli| {
                c.contract_length = MAX_CONTRACT_LENGTH + 1
            }),
            ("--total-months", |c: &mut Cli| c.total_months = 0),
            ("--total-months", |c: &mut Cli| {
                c.total_months = MAX_TOTAL_MONTHS + 1
            }),
            ("--withdraw-pct", |c: &mut Cli| c.withdraw_pct = 100.5),
            ("--activation-delay", |c: &mut Cli| c.activation_delay = 2),
            ("-100%", |c: &mut Cli| c.monthly_rate = Some(-50.0)),
        ];

        for (needle, mutate) in cases {
            let mut cli = sample_cli();
            mutate(&mut cli);
            let err = build_inputs(&cli).expect_err("must reject");
            assert!(err.contains(needle), "{err:?} should mention {needle:?}");
        }
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let request = api_request_from_json(
            r#"{
                "principal": 5000000,
                "contractLength": 8,
                "contractProfitPct": 40,
                "withdrawPct": 10,
                "totalMonths": 36,
                "activationDelay": 1,
                "activationOrder": "afterCollection",
                "capitalPolicy": "active-plus-pending",
                "bom": true
            }"#,
        )
        .expect("valid payload");

        let inputs = &request.inputs;
        assert_approx(inputs.principal, 5_000_000.0);
        assert_eq!(inputs.contract_length, 8);
        assert_eq!(inputs.monthly_rate, None);
        assert_eq!(inputs.contract_profit_pct, Some(40.0));
        assert_approx(inputs.withdraw_ratio, 0.10);
        assert_eq!(inputs.total_months, 36);
        assert_eq!(inputs.activation_delay, ActivationDelay::OneMonth);
        assert_eq!(inputs.activation_order, ActivationOrder::AfterCollection);
        assert_eq!(inputs.capital_policy, CapitalPolicy::ActivePlusPending);
        assert!(request.csv.byte_order_mark);
    }

    #[test]
    fn api_request_from_json_uses_defaults_for_missing_keys() {
        let request = api_request_from_json("{}").expect("empty payload is valid");
        let inputs = &request.inputs;
        assert_approx(inputs.principal, 100_000_000.0);
        assert_eq!(inputs.contract_length, 6);
        assert_approx(inputs.monthly_rate.expect("default monthly rate"), 0.06);
        assert_approx(inputs.withdraw_ratio, 0.20);
        assert_eq!(inputs.total_months, 24);
        assert_eq!(inputs.activation_delay, ActivationDelay::Immediate);
        assert!(!request.csv.byte_order_mark);
    }

    #[test]
    fn api_request_from_json_rejects_conflicting_rates() {
        let err = api_request_from_json(r#"{"monthlyRate": 6, "contractProfitPct": 36}"#)
            .expect_err("conflicting rates");
        assert!(err.contains("mutually exclusive"));
    }

    #[test]
    fn api_request_from_json_rejects_unknown_policy() {
        let err = api_request_from_json(r#"{"capitalPolicy": "everything"}"#)
            .expect_err("unknown policy");
        assert!(err.contains("Invalid API JSON payload"));
    }

    #[test]
    fn simulate_response_serialization_contains_expected_fields() {
        let inputs = build_inputs(&sample_cli()).expect("valid inputs");
        let config = RunConfig::from_inputs(&inputs).expect("valid config");
        let ledger = run_simulation(&inputs).expect("valid inputs");
        let response = build_simulate_response(&config, ledger.summary(), ledger.into_rows());

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"config\""));
        assert!(json.contains("\"installmentRatio\""));
        assert!(json.contains("\"activationOrder\":\"before-collection\""));
        assert!(json.contains("\"capitalPolicy\":\"active-only\""));
        assert!(json.contains("\"finalRoiPct\""));
        assert!(json.contains("\"cumulativeWithdrawn\""));
        assert!(json.contains("\"activeContractCount\""));
        assert_eq!(response.rows.len(), 24);
    }

    #[tokio::test]
    async fn csv_handler_returns_attachment() {
        let payload = SimulatePayload {
            total_months: Some(3),
            ..SimulatePayload::default()
        };
        let response = simulate_csv_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("text/csv; charset=utf-8")
        );
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
            Some("no-store")
        );

        let body = body_text(response).await;
        assert_eq!(body.lines().count(), 4);
        assert!(body.starts_with("month,collected"));
    }

    #[tokio::test]
    async fn simulate_handler_rejects_invalid_payload() {
        let payload = SimulatePayload {
            withdraw_pct: Some(150.0),
            ..SimulatePayload::default()
        };
        let response = simulate_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_text(response).await;
        assert!(body.contains("--withdraw-pct"));
    }

    #[tokio::test]
    async fn compare_handler_lists_every_policy_variant() {
        let payload = SimulatePayload {
            total_months: Some(12),
            ..SimulatePayload::default()
        };
        let response = compare_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        let value: serde_json::Value = serde_json::from_str(&body).expect("json body");
        let variants = value["variants"].as_array().expect("variants array");
        assert_eq!(variants.len(), 5);
        assert_eq!(variants[0]["name"], "immediate");
        assert_eq!(variants[0]["summary"]["months"], 12);
    }
}
