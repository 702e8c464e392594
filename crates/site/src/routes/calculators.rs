//! Engineering calculator pages and JSON API.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json, Router,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::instrument;

use crate::calculators::{Calculation, Calculator, CalculatorError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::api_rate_limiter;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "calculators/index.html")]
pub struct CalculatorIndexTemplate {
    pub calculators: Vec<Calculator>,
}

/// One input box, with whatever the visitor last typed.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub example: &'static str,
    pub value: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "calculators/show.html")]
pub struct CalculatorTemplate {
    pub calculator: Calculator,
    pub fields: Vec<FieldView>,
    pub result: Option<Calculation>,
    pub error: Option<String>,
}

impl CalculatorTemplate {
    fn new(calculator: Calculator, form: &HashMap<String, String>) -> Self {
        let fields = calculator
            .fields()
            .iter()
            .map(|f| FieldView {
                name: f.name,
                label: f.label,
                unit: f.unit,
                example: f.example,
                value: form.get(f.name).cloned().unwrap_or_default(),
            })
            .collect();
        Self {
            calculator,
            fields,
            result: None,
            error: None,
        }
    }
}

fn lookup(name: &str) -> Result<Calculator> {
    Calculator::from_slug(name).ok_or_else(|| AppError::NotFound(format!("calculator {name}")))
}

#[instrument]
pub async fn index() -> CalculatorIndexTemplate {
    CalculatorIndexTemplate {
        calculators: Calculator::ALL.to_vec(),
    }
}

/// Empty calculator form.
#[instrument]
pub async fn form(Path(name): Path<String>) -> Result<CalculatorTemplate> {
    Ok(CalculatorTemplate::new(lookup(&name)?, &HashMap::new()))
}

/// Form submission: re-render with the result, or with the error and 422.
#[instrument(skip(form))]
pub async fn submit(
    Path(name): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response> {
    let calculator = lookup(&name)?;
    let mut page = CalculatorTemplate::new(calculator, &form);

    match calculator
        .parse_form(&form)
        .and_then(|inputs| calculator.compute(&inputs))
    {
        Ok(result) => {
            page.result = Some(result);
            Ok(page.into_response())
        }
        Err(e) => {
            page.error = Some(e.to_string());
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

/// `POST /api/calculators/{name}` with a JSON object of numbers.
#[instrument(skip(inputs))]
pub async fn api(
    Path(name): Path<String>,
    Json(inputs): Json<HashMap<String, f64>>,
) -> Result<Json<Calculation>> {
    let calculator = lookup(&name)?;
    let calculation = calculator
        .compute(&inputs)
        .map_err(|e: CalculatorError| {
            tracing::debug!(calculator = calculator.slug(), error = %e, "rejected input");
            e
        })?;
    Ok(Json(calculation))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{name}", get(form).post(submit))
}

/// JSON API under `/api/calculators`, rate limited.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/{name}", post(api))
        .layer(api_rate_limiter())
}

