use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
};
use bank::Category;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    error::AppError,
    state::AppState,
    utils::{Entry, Pairs, estimate_entries, extract_form, required},
};

type FormResult = Result<Form<Pairs>, FormRejection>;

const WASTE: [(&str, &str); 3] = [
    ("landfill", "Landfill"),
    ("incineration", "Incineration"),
    ("recycling", "Recycling"),
];

const FOOD: [(&str, &str); 7] = [
    ("meat", "Meat"),
    ("dairy", "Dairy"),
    ("small_fish", "Small Fish"),
    ("large_fish", "Large Fish"),
    ("fandv", "Fruits & Vegetables"),
    ("bread", "Bread"),
    ("snack", "Snacks and Beverage"),
];

#[derive(Serialize)]
pub struct Estimates {
    pub message: Vec<f64>,
}

#[derive(Serialize)]
pub struct Submission {
    pub message: &'static str,
}

pub async fn transportation_handler(
    State(state): State<Arc<AppState>>,
    form: FormResult,
) -> Result<Json<Estimates>, AppError> {
    let fields = extract_form(form)?;
    let [psmiles, pstype, pbmiles, pbtype] = required(
        &fields,
        ["psmiles", "pstype", "pbmiles", "pbtype"],
        "All transportation fields are required.",
    )?;

    let bank = state.load_bank().await?;
    let message = estimate_entries(
        &bank,
        &[
            Entry::new(Category::Transportation, pstype, "psmiles", psmiles),
            Entry::new(Category::Transportation, pbtype, "pbmiles", pbmiles),
        ],
    )?;

    Ok(Json(Estimates { message }))
}

pub async fn energy_handler(
    State(state): State<Arc<AppState>>,
    form: FormResult,
) -> Result<Json<Estimates>, AppError> {
    let fields = extract_form(form)?;
    let [kwatt, energytype] = required(
        &fields,
        ["kwatt", "energytype"],
        "All energy fields are required.",
    )?;

    let bank = state.load_bank().await?;
    let message = estimate_entries(
        &bank,
        &[Entry::new(Category::Energy, energytype, "kwatt", kwatt)],
    )?;

    Ok(Json(Estimates { message }))
}

pub async fn waste_handler(
    State(state): State<Arc<AppState>>,
    form: FormResult,
) -> Result<Json<Estimates>, AppError> {
    fixed_subtypes(state, form, Category::Waste, &WASTE, "All waste fields are required.").await
}

pub async fn food_handler(
    State(state): State<Arc<AppState>>,
    form: FormResult,
) -> Result<Json<Estimates>, AppError> {
    fixed_subtypes(state, form, Category::Food, &FOOD, "All food fields are required.").await
}

/// Forms where every field is a quantity for a subtype known up front.
async fn fixed_subtypes<const N: usize>(
    state: Arc<AppState>,
    form: FormResult,
    category: Category,
    layout: &[(&'static str, &'static str); N],
    message: &'static str,
) -> Result<Json<Estimates>, AppError> {
    let fields = extract_form(form)?;
    let values = required(&fields, layout.map(|(field, _)| field), message)?;

    let bank = state.load_bank().await?;
    let entries: Vec<Entry> = layout
        .iter()
        .zip(values)
        .map(|(&(field, subtype), value)| Entry::new(category, subtype, field, value))
        .collect();

    let message = estimate_entries(&bank, &entries)?;

    Ok(Json(Estimates { message }))
}

pub async fn individual_handler(form: FormResult) -> Result<Json<Submission>, AppError> {
    let fields = extract_form(form)?;
    let [name, _email, members, country] = required(
        &fields,
        ["name", "email", "no_of_user", "country"],
        "All fields are required.",
    )?;

    info!(submitter = name, members, country, "Individual submission");

    Ok(Json(Submission {
        message: "Individual submission successful",
    }))
}

pub async fn company_handler(form: FormResult) -> Result<Json<Submission>, AppError> {
    let fields = extract_form(form)?;
    let [name, _email, members, country, cal_by] = required(
        &fields,
        ["name", "email", "no_of_mem", "country", "cal_by"],
        "All fields are required.",
    )?;

    info!(submitter = name, members, country, cal_by, "Company submission");

    Ok(Json(Submission {
        message: "Company submission successful",
    }))
}

pub async fn submit_handler(form: FormResult) -> Result<Json<Value>, AppError> {
    let fields = extract_form(form)?;
    let [name, _email] = required(&fields, ["name", "email"], "Name and email are required.")?;

    info!(submitter = name, "Form submission");

    Ok(Json(json!({
        "message": { "message": "Form submitted successfully" }
    })))
}

pub async fn not_found_handler() -> AppError {
    AppError::RouteNotFound
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use axum::{
        body::{Body, to_bytes},
        extract::FromRequest,
        http::{Request, StatusCode, header::CONTENT_TYPE},
        response::{IntoResponse, Response},
    };
    use bank::BANK_PATH;

    use super::*;
    use crate::config::Config;

    fn state_with(dataset_path: PathBuf) -> State<Arc<AppState>> {
        State(AppState::new(Config {
            port: 0,
            dataset_path,
        }))
    }

    fn state() -> State<Arc<AppState>> {
        state_with(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").join(BANK_PATH))
    }

    fn form(pairs: &[(&str, &str)]) -> FormResult {
        Ok(Form(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
    }

    async fn body(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn estimates(value: &Value) -> Vec<f64> {
        value["message"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());

        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{a} != {e}");
        }
    }

    #[tokio::test]
    async fn test_transportation() {
        let response = transportation_handler(
            state(),
            form(&[
                ("psmiles", "250"),
                ("pstype", "Car"),
                ("pbmiles", "60"),
                ("pbtype", "Bus"),
            ]),
        )
        .await
        .into_response();

        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_close(&estimates(&value), &[250.0 / 25.0 * 8.89, 60.0 / 6.0 * 10.21]);
    }

    #[tokio::test]
    async fn test_transportation_missing_field() {
        let response = transportation_handler(
            state(),
            form(&[("psmiles", "250"), ("pstype", "Car"), ("pbmiles", "60")]),
        )
        .await
        .into_response();

        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "All transportation fields are required.");
    }

    #[tokio::test]
    async fn test_energy() {
        let response = energy_handler(state(), form(&[("kwatt", "300"), ("energytype", "Coal")]))
            .await
            .into_response();

        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_close(&estimates(&value), &[300.0]);
    }

    #[tokio::test]
    async fn test_energy_unknown_subtype() {
        let response = energy_handler(
            state(),
            form(&[("kwatt", "300"), ("energytype", "Perpetual Motion")]),
        )
        .await
        .into_response();

        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            value["error"],
            "Subtype 'Perpetual Motion' not found in the dataset."
        );
    }

    #[tokio::test]
    async fn test_energy_invalid_quantity() {
        let response = energy_handler(state(), form(&[("kwatt", "lots"), ("energytype", "Coal")]))
            .await
            .into_response();

        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Invalid quantity 'lots' for field 'kwatt'.");
    }

    #[tokio::test]
    async fn test_waste() {
        let response = waste_handler(
            state(),
            form(&[("landfill", "10"), ("incineration", "20"), ("recycling", "30")]),
        )
        .await
        .into_response();

        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_close(&estimates(&value), &[10.0 * 0.58, 20.0 * 0.91, 30.0 * 0.11]);
    }

    #[tokio::test]
    async fn test_food() {
        let response = food_handler(
            state(),
            form(&[
                ("meat", "1"),
                ("dairy", "2"),
                ("small_fish", "3"),
                ("large_fish", "4"),
                ("fandv", "5"),
                ("bread", "6"),
                ("snack", "7"),
            ]),
        )
        .await
        .into_response();

        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_close(
            &estimates(&value),
            &[27.0, 6.4, 10.5, 21.6, 4.5, 9.6, 14.7],
        );
    }

    #[tokio::test]
    async fn test_food_empty_field() {
        let response = food_handler(
            state(),
            form(&[
                ("meat", "1"),
                ("dairy", "2"),
                ("small_fish", "3"),
                ("large_fish", "4"),
                ("fandv", "5"),
                ("bread", ""),
                ("snack", "7"),
            ]),
        )
        .await
        .into_response();

        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "All food fields are required.");
    }

    #[tokio::test]
    async fn test_dataset_missing() {
        let response = energy_handler(
            state_with(PathBuf::from("nowhere/co2.csv")),
            form(&[("kwatt", "300"), ("energytype", "Coal")]),
        )
        .await
        .into_response();

        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value["error"], "CO2 emission dataset file not found.");
    }

    #[tokio::test]
    async fn test_zero_conversion_rate() {
        let path = std::env::temp_dir().join(format!("zero_rate_{}.csv", std::process::id()));
        fs::write(&path, "SubType,CO2,conv_rate\nCoal,1.0,0\n").unwrap();

        let response = energy_handler(
            state_with(path.clone()),
            form(&[("kwatt", "1"), ("energytype", "Coal")]),
        )
        .await
        .into_response();
        fs::remove_file(&path).ok();

        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Conversion rate cannot be zero.");
    }

    #[tokio::test]
    async fn test_malformed_table() {
        let path = std::env::temp_dir().join(format!("malformed_{}.csv", std::process::id()));
        fs::write(&path, "SubType,CO2\nCoal,1.0\n").unwrap();

        let response = energy_handler(
            state_with(path.clone()),
            form(&[("kwatt", "1"), ("energytype", "Coal")]),
        )
        .await
        .into_response();
        fs::remove_file(&path).ok();

        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value["error"], "An unexpected error occurred.");
    }

    #[tokio::test]
    async fn test_urlencoded_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/energy")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("kwatt=50&energytype=Natural+Gas"))
            .unwrap();
        let form = Form::<Pairs>::from_request(request, &()).await;

        let (status, value) = body(energy_handler(state(), form).await.into_response()).await;
        assert_eq!(status, StatusCode::OK);
        assert_close(&estimates(&value), &[50.0 * 0.41]);
    }

    #[tokio::test]
    async fn test_repeated_field() {
        let request = Request::builder()
            .method("POST")
            .uri("/energy")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("kwatt=1&kwatt=2&energytype=Coal"))
            .unwrap();
        let form = Form::<Pairs>::from_request(request, &()).await;

        let (status, value) = body(energy_handler(state(), form).await.into_response()).await;
        assert_eq!(status, StatusCode::OK);
        assert_close(&estimates(&value), &[1.0]);
    }

    #[tokio::test]
    async fn test_out_of_range_estimate() {
        let response = food_handler(
            state(),
            form(&[
                ("meat", "1e308"),
                ("dairy", "1"),
                ("small_fish", "1"),
                ("large_fish", "1"),
                ("fandv", "1"),
                ("bread", "1"),
                ("snack", "1"),
            ]),
        )
        .await
        .into_response();

        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Estimate for 'Meat' is out of range.");
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let request = Request::builder()
            .method("POST")
            .uri("/energy")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"kwatt": 50}"#))
            .unwrap();
        let form = Form::<Pairs>::from_request(request, &()).await;
        assert!(form.is_err());

        let (status, value) = body(energy_handler(state(), form).await.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Bad Request");
    }

    #[tokio::test]
    async fn test_individual() {
        let response = individual_handler(form(&[
            ("name", "Ada"),
            ("email", "ada@example.com"),
            ("no_of_user", "3"),
            ("country", "UK"),
        ]))
        .await
        .into_response();

        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["message"], "Individual submission successful");

        let response = individual_handler(form(&[("name", "Ada")])).await.into_response();
        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "All fields are required.");
    }

    #[tokio::test]
    async fn test_company() {
        let response = company_handler(form(&[
            ("name", "Acme"),
            ("email", "ops@acme.test"),
            ("no_of_mem", "120"),
            ("country", "US"),
            ("cal_by", "month"),
        ]))
        .await
        .into_response();

        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["message"], "Company submission successful");

        let response = company_handler(form(&[
            ("name", "Acme"),
            ("email", "ops@acme.test"),
            ("no_of_mem", "120"),
            ("country", "US"),
        ]))
        .await
        .into_response();
        let (status, _) = body(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit() {
        let response = submit_handler(form(&[("name", "Ada"), ("email", "ada@example.com")]))
            .await
            .into_response();

        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["message"]["message"], "Form submitted successfully");

        let response = submit_handler(form(&[("email", "ada@example.com")])).await.into_response();
        let (status, value) = body(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Name and email are required.");
    }

    #[tokio::test]
    async fn test_not_found() {
        let (status, value) = body(not_found_handler().await.into_response()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["error"], "Resource Not Found");
    }
}
