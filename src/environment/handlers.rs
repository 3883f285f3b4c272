//! `GET|POST /api/environment/set`.

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Serialize, Deserialize)]
pub struct EnvironmentStatus {
    pub environment: String,
    pub backend_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub available: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetEnvironment {
    #[serde(default)]
    pub environment: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetEnvironmentResponse {
    pub success: bool,
    pub environment: String,
}

pub async fn get_environment(State(state): State<AppState>) -> Json<EnvironmentStatus> {
    let current = state.environments.get();
    Json(EnvironmentStatus {
        environment: current.name.clone(),
        backend_url: current.backend_url.clone(),
        display_name: state.environments.display_name(&current.name).map(String::from),
        available: state.environments.names().into_iter().map(String::from).collect(),
    })
}

pub async fn set_environment(State(state): State<AppState>, body: Bytes) -> Response {
    let request: SetEnvironment = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return ApiError::bad_request("Invalid environment data")
                .with_error(e.to_string())
                .into_response();
        }
    };
    if request.environment.is_empty() {
        return ApiError::bad_request("Invalid environment data")
            .with_error("environment is required")
            .into_response();
    }

    match state.environments.set(&request.environment) {
        Ok(env) => {
            metrics::record_environment_switch(&env.name);
            Json(SetEnvironmentResponse {
                success: true,
                environment: env.name.clone(),
            })
            .into_response()
        }
        Err(e) => ApiError::bad_request("Invalid environment data")
            .with_error(e.to_string())
            .into_response(),
    }
}
