//! Provisioning API surface.
//!
//! POST   /resources              create an instance (form: name, plan, team)
//! DELETE /resources/:instance    delete an instance
//! GET    /resources/plans        list the plan catalog
//! GET    /healthcheck            liveness check

use crate::core::instances::{CreateInstanceRequest, InstanceHandler};
use crate::core::plans::PlanCatalog;
use crate::domain::model::PlanSummary;
use crate::domain::ports::ResourceStore;
use crate::utils::error::{ProvisionError, StoreError};
use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use url::form_urlencoded;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
pub struct ApiState<S: ResourceStore> {
    pub instances: InstanceHandler<S>,
    pub plans: PlanCatalog<S>,
}

impl<S: ResourceStore + Clone> ApiState<S> {
    pub fn new(instances: InstanceHandler<S>) -> Self {
        let plans = instances.catalog().clone();
        Self { instances, plans }
    }
}

impl IntoResponse for ProvisionError {
    fn into_response(self) -> Response {
        match &self {
            ProvisionError::Validation(message) => {
                (StatusCode::BAD_REQUEST, message.clone()).into_response()
            }
            ProvisionError::Conflict { .. } => {
                (StatusCode::CONFLICT, self.to_string()).into_response()
            }
            ProvisionError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ProvisionError::Store(err) => {
                tracing::error!(error = %err, "Store failure");
                let status = match err {
                    StoreError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string()).into_response()
            }
        }
    }
}

pub fn build_router<S>(state: ApiState<S>) -> Router
where
    S: ResourceStore + Clone + 'static,
{
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/resources", post(create_instance::<S>))
        .route("/resources/plans", get(list_plans::<S>))
        .route("/resources/", delete(delete_unnamed_instance))
        .route("/resources/:instance", delete(delete_instance::<S>))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn healthcheck() -> &'static str {
    "WORKING"
}

async fn create_instance<S: ResourceStore + Clone + 'static>(
    State(state): State<ApiState<S>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<StatusCode, ProvisionError> {
    let request = form_request(&headers, query.as_deref(), &body);
    state.instances.create(request).await?;
    Ok(StatusCode::CREATED)
}

/// Reads form fields the way HTML form posts are read: body fields first when
/// the body is url-encoded, then query fields. Other bodies are ignored, so
/// missing fields fall through to the usual validation messages.
fn form_request(headers: &HeaderMap, query: Option<&str>, body: &[u8]) -> CreateInstanceRequest {
    let body_fields = if is_form_urlencoded(headers) { body } else { &[] };
    let query_fields = query.unwrap_or_default().as_bytes();
    CreateInstanceRequest::from_fields(
        form_urlencoded::parse(body_fields).chain(form_urlencoded::parse(query_fields)),
    )
}

fn is_form_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

async fn delete_instance<S: ResourceStore + Clone + 'static>(
    State(state): State<ApiState<S>>,
    Path(instance): Path<String>,
) -> Result<StatusCode, ProvisionError> {
    state.instances.delete(&instance).await?;
    Ok(StatusCode::OK)
}

/// `DELETE /resources/` carries an empty instance name.
async fn delete_unnamed_instance() -> ProvisionError {
    ProvisionError::validation("name is required")
}

async fn list_plans<S: ResourceStore + Clone + 'static>(
    State(state): State<ApiState<S>>,
) -> Result<Json<Vec<PlanSummary>>, ProvisionError> {
    let plans = state.plans.list_plans().await?;
    Ok(Json(plans))
}
