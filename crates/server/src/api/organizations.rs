//! Organization handlers

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use hearts_db::models::Pagination;
use hearts_db::organizations::{NewOrganization, OrganizationFilter};
use hearts_db::OrganizationRepo;

use crate::api::models::{non_empty, CreateOrganizationRequest, OrganizationListQuery};
use crate::error::ApiError;
use crate::AppState;

/// POST /organizations
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(name), Some(description), Some(location), Some(contact_email)) = (
        payload.name,
        payload.description,
        payload.location,
        payload.contact_email,
    ) else {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    };

    info!("Creating organization: {}", name);

    let repo = OrganizationRepo::new(state.db.clone());
    let organization = repo
        .create(&NewOrganization {
            name,
            description,
            mission: payload.mission,
            website: payload.website,
            logo: payload.logo,
            location,
            contact_email,
            contact_phone: payload.contact_phone,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Organization created successfully",
            "organization": organization,
        })),
    ))
}

/// GET /organizations
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OrganizationListQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = OrganizationFilter {
        page: query.page,
        limit: query.limit,
        search: non_empty(query.search),
        location: non_empty(query.location),
    };

    let repo = OrganizationRepo::new(state.db.clone());
    let (organizations, total) = repo.list(&filter).await?;

    Ok(Json(json!({
        "organizations": organizations,
        "pagination": Pagination::new(filter.page.max(1), filter.limit.max(1), total),
    })))
}
