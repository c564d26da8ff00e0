//! Opportunity handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use hearts_db::models::Pagination;
use hearts_db::opportunities::{NewOpportunity, OpportunityFilter, UpdateOpportunity};
use hearts_db::OpportunityRepo;

use crate::api::models::{
    non_empty, CreateOpportunityRequest, OpportunityListQuery, UpdateOpportunityRequest,
};
use crate::error::ApiError;
use crate::AppState;

/// POST /opportunities
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateOpportunityRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(title), Some(description), Some(category), Some(location), Some(duration), Some(organization_id)) = (
        payload.title,
        payload.description,
        payload.category,
        payload.location,
        payload.duration,
        payload.organization_id,
    ) else {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    };

    info!("Creating opportunity: {}", title);

    let repo = OpportunityRepo::new(state.db.clone());
    let opportunity = repo
        .create(&NewOpportunity {
            title,
            description,
            long_description: payload.long_description,
            category,
            location,
            duration,
            start_date: payload.start_date,
            end_date: payload.end_date,
            requirements: payload.requirements,
            benefits: payload.benefits,
            skills: payload.skills,
            max_volunteers: payload.max_volunteers,
            organization_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Opportunity created successfully",
            "opportunity": opportunity,
        })),
    ))
}

/// GET /opportunities
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OpportunityListQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = OpportunityFilter {
        page: query.page,
        limit: query.limit,
        search: non_empty(query.search),
        category: non_empty(query.category),
        location: non_empty(query.location),
        organization_id: non_empty(query.organization_id),
    };

    let repo = OpportunityRepo::new(state.db.clone());
    let (opportunities, total) = repo.list(&filter).await?;

    Ok(Json(json!({
        "opportunities": opportunities,
        "pagination": Pagination::new(filter.page.max(1), filter.limit.max(1), total),
    })))
}

/// GET /opportunities/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let repo = OpportunityRepo::new(state.db.clone());
    let detail = repo.get(&id).await?;
    Ok(Json(json!(detail)))
}

/// PUT /opportunities/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateOpportunityRequest>,
) -> Result<Json<Value>, ApiError> {
    info!("Updating opportunity: {}", id);

    let repo = OpportunityRepo::new(state.db.clone());
    let opportunity = repo
        .update(
            &id,
            &UpdateOpportunity {
                title: payload.title,
                description: payload.description,
                long_description: payload.long_description,
                category: payload.category,
                location: payload.location,
                duration: payload.duration,
                start_date: payload.start_date,
                end_date: payload.end_date,
                requirements: payload.requirements,
                benefits: payload.benefits,
                skills: payload.skills,
                max_volunteers: payload.max_volunteers,
                is_active: payload.is_active,
                is_featured: payload.is_featured,
            },
        )
        .await?;

    Ok(Json(json!(opportunity)))
}

/// DELETE /opportunities/:id (soft delete)
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    info!("Soft-deleting opportunity: {}", id);

    let repo = OpportunityRepo::new(state.db.clone());
    repo.soft_delete(&id).await?;
    Ok(Json(json!({ "message": "Opportunity deleted successfully" })))
}
