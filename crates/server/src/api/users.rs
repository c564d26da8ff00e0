//! User handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use hearts_db::models::Pagination;
use hearts_db::users::{NewUser, UpdateProfile};
use hearts_db::UserRepo;

use crate::api::models::{non_empty, CreateUserRequest, UpdateUserRequest, UserListQuery};
use crate::error::ApiError;
use crate::AppState;

/// POST /users (registration)
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(first_name), Some(last_name), Some(email), Some(password), Some(location)) = (
        payload.first_name,
        payload.last_name,
        payload.email,
        payload.password,
        payload.location,
    ) else {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    };

    info!("Registering user: {}", email);

    let repo = UserRepo::new(state.db.clone());
    let user = repo
        .create(&NewUser {
            first_name,
            last_name,
            email,
            password,
            phone: payload.phone,
            location,
            interests: payload.interests.unwrap_or_default(),
            experience: payload.experience,
            availability: payload.availability,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": user,
        })),
    ))
}

/// GET /users (administrative list)
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Value>, ApiError> {
    let search = non_empty(query.search);
    let repo = UserRepo::new(state.db.clone());
    let (users, total) = repo.list(query.page, query.limit, search.as_deref()).await?;

    Ok(Json(json!({
        "users": users,
        "pagination": Pagination::new(query.page.max(1), query.limit.max(1), total),
    })))
}

/// GET /users/:id (profile with history, achievements, reviews and stats)
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let repo = UserRepo::new(state.db.clone());
    let profile = repo.get_profile(&id).await?;
    Ok(Json(json!(profile)))
}

/// PUT /users/:id (partial profile update; email and password untouched)
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    info!("Updating user profile: {}", id);

    let repo = UserRepo::new(state.db.clone());
    let user = repo
        .update(
            &id,
            &UpdateProfile {
                first_name: payload.first_name,
                last_name: payload.last_name,
                phone: payload.phone,
                location: payload.location,
                bio: payload.bio,
                interests: payload.interests,
                experience: payload.experience,
                availability: payload.availability,
                skills: payload.skills,
            },
        )
        .await?;

    Ok(Json(json!(user)))
}
