//! Handler-level tests: handlers are called directly with constructed
//! extractors over a temporary database.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tempfile::NamedTempFile;

use hearts_db::DbPool;
use hearts_server::api::models::{
    CreateOpportunityRequest, CreateOrganizationRequest, CreateUserRequest,
    OpportunityListQuery, UpdateUserRequest, UserListQuery,
};
use hearts_server::api::{opportunities, organizations, users};
use hearts_server::{ApiError, AppState, Config};

async fn test_state() -> (AppState, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db_url = format!("sqlite://{}", temp_file.path().to_str().unwrap());
    let db = DbPool::connect(&db_url).await.unwrap();
    let state = AppState {
        config: Arc::new(Config::default()),
        db,
    };
    (state, temp_file)
}

fn org_request(name: &str, email: &str) -> CreateOrganizationRequest {
    CreateOrganizationRequest {
        name: Some(name.to_string()),
        description: Some("Neighborhood garden collective".to_string()),
        mission: None,
        website: None,
        logo: None,
        location: Some("Seattle, WA".to_string()),
        contact_email: Some(email.to_string()),
        contact_phone: None,
    }
}

fn opportunity_request(org_id: &str) -> CreateOpportunityRequest {
    CreateOpportunityRequest {
        title: Some("Garden Helper".to_string()),
        description: Some("Weed and water community plots".to_string()),
        long_description: None,
        category: Some("Environment".to_string()),
        location: Some("Seattle, WA".to_string()),
        duration: Some("3 hours weekly".to_string()),
        start_date: None,
        end_date: None,
        requirements: vec![],
        benefits: vec![],
        skills: vec![],
        max_volunteers: None,
        organization_id: Some(org_id.to_string()),
    }
}

fn user_request(email: &str) -> CreateUserRequest {
    CreateUserRequest {
        first_name: Some("Ruth".to_string()),
        last_name: Some("Okafor".to_string()),
        email: Some(email.to_string()),
        password: Some("a sturdy passphrase".to_string()),
        phone: None,
        location: Some("Seattle, WA".to_string()),
        interests: None,
        experience: None,
        availability: None,
    }
}

async fn create_org(state: &AppState, name: &str, email: &str) -> String {
    let (status, Json(body)) =
        organizations::create(State(state.clone()), Json(org_request(name, email)))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    body["organization"]["id"].as_str().unwrap().to_string()
}

fn default_list_query() -> OpportunityListQuery {
    OpportunityListQuery {
        page: 1,
        limit: 20,
        search: None,
        category: None,
        location: None,
        organization_id: None,
    }
}

#[tokio::test]
async fn test_opportunity_create_missing_fields_writes_nothing() {
    let (state, _guard) = test_state().await;
    let org_id = create_org(&state, "Green Thumb", "hello@greenthumb.org").await;

    for field in ["title", "description", "category", "location", "duration", "organizationId"] {
        let mut payload = opportunity_request(&org_id);
        match field {
            "title" => payload.title = None,
            "description" => payload.description = None,
            "category" => payload.category = None,
            "location" => payload.location = None,
            "duration" => payload.duration = None,
            _ => payload.organization_id = None,
        }

        let err = opportunities::create(State(state.clone()), Json(payload))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)), "field: {field}");
    }

    let Json(body) = opportunities::list(State(state.clone()), Query(default_list_query()))
        .await
        .unwrap();
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_opportunity_create_and_list_shapes() {
    let (state, _guard) = test_state().await;
    let org_id = create_org(&state, "Green Thumb", "hello@greenthumb.org").await;

    let mut payload = opportunity_request(&org_id);
    payload.requirements = vec!["A".to_string(), "B".to_string()];
    let (status, Json(body)) = opportunities::create(State(state.clone()), Json(payload))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Opportunity created successfully");
    assert_eq!(body["opportunity"]["requirements"][0], "A");
    assert_eq!(body["opportunity"]["requirements"][1], "B");
    assert_eq!(body["opportunity"]["organization"]["name"], "Green Thumb");

    let Json(body) = opportunities::list(State(state.clone()), Query(default_list_query()))
        .await
        .unwrap();
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 20);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["pagination"]["pages"], 1);
    assert_eq!(body["opportunities"][0]["applicationCount"], 0);
    assert_eq!(body["opportunities"][0]["organization"]["isVerified"], false);
}

#[tokio::test]
async fn test_opportunity_soft_delete_flow() {
    let (state, _guard) = test_state().await;
    let org_id = create_org(&state, "Green Thumb", "hello@greenthumb.org").await;

    let (_, Json(created)) =
        opportunities::create(State(state.clone()), Json(opportunity_request(&org_id)))
            .await
            .unwrap();
    let id = created["opportunity"]["id"].as_str().unwrap().to_string();

    let Json(body) = opportunities::remove(State(state.clone()), Path(id.clone()))
        .await
        .unwrap();
    assert_eq!(body["message"], "Opportunity deleted successfully");

    let Json(body) = opportunities::list(State(state.clone()), Query(default_list_query()))
        .await
        .unwrap();
    assert_eq!(body["pagination"]["total"], 0);

    // Still retrievable by id, inactive
    let Json(body) = opportunities::get_one(State(state.clone()), Path(id))
        .await
        .unwrap();
    assert_eq!(body["isActive"], false);

    // Second delete of a gone id is 404
    let err = opportunities::remove(State(state.clone()), Path("nope".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_organization_is_conflict() {
    let (state, _guard) = test_state().await;
    create_org(&state, "Green Thumb", "hello@greenthumb.org").await;

    let err = organizations::create(
        State(state.clone()),
        Json(org_request("Green Thumb", "other@greenthumb.org")),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_user_registration_and_conflict() {
    let (state, _guard) = test_state().await;

    let (status, Json(body)) =
        users::create(State(state.clone()), Json(user_request("ruth@example.com")))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "ruth@example.com");
    // Password material never leaves the server
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());

    let err = users::create(State(state.clone()), Json(user_request("ruth@example.com")))
        .await
        .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

    let mut incomplete = user_request("new@example.com");
    incomplete.password = None;
    let err = users::create(State(state.clone()), Json(incomplete))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn test_user_profile_and_update() {
    let (state, _guard) = test_state().await;

    let (_, Json(created)) =
        users::create(State(state.clone()), Json(user_request("ruth@example.com")))
            .await
            .unwrap();
    let id = created["user"]["id"].as_str().unwrap().to_string();

    let Json(profile) = users::get_profile(State(state.clone()), Path(id.clone()))
        .await
        .unwrap();
    assert_eq!(profile["stats"]["totalHours"], 0);
    assert_eq!(profile["stats"]["rating"], 0.0);
    assert!(profile["volunteeringHistory"].as_array().unwrap().is_empty());

    let Json(updated) = users::update(
        State(state.clone()),
        Path(id),
        Json(UpdateUserRequest {
            first_name: None,
            last_name: None,
            phone: Some("555-0100".to_string()),
            location: None,
            bio: None,
            interests: None,
            experience: None,
            availability: None,
            skills: None,
        }),
    )
    .await
    .unwrap();
    assert_eq!(updated["phone"], "555-0100");
    assert_eq!(updated["firstName"], "Ruth");

    let err = users::get_profile(State(state.clone()), Path("missing".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_admin_list() {
    let (state, _guard) = test_state().await;

    users::create(State(state.clone()), Json(user_request("ruth@example.com")))
        .await
        .unwrap();

    let Json(body) = users::list(
        State(state.clone()),
        Query(UserListQuery {
            page: 1,
            limit: 20,
            search: Some("ruth".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["users"][0]["counts"]["volunteeringHistory"], 0);
    // Minimal projection: no bio or interests in the admin list
    assert!(body["users"][0].get("bio").is_none());
    assert!(body["users"][0].get("interests").is_none());
}
