use hearts_db::models::{new_id, now, Application, Pagination, ReviewRow, VolunteerHistory};
use hearts_db::opportunities::{NewOpportunity, OpportunityFilter, UpdateOpportunity};
use hearts_db::organizations::{NewOrganization, OrganizationFilter};
use hearts_db::users::{NewUser, UpdateProfile};
use hearts_db::{DbError, DbPool, OpportunityRepo, OrganizationRepo, UserRepo};
use tempfile::NamedTempFile;

async fn test_pool() -> (DbPool, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db_url = format!("sqlite://{}", temp_file.path().to_str().unwrap());
    let pool = DbPool::connect(&db_url).await.unwrap();
    (pool, temp_file)
}

fn sample_org(name: &str, email: &str) -> NewOrganization {
    NewOrganization {
        name: name.to_string(),
        description: "Community food bank".to_string(),
        mission: Some("End hunger".to_string()),
        website: None,
        logo: Some("/logos/foodbank.png".to_string()),
        location: "Portland, OR".to_string(),
        contact_email: email.to_string(),
        contact_phone: None,
    }
}

fn sample_opportunity(org_id: &str) -> NewOpportunity {
    NewOpportunity {
        title: "Meal Delivery Driver".to_string(),
        description: "Deliver meals to homebound seniors".to_string(),
        long_description: None,
        category: "Community Service".to_string(),
        location: "Portland, OR".to_string(),
        duration: "2 hours weekly".to_string(),
        start_date: None,
        end_date: None,
        requirements: vec!["Valid driver's license".to_string()],
        benefits: vec!["Mileage reimbursement".to_string()],
        skills: vec!["Driving".to_string()],
        max_volunteers: Some(10),
        organization_id: org_id.to_string(),
    }
}

fn sample_user(email: &str) -> NewUser {
    NewUser {
        first_name: "Margaret".to_string(),
        last_name: "Chen".to_string(),
        email: email.to_string(),
        password: "correct horse battery staple".to_string(),
        phone: None,
        location: "Portland, OR".to_string(),
        interests: vec!["Education".to_string(), "Environment".to_string()],
        experience: Some("Intermediate".to_string()),
        availability: Some("Weekends".to_string()),
    }
}

#[tokio::test]
async fn test_opportunity_arrays_round_trip() {
    let (pool, _guard) = test_pool().await;
    let orgs = OrganizationRepo::new(pool.clone());
    let opps = OpportunityRepo::new(pool);

    let org = orgs.create(&sample_org("Food Bank", "contact@foodbank.org")).await.unwrap();
    let mut new_opp = sample_opportunity(&org.id);
    new_opp.requirements = vec!["A".to_string(), "B".to_string()];

    let created = opps.create(&new_opp).await.unwrap();
    assert_eq!(created.requirements, vec!["A", "B"]);

    let detail = opps.get(&created.id).await.unwrap();
    assert_eq!(detail.opportunity.requirements, vec!["A", "B"]);
    assert_eq!(detail.opportunity.benefits, vec!["Mileage reimbursement"]);
}

#[tokio::test]
async fn test_opportunity_create_rejects_unknown_organization() {
    let (pool, _guard) = test_pool().await;
    let opps = OpportunityRepo::new(pool.clone());

    let err = opps.create(&sample_opportunity("no-such-org")).await.unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM opportunities")
        .fetch_one(pool.inner())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_duplicate_user_email_conflicts() {
    let (pool, _guard) = test_pool().await;
    let users = UserRepo::new(pool.clone());

    users.create(&sample_user("margaret@example.com")).await.unwrap();
    let err = users.create(&sample_user("margaret@example.com")).await.unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)));

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool.inner())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_duplicate_organization_name_or_email_conflicts() {
    let (pool, _guard) = test_pool().await;
    let orgs = OrganizationRepo::new(pool);

    orgs.create(&sample_org("Food Bank", "contact@foodbank.org")).await.unwrap();

    // Same name, different email
    let err = orgs
        .create(&sample_org("Food Bank", "other@foodbank.org"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)));

    // Same email, different name
    let err = orgs
        .create(&sample_org("Meal Wagon", "contact@foodbank.org"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)));
}

#[tokio::test]
async fn test_category_filter_excludes_inactive() {
    let (pool, _guard) = test_pool().await;
    let orgs = OrganizationRepo::new(pool.clone());
    let opps = OpportunityRepo::new(pool);

    let org = orgs.create(&sample_org("Tutors", "hello@tutors.org")).await.unwrap();

    let mut education = sample_opportunity(&org.id);
    education.category = "Education".to_string();
    let active = opps.create(&education).await.unwrap();

    let mut inactive = sample_opportunity(&org.id);
    inactive.category = "Education".to_string();
    inactive.title = "Retired role".to_string();
    let retired = opps.create(&inactive).await.unwrap();
    opps.soft_delete(&retired.id).await.unwrap();

    let mut other = sample_opportunity(&org.id);
    other.category = "Health".to_string();
    opps.create(&other).await.unwrap();

    let filter = OpportunityFilter {
        page: 1,
        limit: 20,
        category: Some("Education".to_string()),
        ..Default::default()
    };
    let (items, total) = opps.list(&filter).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, active.id);
    assert_eq!(items[0].category, "Education");
}

#[tokio::test]
async fn test_soft_delete_keeps_row_and_references() {
    let (pool, _guard) = test_pool().await;
    let orgs = OrganizationRepo::new(pool.clone());
    let opps = OpportunityRepo::new(pool.clone());
    let users = UserRepo::new(pool);

    let org = orgs.create(&sample_org("Food Bank", "contact@foodbank.org")).await.unwrap();
    let opp = opps.create(&sample_opportunity(&org.id)).await.unwrap();
    let user = users.create(&sample_user("vol@example.com")).await.unwrap();

    opps.apply(&Application {
        id: new_id(),
        status: "pending".to_string(),
        applied_at: now(),
        user_id: user.id.clone(),
        opportunity_id: opp.id.clone(),
    })
    .await
    .unwrap();

    opps.soft_delete(&opp.id).await.unwrap();

    // Absent from listings
    let filter = OpportunityFilter { page: 1, limit: 20, ..Default::default() };
    let (items, total) = opps.list(&filter).await.unwrap();
    assert_eq!(total, 0);
    assert!(items.is_empty());

    // Still retrievable by id, now inactive, applications intact
    let detail = opps.get(&opp.id).await.unwrap();
    assert!(!detail.opportunity.is_active);
    assert_eq!(detail.applications.len(), 1);
    assert_eq!(detail.applications[0].user.email, "vol@example.com");
}

#[tokio::test]
async fn test_pagination_forty_five_matches() {
    let (pool, _guard) = test_pool().await;
    let orgs = OrganizationRepo::new(pool.clone());
    let opps = OpportunityRepo::new(pool);

    let org = orgs.create(&sample_org("Big Org", "big@org.org")).await.unwrap();
    for i in 0..45 {
        let mut new_opp = sample_opportunity(&org.id);
        new_opp.title = format!("Role {i}");
        opps.create(&new_opp).await.unwrap();
    }

    let (page_one, total) = opps
        .list(&OpportunityFilter { page: 1, limit: 20, ..Default::default() })
        .await
        .unwrap();
    assert_eq!(page_one.len(), 20);
    assert_eq!(total, 45);
    assert_eq!(Pagination::new(1, 20, total).pages, 3);

    let (page_three, _) = opps
        .list(&OpportunityFilter { page: 3, limit: 20, ..Default::default() })
        .await
        .unwrap();
    assert_eq!(page_three.len(), 5);
}

#[tokio::test]
async fn test_profile_stats_cover_full_history() {
    let (pool, _guard) = test_pool().await;
    let users = UserRepo::new(pool);

    let user = users.create(&sample_user("busy@example.com")).await.unwrap();

    // 12 history rows across 3 organizations; only 10 come back in the
    // profile slice but stats must cover all 12.
    for i in 0..12 {
        users
            .add_history(&VolunteerHistory {
                id: new_id(),
                user_id: user.id.clone(),
                opportunity_id: Some(format!("opp-{i}")),
                title: format!("Assignment {i}"),
                organization: format!("Org {}", i % 3),
                start_date: format!("2024-{:02}-01T00:00:00+00:00", i + 1),
                end_date: None,
                hours: 5,
                status: "completed".to_string(),
            })
            .await
            .unwrap();
    }

    let profile = users.get_profile(&user.id).await.unwrap();
    assert_eq!(profile.volunteering_history.len(), 10);
    assert_eq!(profile.stats.total_hours, 60);
    assert_eq!(profile.stats.total_opportunities, 12);
    assert_eq!(profile.stats.total_organizations, 3);
    assert_eq!(profile.stats.rating, 0.0);
}

#[tokio::test]
async fn test_profile_rating_averages_public_reviews() {
    let (pool, _guard) = test_pool().await;
    let users = UserRepo::new(pool);

    let user = users.create(&sample_user("rated@example.com")).await.unwrap();
    for (rating, public) in [(5, true), (4, true), (1, false)] {
        users
            .add_review(&ReviewRow {
                id: new_id(),
                user_id: user.id.clone(),
                opportunity_id: None,
                organization_id: None,
                rating,
                comment: None,
                is_public: public,
                created_at: now(),
            })
            .await
            .unwrap();
    }

    let profile = users.get_profile(&user.id).await.unwrap();
    // Private review is excluded from both the list and the average
    assert_eq!(profile.reviews.len(), 2);
    assert!((profile.stats.rating - 4.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_missing_ids_are_not_found() {
    let (pool, _guard) = test_pool().await;
    let users = UserRepo::new(pool.clone());
    let opps = OpportunityRepo::new(pool);

    assert!(matches!(
        users.get_profile("nope").await.unwrap_err(),
        DbError::NotFound(_)
    ));
    assert!(matches!(
        opps.get("nope").await.unwrap_err(),
        DbError::NotFound(_)
    ));
    assert!(matches!(
        opps.soft_delete("nope").await.unwrap_err(),
        DbError::NotFound(_)
    ));
    assert!(matches!(
        users.update("nope", &UpdateProfile::default()).await.unwrap_err(),
        DbError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_partial_profile_update_keeps_absent_fields() {
    let (pool, _guard) = test_pool().await;
    let users = UserRepo::new(pool);

    let user = users.create(&sample_user("margaret@example.com")).await.unwrap();

    let updated = users
        .update(
            &user.id,
            &UpdateProfile {
                bio: Some("Retired teacher, avid gardener".to_string()),
                skills: Some(vec!["Tutoring".to_string(), "Gardening".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.first_name, "Margaret");
    assert_eq!(updated.location, "Portland, OR");
    assert_eq!(updated.bio.as_deref(), Some("Retired teacher, avid gardener"));
    assert_eq!(updated.skills, vec!["Tutoring", "Gardening"]);
    assert_eq!(updated.interests, vec!["Education", "Environment"]);
    assert_eq!(updated.email, "margaret@example.com");
}

#[tokio::test]
async fn test_opportunity_update_replaces_dates_and_arrays() {
    let (pool, _guard) = test_pool().await;
    let orgs = OrganizationRepo::new(pool.clone());
    let opps = OpportunityRepo::new(pool);

    let org = orgs.create(&sample_org("Food Bank", "contact@foodbank.org")).await.unwrap();
    let mut new_opp = sample_opportunity(&org.id);
    new_opp.start_date = Some("2025-01-01T00:00:00+00:00".to_string());
    let created = opps.create(&new_opp).await.unwrap();

    let updated = opps
        .update(
            &created.id,
            &UpdateOpportunity {
                title: Some("Meal Delivery Lead".to_string()),
                requirements: vec!["Leadership".to_string()],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Meal Delivery Lead");
    // Description untouched, dates nulled, arrays replaced
    assert_eq!(updated.description, created.description);
    assert!(updated.start_date.is_none());
    assert_eq!(updated.requirements, vec!["Leadership"]);
    assert!(updated.benefits.is_empty());
    assert!(updated.max_volunteers.is_none());
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn test_organization_list_counts_and_filters() {
    let (pool, _guard) = test_pool().await;
    let orgs = OrganizationRepo::new(pool.clone());
    let opps = OpportunityRepo::new(pool);

    let food = orgs.create(&sample_org("Food Bank", "contact@foodbank.org")).await.unwrap();
    orgs.create(&sample_org("Tutors United", "hello@tutors.org")).await.unwrap();
    opps.create(&sample_opportunity(&food.id)).await.unwrap();
    opps.create(&sample_opportunity(&food.id)).await.unwrap();

    let (all, total) = orgs
        .list(&OrganizationFilter { page: 1, limit: 20, ..Default::default() })
        .await
        .unwrap();
    assert_eq!(total, 2);
    let food_item = all.iter().find(|o| o.organization.name == "Food Bank").unwrap();
    assert_eq!(food_item.opportunity_count, 2);

    let (matched, total) = orgs
        .list(&OrganizationFilter {
            page: 1,
            limit: 20,
            search: Some("hunger".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(matched[0].organization.name, "Food Bank");
}

#[tokio::test]
async fn test_user_admin_list_search_and_counts() {
    let (pool, _guard) = test_pool().await;
    let users = UserRepo::new(pool);

    let margaret = users.create(&sample_user("margaret@example.com")).await.unwrap();
    let mut other = sample_user("bob@example.com");
    other.first_name = "Bob".to_string();
    other.location = "Austin, TX".to_string();
    users.create(&other).await.unwrap();

    users
        .add_history(&VolunteerHistory {
            id: new_id(),
            user_id: margaret.id.clone(),
            opportunity_id: None,
            title: "Garden volunteer".to_string(),
            organization: "Green Thumb".to_string(),
            start_date: now(),
            end_date: None,
            hours: 3,
            status: "active".to_string(),
        })
        .await
        .unwrap();

    let (items, total) = users.list(1, 20, Some("margaret")).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].counts.volunteering_history, 1);
    assert_eq!(items[0].counts.achievements, 0);

    let (items, total) = users.list(1, 20, Some("austin")).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].first_name, "Bob");
}
