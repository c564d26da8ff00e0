//! Database rows and API-facing entities.
//!
//! Tag-list columns (interests, skills, requirements, benefits) are stored
//! as JSON text for SQLite portability. Encoding and decoding happen only
//! here; repositories and handlers traffic exclusively in `Vec<String>`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Generate a fresh record id
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time as an RFC3339 string, the storage format for all timestamps
pub fn now() -> String {
    Utc::now().to_rfc3339()
}

/// Encode an ordered tag list into its JSON text column form
pub fn encode_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a JSON text column back into an ordered tag list.
/// Absent or malformed stored text reads back as an empty list.
pub fn decode_tags(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

// ========== Users ==========

/// Database row for the users table
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub location: String,
    pub bio: Option<String>,
    pub interests: String,
    pub experience: Option<String>,
    pub availability: Option<String>,
    pub skills: String,
    pub join_date: String,
    pub is_active: bool,
    pub updated_at: String,
}

/// User profile as exposed over the API (no password material)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: String,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    pub experience: Option<String>,
    pub availability: Option<String>,
    pub skills: Vec<String>,
    pub join_date: String,
    pub is_active: bool,
    pub updated_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            location: row.location,
            bio: row.bio,
            interests: decode_tags(&row.interests),
            experience: row.experience,
            availability: row.availability,
            skills: decode_tags(&row.skills),
            join_date: row.join_date,
            is_active: row.is_active,
            updated_at: row.updated_at,
        }
    }
}

/// Row shape for the administrative user list (minimal projection + counts)
#[derive(Debug, Clone, FromRow)]
pub struct UserListRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub location: String,
    pub join_date: String,
    pub is_active: bool,
    pub history_count: i64,
    pub achievement_count: i64,
}

/// Record counts attached to an administrative user listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
    pub volunteering_history: i64,
    pub achievements: i64,
}

/// Administrative user listing entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListItem {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub location: String,
    pub join_date: String,
    pub is_active: bool,
    pub counts: UserCounts,
}

impl From<UserListRow> for UserListItem {
    fn from(row: UserListRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            location: row.location,
            join_date: row.join_date,
            is_active: row.is_active,
            counts: UserCounts {
                volunteering_history: row.history_count,
                achievements: row.achievement_count,
            },
        }
    }
}

/// Derived profile statistics, aggregated over the full history set
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_hours: i64,
    pub total_opportunities: i64,
    pub total_organizations: i64,
    pub rating: f64,
}

/// Full user profile: the user plus recent activity and derived stats
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub volunteering_history: Vec<VolunteerHistory>,
    pub achievements: Vec<Achievement>,
    pub reviews: Vec<ReviewEntry>,
    pub stats: UserStats,
}

// ========== Organizations ==========

/// Database row for the organizations table
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub mission: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
    pub location: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Organization as exposed over the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub description: String,
    pub mission: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
    pub location: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrganizationRow> for Organization {
    fn from(row: OrganizationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            mission: row.mission,
            website: row.website,
            logo: row.logo,
            location: row.location,
            contact_email: row.contact_email,
            contact_phone: row.contact_phone,
            is_verified: row.is_verified,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row shape for the organization list (organization + opportunity count)
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationListRow {
    #[sqlx(flatten)]
    pub organization: OrganizationRow,
    pub opportunity_count: i64,
}

/// Organization listing entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationListItem {
    #[serde(flatten)]
    pub organization: Organization,
    pub opportunity_count: i64,
}

impl From<OrganizationListRow> for OrganizationListItem {
    fn from(row: OrganizationListRow) -> Self {
        Self {
            organization: row.organization.into(),
            opportunity_count: row.opportunity_count,
        }
    }
}

/// Public organization fields nested into an opportunity detail
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationPublic {
    pub id: String,
    pub name: String,
    pub description: String,
    pub mission: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
    pub location: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub is_verified: bool,
}

/// Short organization summary nested into opportunity payloads
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgSummary {
    pub name: String,
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
}

// ========== Opportunities ==========

/// Database row for the opportunities table
#[derive(Debug, Clone, FromRow)]
pub struct OpportunityRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub category: String,
    pub location: String,
    pub duration: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub requirements: String,
    pub benefits: String,
    pub skills: String,
    pub max_volunteers: Option<i64>,
    pub is_active: bool,
    pub is_featured: bool,
    pub organization_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Opportunity as exposed over the API, arrays decoded
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub category: String,
    pub location: String,
    pub duration: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
    pub skills: Vec<String>,
    pub max_volunteers: Option<i64>,
    pub is_active: bool,
    pub is_featured: bool,
    pub organization_id: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrgSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_count: Option<i64>,
}

impl From<OpportunityRow> for Opportunity {
    fn from(row: OpportunityRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            long_description: row.long_description,
            category: row.category,
            location: row.location,
            duration: row.duration,
            start_date: row.start_date,
            end_date: row.end_date,
            requirements: decode_tags(&row.requirements),
            benefits: decode_tags(&row.benefits),
            skills: decode_tags(&row.skills),
            max_volunteers: row.max_volunteers,
            is_active: row.is_active,
            is_featured: row.is_featured,
            organization_id: row.organization_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            organization: None,
            application_count: None,
        }
    }
}

/// Row shape for the opportunity list (opportunity + org summary + count)
#[derive(Debug, Clone, FromRow)]
pub struct OpportunityListRow {
    #[sqlx(flatten)]
    pub opportunity: OpportunityRow,
    pub org_name: String,
    pub org_logo: Option<String>,
    pub org_verified: bool,
    pub application_count: i64,
}

impl From<OpportunityListRow> for Opportunity {
    fn from(row: OpportunityListRow) -> Self {
        let mut opportunity: Opportunity = row.opportunity.into();
        opportunity.organization = Some(OrgSummary {
            name: row.org_name,
            logo: row.org_logo,
            is_verified: Some(row.org_verified),
        });
        opportunity.application_count = Some(row.application_count);
        opportunity
    }
}

/// Opportunity detail: the opportunity plus its organization and applications
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityDetail {
    #[serde(flatten)]
    pub opportunity: Opportunity,
    pub organization: OrganizationPublic,
    pub applications: Vec<ApplicationSummary>,
}

// ========== Applications ==========

/// Database row for the applications table
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub status: String,
    pub applied_at: String,
    pub user_id: String,
    pub opportunity_id: String,
}

/// Row shape for an application joined with its applicant
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationUserRow {
    pub id: String,
    pub status: String,
    pub applied_at: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Applicant identity nested into an application summary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Application as nested into an opportunity detail
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    pub id: String,
    pub status: String,
    pub applied_at: String,
    pub user: ApplicantInfo,
}

impl From<ApplicationUserRow> for ApplicationSummary {
    fn from(row: ApplicationUserRow) -> Self {
        Self {
            id: row.id,
            status: row.status,
            applied_at: row.applied_at,
            user: ApplicantInfo {
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
            },
        }
    }
}

// ========== Volunteer history ==========

/// A completed or active assignment record, with an organization name
/// snapshot so history survives organization changes
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerHistory {
    pub id: String,
    pub user_id: String,
    pub opportunity_id: Option<String>,
    pub title: String,
    pub organization: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub hours: i64,
    pub status: String,
}

// ========== Achievements ==========

/// An awarded badge
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub earned_at: String,
}

// ========== Reviews ==========

/// Database row for the reviews table
#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    pub id: String,
    pub user_id: String,
    pub opportunity_id: Option<String>,
    pub organization_id: Option<String>,
    pub rating: i64,
    pub comment: Option<String>,
    pub is_public: bool,
    pub created_at: String,
}

/// Row shape for a review joined with its opportunity/organization names
#[derive(Debug, Clone, FromRow)]
pub struct ReviewRefRow {
    pub id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub is_public: bool,
    pub created_at: String,
    pub opportunity_title: Option<String>,
    pub organization_name: Option<String>,
}

/// Reference to the reviewed opportunity
#[derive(Debug, Clone, Serialize)]
pub struct OpportunityRef {
    pub title: String,
}

/// Reference to the reviewed organization
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationRef {
    pub name: String,
}

/// Review as nested into a user profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    pub id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub is_public: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunity: Option<OpportunityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrganizationRef>,
}

impl From<ReviewRefRow> for ReviewEntry {
    fn from(row: ReviewRefRow) -> Self {
        Self {
            id: row.id,
            rating: row.rating,
            comment: row.comment,
            is_public: row.is_public,
            created_at: row.created_at,
            opportunity: row.opportunity_title.map(|title| OpportunityRef { title }),
            organization: row.organization_name.map(|name| OrganizationRef { name }),
        }
    }
}

// ========== Pagination ==========

/// Pagination block attached to every list response
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    /// Build a pagination block; `pages` is the ceiling of total/limit
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self { page, limit, total, pages }
    }
}
