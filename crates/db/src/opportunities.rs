//! Opportunity repository

use crate::error::DbError;
use crate::models::{
    encode_tags, new_id, now, Application, ApplicationSummary, ApplicationUserRow, Opportunity,
    OpportunityDetail, OpportunityListRow, OpportunityRow, OrgSummary, OrganizationPublic,
};
use crate::pool::DbPool;
use crate::Result;

/// Input for opportunity creation
#[derive(Debug, Clone)]
pub struct NewOpportunity {
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
    pub organization_id: String,
}

/// Full-field replace for an opportunity. Text fields left absent keep their
/// stored values; dates, arrays and max_volunteers are always overwritten
/// (absent dates null out, absent arrays become empty).
#[derive(Debug, Clone, Default)]
pub struct UpdateOpportunity {
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub duration: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
    pub skills: Vec<String>,
    pub max_volunteers: Option<i64>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

/// Filters for the opportunity list
#[derive(Debug, Clone, Default)]
pub struct OpportunityFilter {
    pub page: i64,
    pub limit: i64,
    pub search: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub organization_id: Option<String>,
}

/// Opportunity repository
pub struct OpportunityRepo {
    pool: DbPool,
}

impl OpportunityRepo {
    /// Create new opportunity repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create an opportunity; the returned record carries a summary of the
    /// posting organization. An unknown organization id is a validation
    /// failure, not a server fault.
    pub async fn create(&self, new_opp: &NewOpportunity) -> Result<Opportunity> {
        let org = sqlx::query_as::<_, (String, Option<String>)>(
            "SELECT name, logo FROM organizations WHERE id = ?",
        )
        .bind(&new_opp.organization_id)
        .fetch_optional(self.pool.inner())
        .await?
        .ok_or_else(|| DbError::Validation("Organization not found".to_string()))?;

        let id = new_id();
        let timestamp = now();

        sqlx::query(
            r#"
            INSERT INTO opportunities
                (id, title, description, long_description, category, location, duration,
                 start_date, end_date, requirements, benefits, skills, max_volunteers,
                 organization_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new_opp.title)
        .bind(&new_opp.description)
        .bind(&new_opp.long_description)
        .bind(&new_opp.category)
        .bind(&new_opp.location)
        .bind(&new_opp.duration)
        .bind(&new_opp.start_date)
        .bind(&new_opp.end_date)
        .bind(encode_tags(&new_opp.requirements))
        .bind(encode_tags(&new_opp.benefits))
        .bind(encode_tags(&new_opp.skills))
        .bind(new_opp.max_volunteers)
        .bind(&new_opp.organization_id)
        .bind(&timestamp)
        .bind(&timestamp)
        .execute(self.pool.inner())
        .await?;

        Ok(Opportunity {
            id,
            title: new_opp.title.clone(),
            description: new_opp.description.clone(),
            long_description: new_opp.long_description.clone(),
            category: new_opp.category.clone(),
            location: new_opp.location.clone(),
            duration: new_opp.duration.clone(),
            start_date: new_opp.start_date.clone(),
            end_date: new_opp.end_date.clone(),
            requirements: new_opp.requirements.clone(),
            benefits: new_opp.benefits.clone(),
            skills: new_opp.skills.clone(),
            max_volunteers: new_opp.max_volunteers,
            is_active: true,
            is_featured: false,
            organization_id: new_opp.organization_id.clone(),
            created_at: timestamp.clone(),
            updated_at: timestamp,
            organization: Some(OrgSummary {
                name: org.0,
                logo: org.1,
                is_verified: None,
            }),
            application_count: None,
        })
    }

    /// Fetch an opportunity row by id, active or not
    async fn get_row(&self, id: &str) -> Result<OpportunityRow> {
        sqlx::query_as::<_, OpportunityRow>("SELECT * FROM opportunities WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.inner())
            .await?
            .ok_or_else(|| DbError::NotFound("Opportunity not found".to_string()))
    }

    /// Fetch an opportunity with its organization's public fields and its
    /// applications (each with the applicant's name and email). Soft-deleted
    /// opportunities remain retrievable here.
    pub async fn get(&self, id: &str) -> Result<OpportunityDetail> {
        let row = self.get_row(id).await?;

        let organization = sqlx::query_as::<_, OrganizationPublic>(
            r#"
            SELECT id, name, description, mission, website, logo, location,
                   contact_email, contact_phone, is_verified
            FROM organizations
            WHERE id = ?
            "#,
        )
        .bind(&row.organization_id)
        .fetch_optional(self.pool.inner())
        .await?
        .ok_or_else(|| DbError::NotFound("Organization not found".to_string()))?;

        let applications = sqlx::query_as::<_, ApplicationUserRow>(
            r#"
            SELECT a.id, a.status, a.applied_at, u.first_name, u.last_name, u.email
            FROM applications a
            JOIN users u ON u.id = a.user_id
            WHERE a.opportunity_id = ?
            ORDER BY a.applied_at DESC
            "#,
        )
        .bind(id)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(OpportunityDetail {
            opportunity: row.into(),
            organization,
            applications: applications
                .into_iter()
                .map(ApplicationSummary::from)
                .collect(),
        })
    }

    /// Paginated filtered list of active opportunities, newest first, each
    /// with an organization summary and applicant count
    pub async fn list(&self, filter: &OpportunityFilter) -> Result<(Vec<Opportunity>, i64)> {
        let page = filter.page.max(1);
        let limit = filter.limit.max(1);
        let offset = (page - 1) * limit;

        let mut where_sql = String::from("WHERE o.is_active = 1");
        let mut binds: Vec<String> = Vec::new();

        if let Some(search) = &filter.search {
            where_sql.push_str(
                " AND (LOWER(o.title) LIKE ? OR LOWER(o.description) LIKE ? \
                 OR LOWER(o.long_description) LIKE ?)",
            );
            let pattern = format!("%{}%", search.to_lowercase());
            binds.extend(std::iter::repeat(pattern).take(3));
        }
        if let Some(category) = &filter.category {
            where_sql.push_str(" AND o.category = ?");
            binds.push(category.clone());
        }
        if let Some(location) = &filter.location {
            where_sql.push_str(" AND LOWER(o.location) LIKE ?");
            binds.push(format!("%{}%", location.to_lowercase()));
        }
        if let Some(organization_id) = &filter.organization_id {
            where_sql.push_str(" AND o.organization_id = ?");
            binds.push(organization_id.clone());
        }

        let sql = format!(
            r#"
            SELECT o.*,
                   g.name AS org_name, g.logo AS org_logo, g.is_verified AS org_verified,
                   (SELECT COUNT(*) FROM applications a WHERE a.opportunity_id = o.id)
                       AS application_count
            FROM opportunities o
            JOIN organizations g ON g.id = o.organization_id
            {where_sql}
            ORDER BY o.created_at DESC
            LIMIT {limit} OFFSET {offset}
            "#
        );
        let mut query = sqlx::query_as::<_, OpportunityListRow>(&sql);
        for bind in binds.clone() {
            query = query.bind(bind);
        }
        let rows = query.fetch_all(self.pool.inner()).await?;

        let count_sql = format!("SELECT COUNT(*) FROM opportunities o {where_sql}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in binds {
            count_query = count_query.bind(bind);
        }
        let total = count_query.fetch_one(self.pool.inner()).await?;

        Ok((rows.into_iter().map(Opportunity::from).collect(), total))
    }

    /// Full-field replace; returns the refreshed opportunity
    pub async fn update(&self, id: &str, update: &UpdateOpportunity) -> Result<Opportunity> {
        let result = sqlx::query(
            r#"
            UPDATE opportunities SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                long_description = COALESCE(?, long_description),
                category = COALESCE(?, category),
                location = COALESCE(?, location),
                duration = COALESCE(?, duration),
                start_date = ?,
                end_date = ?,
                requirements = ?,
                benefits = ?,
                skills = ?,
                max_volunteers = ?,
                is_active = COALESCE(?, is_active),
                is_featured = COALESCE(?, is_featured),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.long_description)
        .bind(&update.category)
        .bind(&update.location)
        .bind(&update.duration)
        .bind(&update.start_date)
        .bind(&update.end_date)
        .bind(encode_tags(&update.requirements))
        .bind(encode_tags(&update.benefits))
        .bind(encode_tags(&update.skills))
        .bind(update.max_volunteers)
        .bind(update.is_active)
        .bind(update.is_featured)
        .bind(now())
        .bind(id)
        .execute(self.pool.inner())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("Opportunity not found".to_string()));
        }

        Ok(self.get_row(id).await?.into())
    }

    /// Soft delete: mark inactive and touch the update timestamp. History and
    /// applications pointing at the opportunity are left in place.
    pub async fn soft_delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE opportunities SET is_active = 0, updated_at = ? WHERE id = ?",
        )
        .bind(now())
        .bind(id)
        .execute(self.pool.inner())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("Opportunity not found".to_string()));
        }
        Ok(())
    }

    /// Record a volunteer's application to an opportunity
    pub async fn apply(&self, application: &Application) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO applications (id, status, applied_at, user_id, opportunity_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&application.id)
        .bind(&application.status)
        .bind(&application.applied_at)
        .bind(&application.user_id)
        .bind(&application.opportunity_id)
        .execute(self.pool.inner())
        .await?;
        Ok(())
    }
}
