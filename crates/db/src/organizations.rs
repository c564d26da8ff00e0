//! Organization repository

use crate::error::DbError;
use crate::models::{new_id, now, Organization, OrganizationListItem, OrganizationListRow};
use crate::pool::DbPool;
use crate::Result;

/// Input for organization creation
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub description: String,
    pub mission: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
    pub location: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
}

/// Filters for the organization list
#[derive(Debug, Clone, Default)]
pub struct OrganizationFilter {
    pub page: i64,
    pub limit: i64,
    pub search: Option<String>,
    pub location: Option<String>,
}

/// Organization repository
pub struct OrganizationRepo {
    pool: DbPool,
}

impl OrganizationRepo {
    /// Create new organization repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create an organization. Duplicate name or contact email surfaces as a
    /// conflict via the UNIQUE constraints on both columns.
    pub async fn create(&self, new_org: &NewOrganization) -> Result<Organization> {
        let id = new_id();
        let timestamp = now();

        sqlx::query(
            r#"
            INSERT INTO organizations
                (id, name, description, mission, website, logo, location,
                 contact_email, contact_phone, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new_org.name)
        .bind(&new_org.description)
        .bind(&new_org.mission)
        .bind(&new_org.website)
        .bind(&new_org.logo)
        .bind(&new_org.location)
        .bind(&new_org.contact_email)
        .bind(&new_org.contact_phone)
        .bind(&timestamp)
        .bind(&timestamp)
        .execute(self.pool.inner())
        .await
        .map_err(|e| {
            DbError::or_conflict(e, "Organization with this name or email already exists")
        })?;

        Ok(Organization {
            id,
            name: new_org.name.clone(),
            description: new_org.description.clone(),
            mission: new_org.mission.clone(),
            website: new_org.website.clone(),
            logo: new_org.logo.clone(),
            location: new_org.location.clone(),
            contact_email: new_org.contact_email.clone(),
            contact_phone: new_org.contact_phone.clone(),
            is_verified: false,
            is_active: true,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        })
    }

    /// Paginated filtered list of active organizations, newest first, each
    /// with a count of its opportunities
    pub async fn list(&self, filter: &OrganizationFilter) -> Result<(Vec<OrganizationListItem>, i64)> {
        let page = filter.page.max(1);
        let limit = filter.limit.max(1);
        let offset = (page - 1) * limit;

        let mut where_sql = String::from("WHERE g.is_active = 1");
        let mut binds: Vec<String> = Vec::new();

        if let Some(search) = &filter.search {
            where_sql.push_str(
                " AND (LOWER(g.name) LIKE ? OR LOWER(g.description) LIKE ? \
                 OR LOWER(g.mission) LIKE ?)",
            );
            let pattern = format!("%{}%", search.to_lowercase());
            binds.extend(std::iter::repeat(pattern).take(3));
        }
        if let Some(location) = &filter.location {
            where_sql.push_str(" AND LOWER(g.location) LIKE ?");
            binds.push(format!("%{}%", location.to_lowercase()));
        }

        let sql = format!(
            r#"
            SELECT g.*,
                   (SELECT COUNT(*) FROM opportunities o WHERE o.organization_id = g.id)
                       AS opportunity_count
            FROM organizations g
            {where_sql}
            ORDER BY g.created_at DESC
            LIMIT {limit} OFFSET {offset}
            "#
        );
        let mut query = sqlx::query_as::<_, OrganizationListRow>(&sql);
        for bind in binds.clone() {
            query = query.bind(bind);
        }
        let rows = query.fetch_all(self.pool.inner()).await?;

        let count_sql = format!("SELECT COUNT(*) FROM organizations g {where_sql}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in binds {
            count_query = count_query.bind(bind);
        }
        let total = count_query.fetch_one(self.pool.inner()).await?;

        Ok((rows.into_iter().map(OrganizationListItem::from).collect(), total))
    }
}
