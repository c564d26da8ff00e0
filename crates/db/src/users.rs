//! User management and repository

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::DbError;
use crate::models::{
    encode_tags, new_id, now, Achievement, ReviewEntry, ReviewRefRow, User, UserListItem,
    UserListRow, UserProfile, UserRow, UserStats, VolunteerHistory,
};
use crate::pool::DbPool;
use crate::Result;

/// Hash a password for storage; plaintext is never persisted
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, stored: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Input for user registration
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub location: String,
    pub interests: Vec<String>,
    pub experience: Option<String>,
    pub availability: Option<String>,
}

/// Partial profile update; absent fields keep their stored values.
/// Email and password are not mutable through this path.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
    pub experience: Option<String>,
    pub availability: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// User repository
pub struct UserRepo {
    pool: DbPool,
}

impl UserRepo {
    /// Create new user repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Register a new user. A duplicate email surfaces as a conflict via the
    /// UNIQUE constraint on users.email.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id = new_id();
        let password_hash = hash_password(&new_user.password)?;
        let timestamp = now();

        sqlx::query(
            r#"
            INSERT INTO users
                (id, first_name, last_name, email, password_hash, phone, location,
                 interests, skills, experience, availability, join_date, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email)
        .bind(&password_hash)
        .bind(&new_user.phone)
        .bind(&new_user.location)
        .bind(encode_tags(&new_user.interests))
        .bind(encode_tags(&[]))
        .bind(&new_user.experience)
        .bind(&new_user.availability)
        .bind(&timestamp)
        .bind(&timestamp)
        .execute(self.pool.inner())
        .await
        .map_err(|e| DbError::or_conflict(e, "User with this email already exists"))?;

        Ok(User {
            id,
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            email: new_user.email.clone(),
            phone: new_user.phone.clone(),
            location: new_user.location.clone(),
            bio: None,
            interests: new_user.interests.clone(),
            experience: new_user.experience.clone(),
            availability: new_user.availability.clone(),
            skills: Vec::new(),
            join_date: timestamp.clone(),
            is_active: true,
            updated_at: timestamp,
        })
    }

    /// Fetch a user row by id
    async fn get_row(&self, id: &str) -> Result<UserRow> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.inner())
            .await?
            .ok_or_else(|| DbError::NotFound("User not found".to_string()))
    }

    /// Fetch a full profile: the user, their 10 most recent history entries,
    /// 5 most recent achievements, up to 5 public reviews, and stats
    /// aggregated over the full history set (not just the returned slice).
    pub async fn get_profile(&self, id: &str) -> Result<UserProfile> {
        let row = self.get_row(id).await?;

        let history = sqlx::query_as::<_, VolunteerHistory>(
            r#"
            SELECT * FROM volunteer_history
            WHERE user_id = ?
            ORDER BY start_date DESC
            LIMIT 10
            "#,
        )
        .bind(id)
        .fetch_all(self.pool.inner())
        .await?;

        let achievements = sqlx::query_as::<_, Achievement>(
            r#"
            SELECT * FROM achievements
            WHERE user_id = ?
            ORDER BY earned_at DESC
            LIMIT 5
            "#,
        )
        .bind(id)
        .fetch_all(self.pool.inner())
        .await?;

        let reviews = sqlx::query_as::<_, ReviewRefRow>(
            r#"
            SELECT r.id, r.rating, r.comment, r.is_public, r.created_at,
                   o.title AS opportunity_title, g.name AS organization_name
            FROM reviews r
            LEFT JOIN opportunities o ON o.id = r.opportunity_id
            LEFT JOIN organizations g ON g.id = r.organization_id
            WHERE r.user_id = ? AND r.is_public = 1
            ORDER BY r.created_at DESC
            LIMIT 5
            "#,
        )
        .bind(id)
        .fetch_all(self.pool.inner())
        .await?;

        let (total_hours, total_opportunities, total_organizations) =
            sqlx::query_as::<_, (i64, i64, i64)>(
                r#"
                SELECT COALESCE(SUM(hours), 0),
                       COUNT(DISTINCT COALESCE(opportunity_id, id)),
                       COUNT(DISTINCT organization)
                FROM volunteer_history
                WHERE user_id = ?
                "#,
            )
            .bind(id)
            .fetch_one(self.pool.inner())
            .await?;

        let rating = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(rating) FROM reviews WHERE user_id = ? AND is_public = 1",
        )
        .bind(id)
        .fetch_one(self.pool.inner())
        .await?
        .unwrap_or(0.0);

        Ok(UserProfile {
            user: row.into(),
            volunteering_history: history,
            achievements,
            reviews: reviews.into_iter().map(ReviewEntry::from).collect(),
            stats: UserStats {
                total_hours,
                total_opportunities,
                total_organizations,
                rating,
            },
        })
    }

    /// Partial profile update; returns the refreshed user
    pub async fn update(&self, id: &str, update: &UpdateProfile) -> Result<User> {
        let interests = update.interests.as_deref().map(encode_tags);
        let skills = update.skills.as_deref().map(encode_tags);

        let result = sqlx::query(
            r#"
            UPDATE users SET
                first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                phone = COALESCE(?, phone),
                location = COALESCE(?, location),
                bio = COALESCE(?, bio),
                interests = COALESCE(?, interests),
                experience = COALESCE(?, experience),
                availability = COALESCE(?, availability),
                skills = COALESCE(?, skills),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.phone)
        .bind(&update.location)
        .bind(&update.bio)
        .bind(&interests)
        .bind(&update.experience)
        .bind(&update.availability)
        .bind(&skills)
        .bind(now())
        .bind(id)
        .execute(self.pool.inner())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("User not found".to_string()));
        }

        Ok(self.get_row(id).await?.into())
    }

    /// Administrative list: minimal projection with history/achievement
    /// counts, newest joiners first
    pub async fn list(
        &self,
        page: i64,
        limit: i64,
        search: Option<&str>,
    ) -> Result<(Vec<UserListItem>, i64)> {
        let page = page.max(1);
        let limit = limit.max(1);
        let offset = (page - 1) * limit;

        let mut where_sql = String::from("WHERE 1 = 1");
        let mut binds: Vec<String> = Vec::new();

        if let Some(search) = search {
            where_sql.push_str(
                " AND (LOWER(first_name) LIKE ? OR LOWER(last_name) LIKE ? \
                 OR LOWER(email) LIKE ? OR LOWER(location) LIKE ?)",
            );
            let pattern = format!("%{}%", search.to_lowercase());
            binds.extend(std::iter::repeat(pattern).take(4));
        }

        let sql = format!(
            r#"
            SELECT id, first_name, last_name, email, location, join_date, is_active,
                   (SELECT COUNT(*) FROM volunteer_history h WHERE h.user_id = users.id)
                       AS history_count,
                   (SELECT COUNT(*) FROM achievements a WHERE a.user_id = users.id)
                       AS achievement_count
            FROM users
            {where_sql}
            ORDER BY join_date DESC
            LIMIT {limit} OFFSET {offset}
            "#
        );
        let mut query = sqlx::query_as::<_, UserListRow>(&sql);
        for bind in binds.clone() {
            query = query.bind(bind);
        }
        let rows = query.fetch_all(self.pool.inner()).await?;

        let count_sql = format!("SELECT COUNT(*) FROM users {where_sql}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in binds {
            count_query = count_query.bind(bind);
        }
        let total = count_query.fetch_one(self.pool.inner()).await?;

        Ok((rows.into_iter().map(UserListItem::from).collect(), total))
    }

    /// Record a volunteer history entry for a user
    pub async fn add_history(&self, entry: &VolunteerHistory) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO volunteer_history
                (id, user_id, opportunity_id, title, organization,
                 start_date, end_date, hours, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(&entry.opportunity_id)
        .bind(&entry.title)
        .bind(&entry.organization)
        .bind(&entry.start_date)
        .bind(&entry.end_date)
        .bind(entry.hours)
        .bind(&entry.status)
        .execute(self.pool.inner())
        .await?;
        Ok(())
    }

    /// Award an achievement to a user
    pub async fn add_achievement(&self, achievement: &Achievement) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO achievements (id, user_id, title, description, icon, earned_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&achievement.id)
        .bind(&achievement.user_id)
        .bind(&achievement.title)
        .bind(&achievement.description)
        .bind(&achievement.icon)
        .bind(&achievement.earned_at)
        .execute(self.pool.inner())
        .await?;
        Ok(())
    }

    /// Record a review written by a user
    pub async fn add_review(&self, review: &crate::models::ReviewRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reviews
                (id, user_id, opportunity_id, organization_id, rating, comment,
                 is_public, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&review.id)
        .bind(&review.user_id)
        .bind(&review.opportunity_id)
        .bind(&review.organization_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.is_public)
        .bind(&review.created_at)
        .execute(self.pool.inner())
        .await?;
        Ok(())
    }

    /// Fetch a user's stored password hash (login support)
    pub async fn password_hash(&self, email: &str) -> Result<Option<String>> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.pool.inner())
        .await?;
        Ok(hash)
    }
}
