//! sqlx queries for the career-advice service. Each function acquires a
//! connection from the pool for one logical operation and releases it on
//! return.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::advice::models::{CareerRecommendation, SkillGap, TrendRow, UserProfileRow, UserSkillRow};

/// Fetches a user's profile; `None` when the user does not exist.
pub async fn fetch_user_profile(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<UserProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, UserProfileRow>(
        r#"
        SELECT u.full_name, u.email,
               p.current_role, p.target_role, p.experience_years,
               p.education_level, p.preferred_domains, p.bio
        FROM users u
        LEFT JOIN profiles p ON u.id = p.user_id
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Fetches a user's skills with proficiency, strongest first.
pub async fn fetch_user_skills(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<UserSkillRow>, sqlx::Error> {
    sqlx::query_as::<_, UserSkillRow>(
        r#"
        SELECT s.name AS skill_name, s.category,
               us.proficiency_level, us.years_of_experience
        FROM user_skills us
        JOIN skills s ON us.skill_id = s.id
        WHERE us.user_id = $1
        ORDER BY us.proficiency_level DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Fetches the most recent industry trends.
pub async fn fetch_trends(pool: &PgPool, limit: i64) -> Result<Vec<TrendRow>, sqlx::Error> {
    sqlx::query_as::<_, TrendRow>(
        r#"
        SELECT id, title, domain, description, source, created_at
        FROM trends
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Replaces the user's AI-generated skill gaps in one transaction: prior
/// AI-tagged rows go, the fresh analysis comes in. Manually curated gaps
/// (no "AI:" prefix) are untouched.
pub async fn save_skill_gaps(
    pool: &PgPool,
    user_id: Uuid,
    gaps: &[SkillGap],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM skill_gaps WHERE user_id = $1 AND reason LIKE $2")
        .bind(user_id)
        .bind("AI:%")
        .execute(&mut *tx)
        .await?;

    for gap in gaps {
        sqlx::query(
            r#"
            INSERT INTO skill_gaps (user_id, domain, skill_name, gap_level, reason)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(&gap.domain)
        .bind(&gap.skill_name)
        .bind(gap.gap_level)
        .bind(format!("AI: {}", gap.reason))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!("Saved {} skill gaps for user {user_id}", gaps.len());
    Ok(())
}

/// Appends AI-generated recommendations for the user.
pub async fn save_recommendations(
    pool: &PgPool,
    user_id: Uuid,
    recommendations: &[CareerRecommendation],
) -> Result<(), sqlx::Error> {
    for rec in recommendations {
        sqlx::query(
            r#"
            INSERT INTO recommendations (user_id, type, title, content, skill_name)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(&rec.rec_type)
        .bind(&rec.title)
        .bind(&rec.content)
        .bind(&rec.skill_name)
        .execute(pool)
        .await?;
    }
    info!(
        "Saved {} recommendations for user {user_id}",
        recommendations.len()
    );
    Ok(())
}
