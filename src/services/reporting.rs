// src/services/reporting.rs

//! Sales figures shared by the staff summary, the per-user admin view and
//! the admin dashboard.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        activity::ActivityLog,
        sale::{AdminDashboard, Sale, SalesSummary},
        user::{ROLE_ADMIN, ROLE_NORMAL, ROLE_STAFF, User},
    },
};

const RECENT_SALES_LIMIT: i64 = 5;
const DASHBOARD_LIST_LIMIT: i64 = 5;

/// Totals and most recent sales of one author.
pub async fn sales_summary_for(pool: &SqlitePool, user_id: i64) -> Result<SalesSummary, AppError> {
    let (sales_count, total_sales_amount): (i64, f64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(amount), 0.0) FROM sales WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let total_commission: f64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(c.amount), 0.0)
        FROM commissions c
        JOIN sales s ON c.sale_id = s.id
        WHERE s.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let recent_sales = sqlx::query_as::<_, Sale>(
        r#"
        SELECT id, user_id, product_name, amount, posted_at
        FROM sales
        WHERE user_id = $1
        ORDER BY id DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(RECENT_SALES_LIMIT)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!(user_id, "Failed to fetch recent sales: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(SalesSummary {
        sales_count,
        total_sales_amount,
        total_commission,
        recent_sales,
    })
}

/// Midnight of the first day of `now`'s month, in the `posted_at` text format.
pub fn month_start(now: DateTime<Utc>) -> String {
    let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1).unwrap_or(now.date_naive());
    format!("{} 00:00:00", first.format("%Y-%m-%d"))
}

async fn count_role(pool: &SqlitePool, role: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
        .bind(role)
        .fetch_one(pool)
        .await
}

/// Head-count, this month's revenue and commission, course count, latest
/// activity and newest staff accounts.
pub async fn admin_dashboard(
    pool: &SqlitePool,
    now: DateTime<Utc>,
) -> Result<AdminDashboard, AppError> {
    let since = month_start(now);

    let total_staff = count_role(pool, ROLE_STAFF).await? + count_role(pool, ROLE_ADMIN).await?;
    let total_users = count_role(pool, ROLE_NORMAL).await?;

    let monthly_revenue: f64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0.0) FROM sales WHERE posted_at >= $1")
            .bind(&since)
            .fetch_one(pool)
            .await?;

    let monthly_commission: f64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(c.amount), 0.0)
        FROM commissions c
        JOIN sales s ON c.sale_id = s.id
        WHERE s.posted_at >= $1
        "#,
    )
    .bind(&since)
    .fetch_one(pool)
    .await?;

    let active_courses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
        .fetch_one(pool)
        .await?;

    let recent_activities = sqlx::query_as::<_, ActivityLog>(
        r#"
        SELECT id, user_id, action, target_type, target_id, created_at
        FROM activity_logs
        ORDER BY id DESC
        LIMIT $1
        "#,
    )
    .bind(DASHBOARD_LIST_LIMIT)
    .fetch_all(pool)
    .await?;

    let latest_staff = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, name, role, is_active, created_at
        FROM users
        WHERE role IN ($1, $2)
        ORDER BY created_at DESC, id DESC
        LIMIT $3
        "#,
    )
    .bind(ROLE_ADMIN)
    .bind(ROLE_STAFF)
    .bind(DASHBOARD_LIST_LIMIT)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch latest staff: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(AdminDashboard {
        total_staff,
        total_users,
        monthly_revenue,
        monthly_commission,
        active_courses,
        recent_activities,
        latest_staff,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{pool, seed_sale, seed_user};

    #[test]
    fn month_start_is_first_day_at_midnight() {
        let now = DateTime::parse_from_rfc3339("2025-03-17T15:42:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(month_start(now), "2025-03-01 00:00:00");
    }

    #[tokio::test]
    async fn summary_counts_only_the_authors_sales() {
        let pool = pool().await;
        let seller = seed_user(&pool, "seller", "staff").await;
        let other = seed_user(&pool, "other", "staff").await;
        seed_sale(&pool, Some(seller), 100.0).await;
        seed_sale(&pool, Some(seller), 50.5).await;
        seed_sale(&pool, Some(other), 999.0).await;

        let summary = sales_summary_for(&pool, seller).await.unwrap();
        assert_eq!(summary.sales_count, 2);
        assert_eq!(summary.total_sales_amount, 150.5);
        assert_eq!(summary.total_commission, 0.0);
        assert_eq!(summary.recent_sales.len(), 2);
    }

    #[tokio::test]
    async fn dashboard_revenue_covers_the_current_month_only() {
        let pool = pool().await;
        let seller = seed_user(&pool, "seller", "staff").await;
        seed_user(&pool, "boss", "admin").await;
        seed_user(&pool, "learner", "normal").await;
        seed_sale(&pool, Some(seller), 200.0).await;
        let old = seed_sale(&pool, Some(seller), 700.0).await;
        sqlx::query("UPDATE sales SET posted_at = '2000-01-15 10:00:00' WHERE id = $1")
            .bind(old.id)
            .execute(&pool)
            .await
            .unwrap();

        let dashboard = admin_dashboard(&pool, Utc::now()).await.unwrap();
        assert_eq!(dashboard.total_staff, 2);
        assert_eq!(dashboard.total_users, 1);
        assert_eq!(dashboard.monthly_revenue, 200.0);
        assert_eq!(dashboard.latest_staff.len(), 2);
    }
}
