// src/models/sale.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::{activity::ActivityLog, user::User};

/// Represents the 'sales' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,

    /// Author of the sale. NULL once the author account is deleted.
    pub user_id: Option<i64>,

    pub product_name: String,

    pub amount: f64,

    pub posted_at: chrono::DateTime<chrono::Utc>,
}

/// Represents the 'commissions' table. Exactly one per sale.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Commission {
    pub id: i64,
    pub sale_id: i64,
    pub amount: f64,

    /// Human-readable note with the rate and the source amount.
    pub calculation_details: String,

    pub is_paid: bool,
    pub payment_date: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for recording a sale.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSaleRequest {
    #[validate(length(min = 1, max = 100))]
    pub product_name: String,
    #[validate(range(exclusive_min = 0.0, max = 1_000_000_000.0))]
    pub amount: f64,
}

/// Response after recording a sale.
#[derive(Debug, Serialize)]
pub struct CreateSaleResponse {
    pub sale: Sale,
    pub commission: Option<Commission>,
    pub message: String,
}

/// Totals shown on a staff member's profile.
#[derive(Debug, Serialize)]
pub struct SalesSummary {
    pub sales_count: i64,
    pub total_sales_amount: f64,
    pub total_commission: f64,
    pub recent_sales: Vec<Sale>,
}

/// Another user's sales figures, as seen by an admin.
#[derive(Debug, Serialize)]
pub struct UserSalesResponse {
    pub user: User,
    pub summary: SalesSummary,
}

/// CRM figures for the admin dashboard. Monthly values cover sales posted
/// since the first day of the current month.
#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    /// Admins and staff members.
    pub total_staff: i64,
    /// Regular academy users.
    pub total_users: i64,
    pub monthly_revenue: f64,
    pub monthly_commission: f64,
    pub active_courses: i64,
    pub recent_activities: Vec<ActivityLog>,
    pub latest_staff: Vec<User>,
}
