// src/services/commission.rs

use sqlx::SqliteConnection;

use crate::{
    error::AppError,
    models::{
        activity::Target,
        sale::{Commission, Sale},
    },
    services::activity::log_activity,
};

/// Result of a commission calculation.
///
/// Every variant except `Recorded` is terminal for that sale: callers
/// must not retry, in particular not on `AlreadyRecorded`.
#[derive(Debug)]
pub enum CommissionOutcome {
    Recorded(Commission),
    /// No sale, or a sale without an identity.
    InvalidSale,
    /// The sale has no (existing) author.
    MissingAuthor,
    /// A commission already exists for this sale.
    AlreadyRecorded,
}

impl CommissionOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, CommissionOutcome::Recorded(_))
    }

    pub fn into_commission(self) -> Option<Commission> {
        match self {
            CommissionOutcome::Recorded(c) => Some(c),
            _ => None,
        }
    }
}

/// `amount * rate`, rounded to cents (half away from zero).
pub fn commission_amount(sale_amount: f64, rate: f64) -> f64 {
    (sale_amount * rate * 100.0).round() / 100.0
}

pub fn calculation_note(sale_amount: f64, rate: f64) -> String {
    format!(
        "Calculated at {}% of a {:.2} sale.",
        (rate * 100.0 * 100.0).round() / 100.0,
        sale_amount
    )
}

/// Computes the commission of `sale` and inserts it on `conn`.
///
/// Nothing is committed here: the caller runs this inside the transaction
/// that writes the sale, so both rows land or neither does. Database
/// errors other than a unique violation on `sale_id` are returned as
/// `Err` and should roll that transaction back.
pub async fn calculate_commission(
    conn: &mut SqliteConnection,
    sale: Option<&Sale>,
    rate: f64,
) -> Result<CommissionOutcome, AppError> {
    let Some(sale) = sale.filter(|s| s.id > 0) else {
        tracing::warn!("Commission skipped: invalid sale");
        return Ok(CommissionOutcome::InvalidSale);
    };

    let author: Option<String> = match sale.user_id {
        Some(user_id) => sqlx::query_scalar("SELECT username FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?,
        None => None,
    };
    let (Some(author_id), Some(author)) = (sale.user_id, author) else {
        tracing::warn!(sale_id = sale.id, "Commission skipped: sale has no author");
        return Ok(CommissionOutcome::MissingAuthor);
    };

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM commissions WHERE sale_id = $1")
        .bind(sale.id)
        .fetch_optional(&mut *conn)
        .await?;
    if existing.is_some() {
        tracing::warn!(sale_id = sale.id, "Commission already recorded for sale");
        return Ok(CommissionOutcome::AlreadyRecorded);
    }

    let amount = commission_amount(sale.amount, rate);
    let inserted = sqlx::query_as::<_, Commission>(
        r#"
        INSERT INTO commissions (sale_id, amount, calculation_details)
        VALUES ($1, $2, $3)
        RETURNING id, sale_id, amount, calculation_details, is_paid, payment_date, created_at
        "#,
    )
    .bind(sale.id)
    .bind(amount)
    .bind(calculation_note(sale.amount, rate))
    .fetch_one(&mut *conn)
    .await;

    let commission = match inserted {
        Ok(c) => c,
        // Lost a race against a concurrent request for the same sale.
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            tracing::warn!(sale_id = sale.id, "Commission already recorded for sale");
            return Ok(CommissionOutcome::AlreadyRecorded);
        }
        Err(e) => return Err(e.into()),
    };

    log_activity(
        conn,
        author_id,
        &format!(
            "Commission of {:.2} calculated for {} ({} sale)",
            commission.amount, author, sale.product_name
        ),
        Some(Target::Commission(commission.id)),
    )
    .await;

    tracing::info!(
        sale_id = sale.id,
        commission_id = commission.id,
        amount = commission.amount,
        "Commission recorded"
    );

    Ok(CommissionOutcome::Recorded(commission))
}
