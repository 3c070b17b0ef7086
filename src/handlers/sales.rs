// src/handlers/sales.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        activity::Target,
        sale::{CreateSaleRequest, CreateSaleResponse, Sale},
    },
    services::{
        activity::log_activity,
        commission::{CommissionOutcome, calculate_commission},
        reporting::sales_summary_for,
    },
    utils::jwt::Claims,
};

/// Records a sale for the caller and its commission in one transaction.
/// Staff only.
pub async fn create_sale(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateSaleRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    let mut tx = pool.begin().await?;

    let sale = sqlx::query_as::<_, Sale>(
        r#"
        INSERT INTO sales (user_id, product_name, amount)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, product_name, amount, posted_at
        "#,
    )
    .bind(user_id)
    .bind(payload.product_name.trim())
    .bind(payload.amount)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(user_id, "Failed to insert sale: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    log_activity(
        &mut tx,
        user_id,
        &format!("Recorded sale '{}' ({:.2})", sale.product_name, sale.amount),
        Some(Target::Sale(sale.id)),
    )
    .await;

    let outcome = calculate_commission(&mut tx, Some(&sale), config.commission_rate).await?;

    tx.commit().await.map_err(|e| {
        tracing::error!(user_id, sale_id = sale.id, "Failed to commit sale: {:?}", e);
        AppError::from(e)
    })?;

    let message = match &outcome {
        CommissionOutcome::Recorded(c) => format!("Sale recorded. Commission: {:.2}", c.amount),
        _ => "Sale recorded without commission.".to_string(),
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateSaleResponse {
            sale,
            commission: outcome.into_commission(),
            message,
        }),
    ))
}

/// The caller's sales totals and most recent sales.
/// Staff only.
pub async fn sales_summary(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let summary = sales_summary_for(&pool, user_id).await?;
    Ok(Json(summary))
}
