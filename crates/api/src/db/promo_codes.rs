//! Promo code repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use orchard_core::{DiscountType, PromoCodeId};

use super::{RepositoryError, map_unique_violation};
use crate::models::PromoCode;

const COLUMNS: &str = "id, code, discount_type, discount_value, min_purchase_amount, \
                       max_discount_amount, valid_from, valid_until, usage_limit, used_count, \
                       is_active, created_at";

/// Input for creating or updating a promo code.
///
/// `code` is upper-cased before it is stored.
#[derive(Debug, Clone)]
pub struct PromoCodeDraft {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_purchase_amount: Decimal,
    pub max_discount_amount: Option<Decimal>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub usage_limit: Option<i32>,
    pub is_active: bool,
}

/// Repository for promo code database operations.
pub struct PromoCodeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PromoCodeRepository<'a> {
    /// Create a new promo code repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all promo codes, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<PromoCode>, RepositoryError> {
        let rows = sqlx::query_as::<_, PromoCode>(&format!(
            "SELECT {COLUMNS} FROM promo_code ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Look up a promo code, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<PromoCode>, RepositoryError> {
        let row = sqlx::query_as::<_, PromoCode>(&format!(
            "SELECT {COLUMNS} FROM promo_code WHERE code = $1"
        ))
        .bind(code.trim().to_uppercase())
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Create a new promo code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code already exists.
    pub async fn create(&self, draft: &PromoCodeDraft) -> Result<PromoCode, RepositoryError> {
        sqlx::query_as::<_, PromoCode>(&format!(
            "INSERT INTO promo_code (code, discount_type, discount_value, min_purchase_amount,
                                     max_discount_amount, valid_from, valid_until, usage_limit,
                                     is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        ))
        .bind(draft.code.trim().to_uppercase())
        .bind(draft.discount_type)
        .bind(draft.discount_value)
        .bind(draft.min_purchase_amount)
        .bind(draft.max_discount_amount)
        .bind(draft.valid_from)
        .bind(draft.valid_until)
        .bind(draft.usage_limit)
        .bind(draft.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "promo code already exists"))
    }

    /// Update an existing promo code. The usage counter is not editable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the code doesn't exist and
    /// `RepositoryError::Conflict` on a duplicate code.
    pub async fn update(
        &self,
        id: PromoCodeId,
        draft: &PromoCodeDraft,
    ) -> Result<PromoCode, RepositoryError> {
        sqlx::query_as::<_, PromoCode>(&format!(
            "UPDATE promo_code
             SET code = $2, discount_type = $3, discount_value = $4, min_purchase_amount = $5,
                 max_discount_amount = $6, valid_from = $7, valid_until = $8, usage_limit = $9,
                 is_active = $10
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(draft.code.trim().to_uppercase())
        .bind(draft.discount_type)
        .bind(draft.discount_value)
        .bind(draft.min_purchase_amount)
        .bind(draft.max_discount_amount)
        .bind(draft.valid_from)
        .bind(draft.valid_until)
        .bind(draft.usage_limit)
        .bind(draft.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "promo code already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a promo code.
    ///
    /// # Returns
    ///
    /// Returns `true` if the code was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: PromoCodeId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM promo_code WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Transaction-scoped helpers (order creation)
// =============================================================================

/// Re-load a promo code for redemption inside the order transaction.
///
/// `FOR UPDATE` locks the row so two concurrent orders cannot both pass the
/// usage-limit check on the same remaining slot.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_by_code(
    conn: &mut PgConnection,
    code: &str,
) -> Result<Option<PromoCode>, RepositoryError> {
    let row = sqlx::query_as::<_, PromoCode>(&format!(
        "SELECT {COLUMNS} FROM promo_code WHERE code = $1 FOR UPDATE"
    ))
    .bind(code.trim().to_uppercase())
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Record one redemption of a promo code.
///
/// Runs inside the order transaction; a later rollback undoes the increment.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the code doesn't exist.
pub async fn increment_usage(
    conn: &mut PgConnection,
    id: PromoCodeId,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE promo_code SET used_count = used_count + 1 WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}
