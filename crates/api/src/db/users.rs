//! User and cart repository.

use sqlx::{PgConnection, PgPool};

use orchard_core::{CartItemId, ProductId, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::{AppUser, CartItem};

const USER_COLUMNS: &str = "id, email, name, is_admin, created_at";
const CART_COLUMNS: &str = "id, user_id, product_id, quantity, size, color";

/// Repository for user and cart database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<AppUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AppUser>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(
        &self,
        email: &str,
        name: &str,
        is_admin: bool,
    ) -> Result<AppUser, RepositoryError> {
        sqlx::query_as::<_, AppUser>(&format!(
            "INSERT INTO app_user (email, name, is_admin)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(name)
        .bind(is_admin)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already exists"))
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// List a user's cart, oldest entries first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cart(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {CART_COLUMNS} FROM cart_item WHERE user_id = $1 ORDER BY id ASC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Add an item to the cart.
    ///
    /// Entries are keyed by (product, size, color): adding an existing triple
    /// increments its quantity instead of inserting a duplicate row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
        size: &str,
        color: &str,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItem>(&format!(
            "INSERT INTO cart_item (user_id, product_id, quantity, size, color)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id, product_id, size, color)
             DO UPDATE SET quantity = cart_item.quantity + EXCLUDED.quantity
             RETURNING {CART_COLUMNS}"
        ))
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(size)
        .bind(color)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Set the quantity of a cart entry the user owns.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry doesn't exist or
    /// belongs to another user.
    pub async fn set_cart_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        sqlx::query_as::<_, CartItem>(&format!(
            "UPDATE cart_item SET quantity = $3
             WHERE id = $1 AND user_id = $2
             RETURNING {CART_COLUMNS}"
        ))
        .bind(item_id)
        .bind(user_id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Remove a cart entry the user owns.
    ///
    /// # Returns
    ///
    /// Returns `true` if an entry was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_from_cart(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_item WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Empty a user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear_cart(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_item WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

/// Empty a user's cart inside the order-creation transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the delete fails.
pub async fn clear_cart(conn: &mut PgConnection, user_id: UserId) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM cart_item WHERE user_id = $1")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}
