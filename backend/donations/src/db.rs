//! Database layer — pool setup, migrations, and donation queries.
//!
//! Every mutation runs in its own transaction. A transaction that is dropped
//! before `commit` is rolled back, so an early `?` return never leaves a
//! partial write behind.

use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::info;

use crate::errors::Result;
use crate::models::{Donation, DonationStatus, NewDonation};

const DONATION_COLUMNS: &str = "id, name, donor, donor_phone, donorAddress, receiverAddress, \
     receiverPhone, servings, distance, readyTime, status, icon, foodType";

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Reads
// ─────────────────────────────────────────────────────────

/// Fetch every donation, oldest first.
pub async fn list_donations(pool: &SqlitePool) -> Result<Vec<Donation>> {
    let rows = sqlx::query_as::<_, Donation>(&format!(
        "SELECT {DONATION_COLUMNS} FROM donations ORDER BY id ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ─────────────────────────────────────────────────────────
// Writes
// ─────────────────────────────────────────────────────────

/// Insert a new pending donation and return the stored row.
pub async fn insert_donation(pool: &SqlitePool, new: &NewDonation) -> Result<Donation> {
    let mut tx = pool.begin().await?;

    let donation = sqlx::query_as::<_, Donation>(&format!(
        r#"
        INSERT INTO donations
            (name, donor, donor_phone, donorAddress, receiverAddress, receiverPhone,
             foodType, servings, distance, readyTime, status)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        RETURNING {DONATION_COLUMNS}
        "#
    ))
    .bind(&new.name)
    .bind(&new.donor)
    .bind(&new.donor_phone)
    .bind(&new.donor_address)
    .bind(&new.receiver_address)
    .bind(&new.receiver_phone)
    .bind(&new.food_type)
    .bind(&new.servings)
    .bind(&new.distance)
    .bind(&new.ready_time)
    .bind(DonationStatus::Pending)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(donation)
}

/// Result of a claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed,
    NotFound,
    /// The donation exists but was not pending; nothing was written.
    NotPending(DonationStatus),
}

/// Move a donation from `pending` to `claimed`.
///
/// The status guard lives in the `UPDATE` itself so that of several
/// concurrent claims on the same id exactly one sees an affected row.
pub async fn claim_donation(pool: &SqlitePool, id: i64) -> Result<ClaimOutcome> {
    let mut tx = pool.begin().await?;

    let claimed = sqlx::query("UPDATE donations SET status = ?1 WHERE id = ?2 AND status = ?3")
        .bind(DonationStatus::Claimed)
        .bind(id)
        .bind(DonationStatus::Pending)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if claimed == 1 {
        tx.commit().await?;
        return Ok(ClaimOutcome::Claimed);
    }

    let current: Option<(DonationStatus,)> =
        sqlx::query_as("SELECT status FROM donations WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    tx.rollback().await?;

    Ok(match current {
        Some((status,)) => ClaimOutcome::NotPending(status),
        None => ClaimOutcome::NotFound,
    })
}

#[cfg(test)]
pub(crate) async fn test_pool() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("donations.db");
    let pool = init_pool(&path.display().to_string()).await.unwrap();
    (dir, pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str) -> NewDonation {
        NewDonation {
            name: name.to_string(),
            donor: "Jane's Bakery".to_string(),
            donor_phone: Some("555-0100".to_string()),
            donor_address: None,
            receiver_address: None,
            receiver_phone: None,
            food_type: Some("baked".to_string()),
            servings: "10 Servings".to_string(),
            distance: "3.1 mi".to_string(),
            ready_time: "ASAP".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_applies_schema_defaults() {
        let (_dir, pool) = test_pool().await;

        let donation = insert_donation(&pool, &sample("Bagels")).await.unwrap();
        assert_eq!(donation.name, "Bagels");
        assert_eq!(donation.status, DonationStatus::Pending);
        assert_eq!(donation.icon.as_deref(), Some("🎁"));
        assert_eq!(donation.donor_address, None);

        assert_eq!(list_donations(&pool).await.unwrap(), vec![donation]);
    }

    #[tokio::test]
    async fn ids_are_not_reused() {
        let (_dir, pool) = test_pool().await;

        let first = insert_donation(&pool, &sample("a")).await.unwrap();
        sqlx::query("DELETE FROM donations WHERE id = ?1")
            .bind(first.id)
            .execute(&pool)
            .await
            .unwrap();
        let second = insert_donation(&pool, &sample("b")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn claim_is_guarded_by_status() {
        let (_dir, pool) = test_pool().await;
        let donation = insert_donation(&pool, &sample("Soup")).await.unwrap();

        assert_eq!(
            claim_donation(&pool, donation.id).await.unwrap(),
            ClaimOutcome::Claimed
        );
        assert_eq!(
            claim_donation(&pool, donation.id).await.unwrap(),
            ClaimOutcome::NotPending(DonationStatus::Claimed)
        );
        assert_eq!(
            claim_donation(&pool, donation.id + 100).await.unwrap(),
            ClaimOutcome::NotFound
        );

        let rows = list_donations(&pool).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, DonationStatus::Claimed);
    }

    #[tokio::test]
    async fn delivered_donations_cannot_be_claimed() {
        let (_dir, pool) = test_pool().await;
        let donation = insert_donation(&pool, &sample("Rice")).await.unwrap();
        sqlx::query("UPDATE donations SET status = 'delivered' WHERE id = ?1")
            .bind(donation.id)
            .execute(&pool)
            .await
            .unwrap();

        assert_eq!(
            claim_donation(&pool, donation.id).await.unwrap(),
            ClaimOutcome::NotPending(DonationStatus::Delivered)
        );
    }

    #[tokio::test]
    async fn init_pool_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("again.db").display());

        let pool = init_pool(&url).await.unwrap();
        insert_donation(&pool, &sample("Apples")).await.unwrap();
        pool.close().await;

        let reopened = init_pool(&url).await.unwrap();
        assert_eq!(list_donations(&reopened).await.unwrap().len(), 1);
    }
}
