// db/walletdb.rs
use async_trait::async_trait;
use sqlx::{Error, Postgres, Transaction};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::walletmodels::{Balances, Wallet, WalletTransaction, WalletTxKind};

#[async_trait]
pub trait WalletExt {
    async fn get_wallet(&self, user_id: Uuid) -> Result<Option<Wallet>, Error>;

    async fn get_wallet_transactions(
        &self,
        user_id: Uuid,
        kind: Option<WalletTxKind>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, Error>;

    async fn count_wallet_transactions(
        &self,
        user_id: Uuid,
        kind: Option<WalletTxKind>,
    ) -> Result<i64, Error>;

    /// Sum of all ledger deltas for the wallet, as (pending, available).
    async fn get_ledger_totals(&self, user_id: Uuid) -> Result<Balances, Error>;
}

#[async_trait]
impl WalletExt for DBClient {
    async fn get_wallet(&self, user_id: Uuid) -> Result<Option<Wallet>, Error> {
        sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_wallet_transactions(
        &self,
        user_id: Uuid,
        kind: Option<WalletTxKind>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, Error> {
        sqlx::query_as::<_, WalletTransaction>(
            r#"
            SELECT * FROM wallet_transactions
            WHERE user_id = $1
              AND ($2::wallet_tx_kind IS NULL OR kind = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        )
        .bind(user_id)
        .bind(kind)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_wallet_transactions(
        &self,
        user_id: Uuid,
        kind: Option<WalletTxKind>,
    ) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM wallet_transactions
            WHERE user_id = $1
              AND ($2::wallet_tx_kind IS NULL OR kind = $2)
            "#
        )
        .bind(user_id)
        .bind(kind)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_ledger_totals(&self, user_id: Uuid) -> Result<Balances, Error> {
        let (pending, available) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COALESCE(SUM(pending_delta), 0)::BIGINT,
                   COALESCE(SUM(available_delta), 0)::BIGINT
            FROM wallet_transactions
            WHERE user_id = $1
            "#
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Balances { pending, available })
    }
}

/// Locks the user's wallet row for the rest of the transaction.
pub async fn lock_wallet(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<Option<Wallet>, Error> {
    sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE user_id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
}

pub async fn find_transaction_by_reference(
    tx: &mut Transaction<'_, Postgres>,
    reference: &str,
) -> Result<Option<WalletTransaction>, Error> {
    sqlx::query_as::<_, WalletTransaction>(
        "SELECT * FROM wallet_transactions WHERE reference = $1"
    )
    .bind(reference)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn store_balances(
    tx: &mut Transaction<'_, Postgres>,
    wallet_id: Uuid,
    balances: Balances,
) -> Result<Wallet, Error> {
    sqlx::query_as::<_, Wallet>(
        r#"
        UPDATE wallets
        SET pending_balance = $2, available_balance = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#
    )
    .bind(wallet_id)
    .bind(balances.pending)
    .bind(balances.available)
    .fetch_one(&mut **tx)
    .await
}

pub async fn insert_wallet_transaction(
    tx: &mut Transaction<'_, Postgres>,
    wallet: &Wallet,
    kind: WalletTxKind,
    deltas: (i64, i64),
    after: Balances,
    reference: &str,
    booking_id: Option<Uuid>,
    dispute_id: Option<Uuid>,
    description: &str,
) -> Result<WalletTransaction, Error> {
    sqlx::query_as::<_, WalletTransaction>(
        r#"
        INSERT INTO wallet_transactions
        (wallet_id, user_id, kind, pending_delta, available_delta, pending_after, available_after,
         reference, booking_id, dispute_id, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#
    )
    .bind(wallet.id)
    .bind(wallet.user_id)
    .bind(kind)
    .bind(deltas.0)
    .bind(deltas.1)
    .bind(after.pending)
    .bind(after.available)
    .bind(reference)
    .bind(booking_id)
    .bind(dispute_id)
    .bind(description)
    .fetch_one(&mut **tx)
    .await
}
