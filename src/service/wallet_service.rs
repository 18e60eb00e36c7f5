// service/wallet_service.rs
use std::sync::Arc;

use serde::Serialize;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    db::{
        bookingdb::{lock_booking, set_funds_released, BookingExt},
        db::DBClient,
        disputedb::find_active_dispute,
        walletdb::{
            find_transaction_by_reference, insert_wallet_transaction, lock_wallet,
            store_balances, WalletExt,
        },
    },
    models::{
        bookingmodel::BookingStatus,
        notificationmodel::NotificationKind,
        walletmodels::{Balances, Movement, Wallet, WalletTransaction, WalletTxKind},
    },
    service::{error::ServiceError, notification_service::NotificationService},
    utils::money::format_cents,
};

/// Result of comparing stored balances with the sum of ledger deltas.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LedgerCheck {
    pub user_id: Uuid,
    pub stored: Balances,
    pub ledger: Balances,
    pub consistent: bool,
}

/// Applies one wallet movement inside the caller's transaction.
///
/// The wallet row is locked first, the movement is checked against the
/// locked balances, and the ledger row is written with the same `reference`
/// that makes the call idempotent: if a transaction with that reference
/// already exists it is returned unchanged and no balance moves.
pub async fn apply_movement(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    kind: WalletTxKind,
    movement: Movement,
    reference: &str,
    booking_id: Option<Uuid>,
    dispute_id: Option<Uuid>,
    description: &str,
) -> Result<WalletTransaction, ServiceError> {
    let wallet = lock_wallet(tx, user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Wallet for user {}", user_id)))?;

    if let Some(existing) = find_transaction_by_reference(tx, reference).await? {
        tracing::debug!("Wallet movement {} already applied", reference);
        return Ok(existing);
    }

    let after = Balances::of(&wallet).apply(movement)?;
    let updated = store_balances(tx, wallet.id, after).await?;

    let entry = insert_wallet_transaction(
        tx,
        &updated,
        kind,
        movement.deltas(),
        after,
        reference,
        booking_id,
        dispute_id,
        description,
    )
    .await?;

    tracing::info!(
        "Wallet {} {:?}: pending {} available {} ({})",
        wallet.id,
        kind,
        after.pending,
        after.available,
        reference
    );

    Ok(entry)
}

/// Ledger reference for a client withdrawal key. The prefix takes 44 of the
/// column's 120 characters, which caps client keys at 76.
pub fn payout_reference(user_id: Uuid, client_reference: &str) -> String {
    format!("payout:{}:{}", user_id, client_reference)
}

#[derive(Debug, Clone)]
pub struct WalletService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
    dispute_window_hours: i64,
}

impl WalletService {
    pub fn new(
        db_client: Arc<DBClient>,
        notification_service: Arc<NotificationService>,
        dispute_window_hours: i64,
    ) -> Self {
        Self {
            db_client,
            notification_service,
            dispute_window_hours,
        }
    }

    pub async fn get_wallet(&self, user_id: Uuid) -> Result<Wallet, ServiceError> {
        self.db_client
            .get_wallet(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Wallet"))
    }

    /// Moves `amount_cents` out of the available balance.
    /// The client-supplied `reference` makes retries safe.
    pub async fn withdraw(
        &self,
        user_id: Uuid,
        amount_cents: i64,
        reference: &str,
    ) -> Result<WalletTransaction, ServiceError> {
        if amount_cents <= 0 {
            return Err(ServiceError::Validation(
                "Withdrawal amount must be positive".to_string(),
            ));
        }

        let reference = payout_reference(user_id, reference);
        let mut tx = self.db_client.pool.begin().await?;

        let entry = apply_movement(
            &mut tx,
            user_id,
            WalletTxKind::Payout,
            Movement::Payout(amount_cents),
            &reference,
            None,
            None,
            &format!("Withdrawal of {}", format_cents(amount_cents)),
        )
        .await?;

        tx.commit().await?;
        Ok(entry)
    }

    /// Releases a completed booking's hold to the worker's available balance.
    ///
    /// Returns `None` when the booking is not eligible: not completed, already
    /// released, still inside the dispute window, or under an active dispute.
    pub async fn release_booking_funds(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<WalletTransaction>, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let booking = lock_booking(&mut tx, booking_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))?;

        if booking.status != BookingStatus::Completed || booking.funds_released {
            return Ok(None);
        }

        let window_closed = booking
            .completed_at
            .map(|at| at + chrono::Duration::hours(self.dispute_window_hours) <= chrono::Utc::now())
            .unwrap_or(false);
        if !window_closed {
            return Ok(None);
        }

        if find_active_dispute(&mut tx, booking.id).await?.is_some() {
            tracing::debug!("Booking {} has an active dispute, holding funds", booking.id);
            return Ok(None);
        }

        let amount = booking.net_amount_cents();
        let entry = apply_movement(
            &mut tx,
            booking.worker_id,
            WalletTxKind::BookingRelease,
            Movement::Release(amount),
            &booking.release_reference(),
            Some(booking.id),
            None,
            "Booking funds released",
        )
        .await?;

        set_funds_released(&mut tx, booking.id).await?;
        tx.commit().await?;

        self.notification_service.notify_quietly(
            booking.worker_id,
            NotificationKind::FundsReleased,
            "Funds released",
            format!("{} is now available in your wallet", format_cents(amount)),
            Some(serde_json::json!({ "booking_id": booking.id })),
        );

        Ok(Some(entry))
    }

    /// Releases every booking whose dispute window has closed, one batch at a
    /// time until a batch comes back short. Bookings that fail or turn out
    /// ineligible are skipped for the rest of the run.
    pub async fn process_due_releases(&self, batch_size: i64) -> Result<usize, ServiceError> {
        let mut released = 0;
        let mut skipped: Vec<Uuid> = Vec::new();

        loop {
            let due = self
                .db_client
                .get_bookings_due_for_release(self.dispute_window_hours, &skipped, batch_size)
                .await?;
            let batch_len = due.len() as i64;

            for booking in due {
                match self.release_booking_funds(booking.id).await {
                    Ok(Some(_)) => released += 1,
                    Ok(None) => skipped.push(booking.id),
                    Err(e) => {
                        tracing::error!("Failed to release funds for booking {}: {}", booking.id, e);
                        skipped.push(booking.id);
                    }
                }
            }

            if batch_len < batch_size || batch_len == 0 {
                break;
            }
        }

        if !skipped.is_empty() {
            tracing::warn!("Fund release skipped {} booking(s) this run", skipped.len());
        }
        Ok(released)
    }

    /// Reconciles the stored balances against the ledger.
    pub async fn check_ledger(&self, user_id: Uuid) -> Result<LedgerCheck, ServiceError> {
        let wallet = self.get_wallet(user_id).await?;
        let ledger = self.db_client.get_ledger_totals(user_id).await?;
        let stored = Balances::of(&wallet);

        if stored != ledger {
            tracing::error!(
                "Ledger mismatch for user {}: stored {:?} ledger {:?}",
                user_id,
                stored,
                ledger
            );
        }

        Ok(LedgerCheck {
            user_id,
            stored,
            ledger,
            consistent: stored == ledger,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::{
        db::{bookingdb::BookingExt, walletdb::WalletExt},
        models::usermodel::UserRole,
        service::test_support::{accepted_booking, complete_booking, test_state, user},
    };

    async fn hold(
        db_client: &DBClient,
        user_id: Uuid,
        amount: i64,
        reference: &str,
    ) -> Result<WalletTransaction, ServiceError> {
        let mut tx = db_client.pool.begin().await?;
        let entry = apply_movement(
            &mut tx,
            user_id,
            WalletTxKind::BookingHold,
            Movement::Hold(amount),
            reference,
            None,
            None,
            "Hold",
        )
        .await?;
        tx.commit().await?;
        Ok(entry)
    }

    #[tokio::test]
    async fn repeated_reference_returns_the_original_entry() {
        let Some(state) = test_state(2).await else { return };
        let worker = user(&state, UserRole::Worker).await;
        let reference = format!("test:{}:hold", Uuid::new_v4());

        let first = hold(&state.db_client, worker.id, 1500, &reference).await.unwrap();
        let second = hold(&state.db_client, worker.id, 1500, &reference).await.unwrap();

        assert_eq!(first.id, second.id);
        let wallet = state.wallet_service.get_wallet(worker.id).await.unwrap();
        assert_eq!(wallet.pending_balance, 1500);
        assert_eq!(
            state.db_client.count_wallet_transactions(worker.id, None).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn balances_match_the_ledger_after_every_movement() {
        let Some(state) = test_state(2).await else { return };
        let worker = user(&state, UserRole::Worker).await;
        let booking_ref = Uuid::new_v4();

        hold(&state.db_client, worker.id, 4000, &format!("test:{}:hold", booking_ref)).await.unwrap();
        let mut tx = state.db_client.pool.begin().await.unwrap();
        apply_movement(
            &mut tx,
            worker.id,
            WalletTxKind::BookingRelease,
            Movement::Release(2500),
            &format!("test:{}:release", booking_ref),
            None,
            None,
            "Release",
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();
        state.wallet_service.withdraw(worker.id, 1000, "w-1").await.unwrap();

        let check = state.wallet_service.check_ledger(worker.id).await.unwrap();
        assert!(check.consistent);
        assert_eq!(check.stored, Balances { pending: 1500, available: 1500 });

        let payouts = state
            .db_client
            .count_wallet_transactions(worker.id, Some(WalletTxKind::Payout))
            .await
            .unwrap();
        assert_eq!(payouts, 1);
    }

    #[tokio::test]
    async fn overdrawn_payout_leaves_no_trace() {
        let Some(state) = test_state(2).await else { return };
        let worker = user(&state, UserRole::Worker).await;

        let err = state.wallet_service.withdraw(worker.id, 100, "w-1").await.unwrap_err();

        assert!(matches!(err, ServiceError::InsufficientFunds(_)));
        assert_eq!(
            state.db_client.count_wallet_transactions(worker.id, None).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn due_releases_continue_past_the_first_batch() {
        let Some(state) = test_state(4).await else { return };
        let (worker_a, _, a) = accepted_booking(&state).await;
        let (worker_b, _, b) = accepted_booking(&state).await;
        complete_booking(&state, a.id, Duration::days(5)).await;
        complete_booking(&state, b.id, Duration::days(4)).await;

        let released = state.wallet_service.process_due_releases(1).await.unwrap();

        assert!(released >= 2);
        for (worker, booking) in [(worker_a, a), (worker_b, b)] {
            let after = state.db_client.get_booking_by_id(booking.id).await.unwrap().unwrap();
            assert!(after.funds_released);
            let wallet = state.wallet_service.get_wallet(worker.id).await.unwrap();
            assert_eq!(wallet.pending_balance, 0);
            assert_eq!(wallet.available_balance, booking.net_amount_cents());
            assert!(state.wallet_service.check_ledger(worker.id).await.unwrap().consistent);
        }
    }

    #[tokio::test]
    async fn bookings_inside_the_window_stay_pending() {
        let Some(state) = test_state(4).await else { return };
        let (worker, _, booking) = accepted_booking(&state).await;
        complete_booking(&state, booking.id, Duration::hours(1)).await;

        assert!(state.wallet_service.release_booking_funds(booking.id).await.unwrap().is_none());
        let wallet = state.wallet_service.get_wallet(worker.id).await.unwrap();
        assert_eq!(wallet.pending_balance, booking.net_amount_cents());
    }
}
