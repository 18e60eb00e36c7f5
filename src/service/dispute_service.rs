// service/dispute_service.rs
use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    db::{
        bookingdb::{lock_booking, set_funds_released},
        db::DBClient,
        disputedb::{
            close_dispute, find_active_dispute, insert_dispute, lock_dispute,
            set_dispute_under_review, DisputeExt,
        },
    },
    models::{
        bookingmodel::BookingStatus,
        disputemodel::{Dispute, DisputeOutcome, DisputeStatus},
        notificationmodel::NotificationKind,
        usermodel::User,
        walletmodels::{Movement, WalletTxKind},
    },
    service::{
        error::ServiceError, notification_service::NotificationService,
        wallet_service::apply_movement,
    },
    utils::money::format_cents,
};

fn ensure_admin(user: &User, action: &str) -> Result<(), ServiceError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::forbidden(user.id, action))
    }
}

fn ensure_transition(dispute: &Dispute, to: DisputeStatus) -> Result<(), ServiceError> {
    if dispute.status.can_transition_to(to) {
        Ok(())
    } else {
        Err(ServiceError::InvalidDisputeTransition(dispute.id, dispute.status, to))
    }
}

#[derive(Debug, Clone)]
pub struct DisputeService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
    dispute_window_hours: i64,
}

impl DisputeService {
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

    pub async fn get_dispute(&self, user: &User, dispute_id: Uuid) -> Result<Dispute, ServiceError> {
        let dispute = self
            .db_client
            .get_dispute_by_id(dispute_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Dispute"))?;

        if dispute.raised_by != user.id && dispute.against != user.id && !user.is_admin() {
            return Err(ServiceError::forbidden(user.id, "view this dispute"));
        }
        Ok(dispute)
    }

    /// Opens a dispute on a completed booking whose funds are still pending.
    pub async fn open_dispute(
        &self,
        user: &User,
        booking_id: Uuid,
        reason: String,
        description: String,
    ) -> Result<Dispute, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let booking = lock_booking(&mut tx, booking_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))?;

        let against = booking
            .counterpart(user.id)
            .ok_or_else(|| ServiceError::forbidden(user.id, "dispute this booking"))?;

        if booking.status != BookingStatus::Completed {
            return Err(ServiceError::Validation(
                "Only completed bookings can be disputed".to_string(),
            ));
        }
        if booking.funds_released {
            return Err(ServiceError::Conflict(
                "Funds for this booking have already been released".to_string(),
            ));
        }

        let window_open = booking
            .completed_at
            .map(|at| Utc::now() < at + Duration::hours(self.dispute_window_hours))
            .unwrap_or(false);
        if !window_open {
            return Err(ServiceError::Validation(format!(
                "Disputes must be opened within {} hours of completion",
                self.dispute_window_hours
            )));
        }

        if find_active_dispute(&mut tx, booking.id).await?.is_some() {
            return Err(ServiceError::Conflict(
                "This booking already has an active dispute".to_string(),
            ));
        }

        let dispute = insert_dispute(&mut tx, booking.id, user.id, against, reason, description)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    ServiceError::Conflict("This booking already has an active dispute".to_string())
                }
                other => ServiceError::Database(other),
            })?;

        tx.commit().await?;

        tracing::info!("Dispute {} opened on booking {} by {}", dispute.id, booking.id, user.id);

        self.notification_service.notify_quietly(
            against,
            NotificationKind::DisputeOpened,
            "Dispute opened",
            format!("{} opened a dispute: {}", user.name, dispute.reason),
            Some(serde_json::json!({ "dispute_id": dispute.id, "booking_id": booking.id })),
        );

        Ok(dispute)
    }

    pub async fn assign(&self, admin: &User, dispute_id: Uuid) -> Result<Dispute, ServiceError> {
        ensure_admin(admin, "review disputes")?;

        let mut tx = self.db_client.pool.begin().await?;
        let dispute = lock_dispute(&mut tx, dispute_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Dispute"))?;
        ensure_transition(&dispute, DisputeStatus::UnderReview)?;

        let dispute = set_dispute_under_review(&mut tx, dispute.id, admin.id).await?;
        tx.commit().await?;

        tracing::info!("Dispute {} assigned to admin {}", dispute.id, admin.id);
        Ok(dispute)
    }

    pub async fn resolve(
        &self,
        admin: &User,
        dispute_id: Uuid,
        outcome: DisputeOutcome,
        worker_share_bps: Option<i32>,
        note: String,
    ) -> Result<Dispute, ServiceError> {
        ensure_admin(admin, "resolve disputes")?;
        self.settle(admin, dispute_id, DisputeStatus::Resolved, outcome, worker_share_bps, note)
            .await
    }

    /// Rejecting a dispute lets the worker's pay through untouched.
    pub async fn reject(&self, admin: &User, dispute_id: Uuid, note: String) -> Result<Dispute, ServiceError> {
        ensure_admin(admin, "reject disputes")?;
        self.settle(
            admin,
            dispute_id,
            DisputeStatus::Rejected,
            DisputeOutcome::ReleaseToWorker,
            None,
            note,
        )
        .await
    }

    /// Closes the dispute and moves the booking's pending pay in one transaction.
    async fn settle(
        &self,
        admin: &User,
        dispute_id: Uuid,
        status: DisputeStatus,
        outcome: DisputeOutcome,
        worker_share_bps: Option<i32>,
        note: String,
    ) -> Result<Dispute, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let dispute = lock_dispute(&mut tx, dispute_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Dispute"))?;
        ensure_transition(&dispute, status)?;

        let booking = lock_booking(&mut tx, dispute.booking_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))?;
        if booking.funds_released {
            return Err(ServiceError::Conflict(
                "Funds for this booking have already been settled".to_string(),
            ));
        }

        let settlement = outcome
            .settle(booking.net_amount_cents(), worker_share_bps)
            .map_err(ServiceError::Validation)?;

        if settlement.release_to_worker > 0 {
            apply_movement(
                &mut tx,
                booking.worker_id,
                WalletTxKind::DisputeRelease,
                Movement::Release(settlement.release_to_worker),
                &format!("dispute:{}:release", dispute.id),
                Some(booking.id),
                Some(dispute.id),
                "Dispute settled: released to worker",
            )
            .await?;
        }
        if settlement.refund_to_business > 0 {
            apply_movement(
                &mut tx,
                booking.worker_id,
                WalletTxKind::DisputeRefund,
                Movement::Reverse(settlement.refund_to_business),
                &format!("dispute:{}:refund", dispute.id),
                Some(booking.id),
                Some(dispute.id),
                "Dispute settled: refunded to business",
            )
            .await?;
        }

        set_funds_released(&mut tx, booking.id).await?;

        let recorded_outcome = (status == DisputeStatus::Resolved).then_some(outcome);
        let recorded_share = (outcome == DisputeOutcome::Split).then_some(worker_share_bps).flatten();
        let closed = close_dispute(
            &mut tx,
            dispute.id,
            status,
            recorded_outcome,
            recorded_share,
            note,
            admin.id,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Dispute {} closed as {:?}: {} to worker, {} refunded",
            closed.id,
            status,
            settlement.release_to_worker,
            settlement.refund_to_business
        );

        for user_id in [booking.worker_id, booking.business_id] {
            self.notification_service.notify_quietly(
                user_id,
                NotificationKind::DisputeResolved,
                "Dispute closed",
                format!(
                    "{} released to the worker, {} refunded to the business",
                    format_cents(settlement.release_to_worker),
                    format_cents(settlement.refund_to_business)
                ),
                Some(serde_json::json!({ "dispute_id": closed.id, "booking_id": booking.id })),
            );
        }

        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::usermodel::UserRole;

    fn user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: String::new(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    fn dispute(status: DisputeStatus) -> Dispute {
        Dispute {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            raised_by: Uuid::new_v4(),
            against: Uuid::new_v4(),
            reason: "hours".into(),
            description: "Left two hours early".into(),
            status,
            outcome: None,
            worker_share_bps: None,
            resolution_note: None,
            assigned_admin: None,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    #[test]
    fn only_admins_settle() {
        assert!(ensure_admin(&user(UserRole::Admin), "resolve disputes").is_ok());
        assert!(matches!(
            ensure_admin(&user(UserRole::Business), "resolve disputes"),
            Err(ServiceError::Forbidden(..))
        ));
    }

    #[test]
    fn closed_disputes_stay_closed() {
        let d = dispute(DisputeStatus::Resolved);
        assert!(matches!(
            ensure_transition(&d, DisputeStatus::Rejected),
            Err(ServiceError::InvalidDisputeTransition(..))
        ));
        assert!(ensure_transition(&dispute(DisputeStatus::Open), DisputeStatus::Resolved).is_ok());
    }

    mod with_database {
        use super::*;
        use crate::{
            db::{bookingdb::BookingExt, walletdb::WalletExt},
            service::test_support::{accepted_booking, complete_booking, test_state, user as db_user},
        };

        #[tokio::test]
        async fn one_active_dispute_per_booking() {
            let Some(state) = test_state(4).await else { return };
            let (worker, business, booking) = accepted_booking(&state).await;
            complete_booking(&state, booking.id, Duration::hours(1)).await;

            let disputes = &state.dispute_service;
            let (by_business, by_worker) = tokio::join!(
                disputes.open_dispute(&business, booking.id, "hours".into(), "Left early".into()),
                disputes.open_dispute(&worker, booking.id, "pay".into(), "Stayed late".into()),
            );

            let opened = [&by_business, &by_worker].iter().filter(|r| r.is_ok()).count();
            assert_eq!(opened, 1);
            assert!([by_business, by_worker]
                .into_iter()
                .any(|r| matches!(r, Err(ServiceError::Conflict(_)))));
            assert_eq!(state.db_client.get_booking_disputes(booking.id).await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn split_settles_both_sides_in_one_step() {
            let Some(state) = test_state(4).await else { return };
            let admin = db_user(&state, UserRole::Admin).await;
            let (worker, business, booking) = accepted_booking(&state).await;
            complete_booking(&state, booking.id, Duration::hours(1)).await;

            let dispute = state
                .dispute_service
                .open_dispute(&business, booking.id, "hours".into(), "Left early".into())
                .await
                .unwrap();
            let resolved = state
                .dispute_service
                .resolve(&admin, dispute.id, DisputeOutcome::Split, Some(5000), "Half".into())
                .await
                .unwrap();

            assert_eq!(resolved.status, DisputeStatus::Resolved);
            let net = booking.net_amount_cents();
            let wallet = state.db_client.get_wallet(worker.id).await.unwrap().unwrap();
            assert_eq!(wallet.pending_balance, 0);
            assert_eq!(wallet.available_balance, net / 2);
            assert!(state.wallet_service.check_ledger(worker.id).await.unwrap().consistent);

            let after = state.db_client.get_booking_by_id(booking.id).await.unwrap().unwrap();
            assert!(after.funds_released);
            assert!(state.wallet_service.release_booking_funds(booking.id).await.unwrap().is_none());
        }
    }
}
