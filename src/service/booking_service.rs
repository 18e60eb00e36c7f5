// service/booking_service.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::{
        bookingdb::{
            insert_booking, lock_booking, set_booking_cancelled, set_booking_status, BookingExt,
        },
        cancellationdb::CancellationExt,
        db::DBClient,
        jobdb::{lock_job, sync_job_fill_status},
        walletdb::lock_wallet,
    },
    models::{
        bookingmodel::{Booking, BookingStatus},
        cancellationmodel::NO_SHOW_REASON_CODE,
        jobmodel::JobStatus,
        notificationmodel::NotificationKind,
        usermodel::{User, UserRole},
        walletmodels::{Movement, WalletTxKind},
    },
    service::{
        badge_service::{BadgeService, BadgeTrigger},
        compliance_service::ComplianceService,
        error::ServiceError,
        notification_service::NotificationService,
        wallet_service::apply_movement,
    },
    utils::money::{format_cents, split_fee},
};

/// Splits a booking's gross pay, refusing shifts that would pay the worker nothing.
pub fn booking_pay(amount_cents: i64, fee_bps: i64) -> Result<(i64, i64), ServiceError> {
    let (net, fee) = split_fee(amount_cents, fee_bps);
    if net <= 0 {
        return Err(ServiceError::Validation(
            "Shift pays nothing after fees; lengthen it or raise the rate".to_string(),
        ));
    }
    Ok((net, fee))
}

/// Side effects of cancelling a booking, decided before anything is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancellationPlan {
    pub late: bool,
    pub reverse_hold: Option<i64>,
    pub reopen_job: bool,
}

impl CancellationPlan {
    pub fn for_booking(booking: &Booking, cancelled_by: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            late: booking.is_late_cancellation(cancelled_by, at),
            reverse_hold: booking
                .status
                .carries_hold()
                .then(|| booking.net_amount_cents()),
            reopen_job: booking.starts_at > at,
        }
    }
}

fn ensure_transition(booking: &Booking, to: BookingStatus) -> Result<(), ServiceError> {
    if booking.status.can_transition_to(to) {
        Ok(())
    } else {
        Err(ServiceError::InvalidBookingTransition(booking.id, booking.status, to))
    }
}

#[derive(Debug, Clone)]
pub struct BookingService {
    db_client: Arc<DBClient>,
    compliance_service: Arc<ComplianceService>,
    notification_service: Arc<NotificationService>,
    badge_service: Arc<BadgeService>,
    platform_fee_bps: i64,
}

impl BookingService {
    pub fn new(
        db_client: Arc<DBClient>,
        compliance_service: Arc<ComplianceService>,
        notification_service: Arc<NotificationService>,
        badge_service: Arc<BadgeService>,
        platform_fee_bps: i64,
    ) -> Self {
        Self {
            db_client,
            compliance_service,
            notification_service,
            badge_service,
            platform_fee_bps,
        }
    }

    /// Visible to the two participants and admins.
    pub async fn get_booking(&self, user: &User, booking_id: Uuid) -> Result<Booking, ServiceError> {
        let booking = self
            .db_client
            .get_booking_by_id(booking_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))?;

        if !booking.is_participant(user.id) && !user.is_admin() {
            return Err(ServiceError::forbidden(user.id, "view this booking"));
        }
        Ok(booking)
    }

    pub async fn apply(&self, worker: &User, job_id: Uuid) -> Result<Booking, ServiceError> {
        if worker.role != UserRole::Worker {
            return Err(ServiceError::forbidden(worker.id, "apply for jobs"));
        }

        let mut tx = self.db_client.pool.begin().await?;

        let job = lock_job(&mut tx, job_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Job"))?;

        if job.status != JobStatus::Open {
            return Err(ServiceError::Conflict("Job is not accepting applications".to_string()));
        }
        if job.starts_at <= Utc::now() {
            return Err(ServiceError::Validation("Job has already started".to_string()));
        }
        if job.business_id == worker.id {
            return Err(ServiceError::Validation("Cannot apply to your own job".to_string()));
        }

        let amount = job.booking_amount_cents();
        let (_, fee) = booking_pay(amount, self.platform_fee_bps)?;

        let booking = insert_booking(
            &mut tx,
            job.id,
            worker.id,
            job.business_id,
            amount,
            fee,
            job.starts_at,
            job.ends_at,
        )
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                ServiceError::Conflict("You already have an active booking for this job".to_string())
            }
            other => ServiceError::Database(other),
        })?;

        tx.commit().await?;

        tracing::info!("Worker {} applied to job {} (booking {})", worker.id, job.id, booking.id);

        self.notification_service.notify_quietly(
            job.business_id,
            NotificationKind::BookingRequested,
            "New booking request",
            format!("{} applied for {}", worker.name, job.title),
            Some(serde_json::json!({ "booking_id": booking.id, "job_id": job.id })),
        );

        Ok(booking)
    }

    /// Accepts a pending booking and places the worker's net pay on hold.
    pub async fn accept(&self, business: &User, booking_id: Uuid) -> Result<Booking, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let booking = lock_booking(&mut tx, booking_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))?;

        if booking.business_id != business.id {
            return Err(ServiceError::forbidden(business.id, "accept this booking"));
        }
        ensure_transition(&booking, BookingStatus::Accepted)?;

        let job = lock_job(&mut tx, booking.job_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Job"))?;
        if job.status != JobStatus::Open {
            return Err(ServiceError::Conflict("Job has no open slots".to_string()));
        }

        lock_wallet(&mut tx, booking.worker_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Worker wallet"))?;

        self.compliance_service
            .enforce_in_tx(&mut tx, booking.worker_id, booking.id, booking.starts_at, booking.ends_at)
            .await?;

        let accepted = set_booking_status(&mut tx, booking.id, BookingStatus::Accepted).await?;

        apply_movement(
            &mut tx,
            accepted.worker_id,
            WalletTxKind::BookingHold,
            Movement::Hold(accepted.net_amount_cents()),
            &accepted.hold_reference(),
            Some(accepted.id),
            None,
            &format!("Hold for {}", job.title),
        )
        .await?;

        sync_job_fill_status(&mut tx, job.id).await?;
        tx.commit().await?;

        tracing::info!("Booking {} accepted by business {}", accepted.id, business.id);

        self.notification_service.notify_quietly(
            accepted.worker_id,
            NotificationKind::BookingAccepted,
            "Booking accepted",
            format!(
                "You're booked for {}. {} is on hold for you",
                job.title,
                format_cents(accepted.net_amount_cents())
            ),
            Some(serde_json::json!({ "booking_id": accepted.id })),
        );

        Ok(accepted)
    }

    pub async fn reject(&self, business: &User, booking_id: Uuid) -> Result<Booking, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let booking = lock_booking(&mut tx, booking_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))?;

        if booking.business_id != business.id {
            return Err(ServiceError::forbidden(business.id, "reject this booking"));
        }
        ensure_transition(&booking, BookingStatus::Rejected)?;

        let rejected = set_booking_status(&mut tx, booking.id, BookingStatus::Rejected).await?;
        tx.commit().await?;

        self.notification_service.notify_quietly(
            rejected.worker_id,
            NotificationKind::BookingRejected,
            "Booking declined",
            "The business declined your booking request",
            Some(serde_json::json!({ "booking_id": rejected.id })),
        );

        Ok(rejected)
    }

    pub async fn check_in(&self, worker: &User, booking_id: Uuid) -> Result<Booking, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let booking = lock_booking(&mut tx, booking_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))?;

        if booking.worker_id != worker.id {
            return Err(ServiceError::forbidden(worker.id, "check in to this booking"));
        }
        ensure_transition(&booking, BookingStatus::InProgress)?;

        let started = set_booking_status(&mut tx, booking.id, BookingStatus::InProgress).await?;
        tx.commit().await?;

        let punctual = started
            .checked_in_at
            .map(|at| started.is_punctual_check_in(at))
            .unwrap_or(false);
        tracing::info!("Worker {} checked in to booking {} (punctual: {})", worker.id, started.id, punctual);

        self.notification_service.notify_quietly(
            started.business_id,
            NotificationKind::BookingStarted,
            "Worker checked in",
            format!("{} has checked in", worker.name),
            Some(serde_json::json!({ "booking_id": started.id, "punctual": punctual })),
        );

        Ok(started)
    }

    /// Completes the shift. Pay stays pending until the dispute window closes.
    pub async fn check_out(&self, user: &User, booking_id: Uuid) -> Result<Booking, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let booking = lock_booking(&mut tx, booking_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))?;

        if !booking.is_participant(user.id) {
            return Err(ServiceError::forbidden(user.id, "check out of this booking"));
        }
        ensure_transition(&booking, BookingStatus::Completed)?;

        let completed = set_booking_status(&mut tx, booking.id, BookingStatus::Completed).await?;
        tx.commit().await?;

        tracing::info!("Booking {} completed", completed.id);

        if let Some(other) = completed.counterpart(user.id) {
            self.notification_service.notify_quietly(
                other,
                NotificationKind::BookingCompleted,
                "Shift completed",
                format!("The shift was checked out by {}", user.name),
                Some(serde_json::json!({ "booking_id": completed.id })),
            );
        }

        self.badge_service
            .evaluate_in_background(completed.worker_id, BadgeTrigger::ShiftCompleted);

        Ok(completed)
    }

    pub async fn cancel(
        &self,
        user: &User,
        booking_id: Uuid,
        reason_id: Uuid,
        note: Option<String>,
    ) -> Result<Booking, ServiceError> {
        let reason = self
            .db_client
            .get_cancellation_reason(reason_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Cancellation reason"))?;

        if !reason.applies_to_role(user.role) {
            return Err(ServiceError::Validation(format!(
                "Reason '{}' is not available to {} accounts",
                reason.code,
                user.role.to_str()
            )));
        }

        self.cancel_with(user, booking_id, reason.id, note, false).await
    }

    /// Cancels an accepted booking whose worker never arrived.
    pub async fn mark_no_show(&self, business: &User, booking_id: Uuid) -> Result<Booking, ServiceError> {
        let reason = self
            .db_client
            .get_cancellation_reason_by_code(NO_SHOW_REASON_CODE)
            .await?
            .ok_or_else(|| ServiceError::not_found("No-show cancellation reason"))?;

        self.cancel_with(business, booking_id, reason.id, None, true).await
    }

    async fn cancel_with(
        &self,
        user: &User,
        booking_id: Uuid,
        reason_id: Uuid,
        note: Option<String>,
        no_show: bool,
    ) -> Result<Booking, ServiceError> {
        let now = Utc::now();
        let mut tx = self.db_client.pool.begin().await?;

        let booking = lock_booking(&mut tx, booking_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))?;

        if no_show {
            if booking.business_id != user.id {
                return Err(ServiceError::forbidden(user.id, "report a no-show on this booking"));
            }
            if booking.status != BookingStatus::Accepted {
                return Err(ServiceError::Validation(
                    "Only accepted bookings can be marked as no-show".to_string(),
                ));
            }
            if booking.starts_at > now {
                return Err(ServiceError::Validation("The shift has not started yet".to_string()));
            }
        } else if !booking.is_participant(user.id) && !user.is_admin() {
            return Err(ServiceError::forbidden(user.id, "cancel this booking"));
        }
        ensure_transition(&booking, BookingStatus::Cancelled)?;

        let plan = CancellationPlan::for_booking(&booking, user.id, now);

        // booking -> job -> wallet, same order as accept
        lock_job(&mut tx, booking.job_id).await?;

        if let Some(amount) = plan.reverse_hold {
            apply_movement(
                &mut tx,
                booking.worker_id,
                WalletTxKind::BookingReversal,
                Movement::Reverse(amount),
                &booking.reversal_reference(),
                Some(booking.id),
                None,
                if no_show { "Hold reversed: no-show" } else { "Hold reversed: booking cancelled" },
            )
            .await?;
        }

        let cancelled = set_booking_cancelled(
            &mut tx,
            booking.id,
            user.id,
            reason_id,
            note,
            plan.late,
            no_show,
        )
        .await?;

        if plan.reopen_job {
            sync_job_fill_status(&mut tx, booking.job_id).await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Booking {} cancelled by {} (late: {}, no-show: {})",
            cancelled.id,
            user.id,
            plan.late,
            no_show
        );

        let recipients: Vec<Uuid> = match cancelled.counterpart(user.id) {
            Some(other) => vec![other],
            None => vec![cancelled.worker_id, cancelled.business_id],
        };
        for recipient in recipients {
            self.notification_service.notify_quietly(
                recipient,
                NotificationKind::BookingCancelled,
                if no_show { "Marked as no-show" } else { "Booking cancelled" },
                format!("Booking for {} was cancelled", cancelled.starts_at.format("%Y-%m-%d %H:%M")),
                Some(serde_json::json!({ "booking_id": cancelled.id, "no_show": no_show })),
            );
        }

        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bookingmodel::tests::booking;
    use chrono::Duration;

    #[test]
    fn pending_cancellation_has_nothing_to_reverse() {
        let b = booking(BookingStatus::Pending);
        let plan = CancellationPlan::for_booking(&b, b.worker_id, Utc::now());
        assert_eq!(plan.reverse_hold, None);
        assert!(!plan.late);
        assert!(plan.reopen_job);
    }

    #[test]
    fn accepted_cancellation_reverses_net_hold() {
        let b = booking(BookingStatus::Accepted);
        let plan = CancellationPlan::for_booking(&b, b.business_id, Utc::now());
        assert_eq!(plan.reverse_hold, Some(14400));
        assert!(!plan.late);
    }

    #[test]
    fn short_notice_worker_cancellation_is_late() {
        let mut b = booking(BookingStatus::Accepted);
        b.starts_at = Utc::now() + Duration::hours(3);
        assert!(CancellationPlan::for_booking(&b, b.worker_id, Utc::now()).late);
        assert!(!CancellationPlan::for_booking(&b, b.business_id, Utc::now()).late);
    }

    #[test]
    fn cancelling_after_start_keeps_job_closed() {
        let mut b = booking(BookingStatus::InProgress);
        b.starts_at = Utc::now() - Duration::hours(1);
        let plan = CancellationPlan::for_booking(&b, b.business_id, Utc::now());
        assert!(!plan.reopen_job);
        assert_eq!(plan.reverse_hold, Some(b.net_amount_cents()));
    }

    #[test]
    fn transition_errors_name_both_states() {
        let b = booking(BookingStatus::Completed);
        let err = ensure_transition(&b, BookingStatus::Cancelled).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidBookingTransition(_, BookingStatus::Completed, BookingStatus::Cancelled)
        ));
    }

    #[test]
    fn shifts_must_pay_the_worker_something() {
        assert_eq!(booking_pay(16000, 1000).unwrap(), (14400, 1600));
        assert!(matches!(booking_pay(0, 1000), Err(ServiceError::Validation(_))));
        assert!(matches!(booking_pay(16000, 10_000), Err(ServiceError::Validation(_))));
    }

    mod with_database {
        use super::*;
        use crate::{
            db::{profiledb::ProfileExt, walletdb::WalletExt},
            service::test_support::{
                accepted_booking, compliant_worker, job, standard_job, test_state, user,
            },
        };

        #[tokio::test]
        async fn zero_pay_shift_is_refused_on_apply() {
            let Some(state) = test_state(2).await else { return };
            let worker = compliant_worker(&state).await;
            let business = user(&state, UserRole::Business).await;
            let short = job(
                &state,
                &business,
                Utc::now() + Duration::days(1),
                Duration::seconds(30),
                100,
            )
            .await;

            let err = state.booking_service.apply(&worker, short.id).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }

        /// A single connection is enough, so nothing in accept reaches past
        /// its own transaction.
        #[tokio::test]
        async fn accept_places_the_hold_with_the_status_change() {
            let Some(state) = test_state(1).await else { return };
            let (worker, _, accepted) = accepted_booking(&state).await;

            assert_eq!(accepted.status, BookingStatus::Accepted);
            let wallet = state.db_client.get_wallet(worker.id).await.unwrap().unwrap();
            assert_eq!(wallet.pending_balance, accepted.net_amount_cents());

            let mut tx = state.db_client.pool.begin().await.unwrap();
            let entry = crate::db::walletdb::find_transaction_by_reference(
                &mut tx,
                &accepted.hold_reference(),
            )
            .await
            .unwrap()
            .unwrap();
            tx.rollback().await.unwrap();
            assert_eq!(entry.booking_id, Some(accepted.id));
            assert_eq!(entry.pending_after, accepted.net_amount_cents());
        }

        #[tokio::test]
        async fn failed_compliance_leaves_booking_and_wallet_untouched() {
            let Some(state) = test_state(2).await else { return };
            let worker = compliant_worker(&state).await;
            let business = user(&state, UserRole::Business).await;
            let posting = standard_job(&state, &business).await;
            let pending = state.booking_service.apply(&worker, posting.id).await.unwrap();
            state
                .db_client
                .set_worker_flags(worker.id, None, Some(true))
                .await
                .unwrap();

            let err = state.booking_service.accept(&business, pending.id).await.unwrap_err();

            assert!(matches!(err, ServiceError::ComplianceFailed(_)));
            let after = state.db_client.get_booking_by_id(pending.id).await.unwrap().unwrap();
            assert_eq!(after.status, BookingStatus::Pending);
            assert_eq!(
                state.db_client.count_wallet_transactions(worker.id, None).await.unwrap(),
                0
            );
        }

        #[tokio::test]
        async fn no_show_reason_is_reserved_for_mark_no_show() {
            let Some(state) = test_state(2).await else { return };
            let (_, business, accepted) = accepted_booking(&state).await;
            let no_show = state
                .db_client
                .get_cancellation_reason_by_code(NO_SHOW_REASON_CODE)
                .await
                .unwrap()
                .unwrap();

            let err = state
                .booking_service
                .cancel(&business, accepted.id, no_show.id, None)
                .await
                .unwrap_err();

            assert!(matches!(err, ServiceError::Validation(_)));
            let after = state.db_client.get_booking_by_id(accepted.id).await.unwrap().unwrap();
            assert_eq!(after.status, BookingStatus::Accepted);
            assert!(!after.no_show);
        }
    }
}
