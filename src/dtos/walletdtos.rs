use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::RequestQueryDto;
use crate::{
    models::{disputemodel::DisputeOutcome, walletmodels::WalletTxKind},
    service::earnings_service::EarningsPeriod,
};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawDto {
    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount_cents: i64,
    /// Client idempotency key; retries with the same key are no-ops.
    #[validate(length(min = 1, max = 76, message = "Reference must be 1-76 characters"))]
    pub reference: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct WalletTxQueryDto {
    pub kind: Option<WalletTxKind>,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

impl WalletTxQueryDto {
    pub fn pagination(&self) -> RequestQueryDto {
        RequestQueryDto { page: self.page, limit: self.limit }
    }
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct OpenDisputeDto {
    pub booking_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "Reason must be 1-100 characters"))]
    pub reason: String,
    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ResolveDisputeDto {
    pub outcome: DisputeOutcome,
    #[validate(range(min = 0, max = 10000, message = "worker_share_bps must be between 0 and 10000"))]
    pub worker_share_bps: Option<i32>,
    #[validate(length(min = 1, max = 2000, message = "Resolution note is required"))]
    pub note: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RejectDisputeDto {
    #[validate(length(min = 1, max = 2000, message = "Note is required"))]
    pub note: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EarningsQueryDto {
    #[serde(default)]
    pub period: EarningsPeriod,
    pub since: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::walletmodels::LEDGER_REFERENCE_MAX_LEN, service::wallet_service::payout_reference,
    };

    #[test]
    fn withdraw_needs_amount_and_reference() {
        let ok = WithdrawDto { amount_cents: 500, reference: "w-1".into() };
        assert!(ok.validate().is_ok());
        let zero = WithdrawDto { amount_cents: 0, reference: "w-1".into() };
        assert!(zero.validate().is_err());
        let blank = WithdrawDto { amount_cents: 5, reference: String::new() };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn longest_reference_fits_the_ledger_column() {
        let longest = WithdrawDto { amount_cents: 500, reference: "r".repeat(76) };
        assert!(longest.validate().is_ok());
        assert_eq!(
            payout_reference(Uuid::new_v4(), &longest.reference).len(),
            LEDGER_REFERENCE_MAX_LEN
        );

        let too_long = WithdrawDto { amount_cents: 500, reference: "r".repeat(77) };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn resolve_share_is_bounded() {
        let dto: ResolveDisputeDto = serde_json::from_value(serde_json::json!({
            "outcome": "split",
            "worker_share_bps": 12000,
            "note": "Worker left early"
        }))
        .unwrap();
        assert_eq!(dto.outcome, DisputeOutcome::Split);
        assert!(dto.validate().is_err());
    }
}
