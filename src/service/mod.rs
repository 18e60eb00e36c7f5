pub mod background_jobs;
pub mod badge_service;
pub mod booking_service;
pub mod compliance_service;
pub mod dispute_service;
pub mod earnings_service;
pub mod error;
pub mod notification_service;
pub mod reliability_service;
pub mod social_service;
pub mod wallet_service;

#[cfg(test)]
pub mod test_support;
