pub mod badgemodel;
pub mod bookingmodel;
pub mod cancellationmodel;
pub mod chatmodel;
pub mod disputemodel;
pub mod jobmodel;
pub mod notificationmodel;
pub mod profilemodel;
pub mod reviewmodel;
pub mod socialmodel;
pub mod statsmodel;
pub mod usermodel;
pub mod walletmodels;
