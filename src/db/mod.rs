pub mod badgedb;
pub mod bookingdb;
pub mod cancellationdb;
pub mod chatdb;
pub mod db;
pub mod disputedb;
pub mod jobdb;
pub mod notificationdb;
pub mod profiledb;
pub mod reviewdb;
pub mod socialdb;
pub mod statsdb;
pub mod userdb;
pub mod walletdb;
