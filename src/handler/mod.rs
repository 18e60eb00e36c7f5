pub mod auth;
pub mod badges;
pub mod bookings;
pub mod cancellations;
pub mod chat;
pub mod disputes;
pub mod earnings;
pub mod jobs;
pub mod notifications;
pub mod reviews;
pub mod social;
pub mod users;
pub mod wallet;
