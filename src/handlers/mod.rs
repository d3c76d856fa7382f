pub mod booking;
pub mod catalog;
pub mod contact;
pub mod health;
pub mod join_team;
