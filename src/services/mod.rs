pub mod applications;
pub mod catalog;
pub mod contact;
pub mod coordinator;
pub mod delivery;
pub mod flow;
pub mod sessions;
pub mod voice;
