pub mod patient;
pub mod prescription;
pub mod order;
pub mod notification;
