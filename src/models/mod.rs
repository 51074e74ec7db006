pub mod account;
pub mod listing;
pub mod medical_record;
pub mod patient;
