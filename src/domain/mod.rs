// Domain layer - Areas, daily records and coverage values
pub mod area;
pub mod coverage;
pub mod error;
