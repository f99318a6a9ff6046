pub mod lineup;
pub mod report;
