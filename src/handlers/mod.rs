pub mod databases;
pub mod records;
