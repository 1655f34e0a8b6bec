pub mod items;
pub mod queries;
pub mod report;
pub mod sales;
