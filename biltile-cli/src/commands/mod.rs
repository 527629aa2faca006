pub mod fetch;
pub mod info;
pub mod query;
