pub mod evaluate;
pub mod models;
pub mod property;
