pub mod backend;
pub mod bedrock;
pub mod inference;
pub mod models;
