pub mod fetcher;
pub mod publisher;
