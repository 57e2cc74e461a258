pub mod auth_service;
pub mod item_service;
pub mod rating_aggregator;
pub mod review_service;
pub mod review_store;
