pub mod auth_service;
pub mod health_service;
pub mod ingest_service;
pub mod normalizer;
pub mod queue_publisher;
