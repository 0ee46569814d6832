// Application layer - Use cases and the record source port
pub mod error;
pub mod machine_service;
pub mod record_repository;
