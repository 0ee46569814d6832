// Domain layer - Records, aggregation and health model
pub mod aggregate;
pub mod breakdown;
pub mod health_model;
pub mod machine;
pub mod record;
pub mod status;
