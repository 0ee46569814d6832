// Lathe fleet health service - layers shared by the server and seeding binaries
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
