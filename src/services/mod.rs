mod read_service;

pub use read_service::*;
