pub mod atomic_write;
pub mod encryption_service;
pub mod pem_format;
pub mod preflight;
pub mod sync_service;
