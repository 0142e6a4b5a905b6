pub mod cipher;
pub mod file_lister;
pub mod object_store;
