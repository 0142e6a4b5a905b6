pub mod cipher;
pub mod listing;
pub mod object_store;
