pub mod glob_lister;
