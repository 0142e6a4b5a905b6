pub mod batch_report;
pub mod file_descriptor;
pub mod key_set;
pub mod remote_object;
pub mod run_settings;
