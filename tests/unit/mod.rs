pub mod config_tests;
pub mod error_tests;
pub mod namespace_tests;
pub mod transform_tests;
pub mod validation_tests;
