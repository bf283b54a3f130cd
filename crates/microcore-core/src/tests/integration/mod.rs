pub mod common;
mod boot_tests;
mod messaging_tests;
