// Plugin system test modules
#[cfg(test)]
mod dependency_tests;
