//! different utility modules used throughout the project
/// logger setup and saving of trajectories into files
pub mod logger;
/// TOML task files: problem, method, output and logging in one document
pub mod task_config;
