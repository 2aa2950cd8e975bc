//! different utility modules used throughout the project
/// logger initialisation and saving the iteration trace into a file
pub mod logger;
/// read a solver task (expression, solver settings, logging, output) from a TOML document
pub mod task_parser;
