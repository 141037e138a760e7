//! different utility modules used throughout the project
/// terminal logger for the engine's log macros
pub mod logger;
/// parse document with structure like "title1\n key1: value1, value2\n key2: value2\ntitle2\n key3: value3" into HashMap
pub mod task_parser;
/// typed analysis task read from a task document
pub mod analysis_task;
/// pretty printing of analysis results as tables
pub mod report;
