pub mod adapter;
pub mod config;
pub mod row;
pub mod temp_table;
