pub mod feeds;
pub mod files;
pub mod indicators;
pub mod sqlite;
