//! Command implementations, one module per subcommand

pub mod connection;
pub mod refresh_credentials;
pub mod run;
pub mod scrape;
