//! Inspect or clear the stored connection record

use anyhow::Result;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::ConnectionStore;

pub fn show(config_path: Option<String>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let store = ConnectionStore::new(config.store.path.as_str());

    match store.get(&config.store.conn_id)? {
        Some(record) => {
            println!("conn_id:   {}", record.conn_id);
            println!("conn_type: {}", record.conn_type);
            println!("host:      {}", record.host);
            println!("login:     {}", record.login);
            println!("password:  {}", record.masked_password());
        }
        None => {
            println!(
                "No connection stored under {} in {}",
                config.store.conn_id,
                store.path().display()
            );
        }
    }

    Ok(())
}

pub fn clear(config_path: Option<String>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let store = ConnectionStore::new(config.store.path.as_str());

    if store.remove(&config.store.conn_id)? {
        info!("Removed connection {}", config.store.conn_id);
    } else {
        info!("No connection {} to remove", config.store.conn_id);
    }

    Ok(())
}
