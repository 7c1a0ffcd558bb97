//! Lists your active Megaplan tasks.
//!
//! # Usage
//!
//! ```bash
//! MEGAPLAN_HOST=xyz.megaplan.ru \
//! MEGAPLAN_LOGIN=jdoe \
//! MEGAPLAN_PASSWORD=... \
//!     cargo run --example list_tasks
//! ```
//!
//! Set `MEGAPLAN_ACCESS_ID` and `MEGAPLAN_SECRET_KEY` instead of the
//! login/password pair to reuse stored credentials.

use std::env;

use anyhow::{Context, Result};

use megaplan_client::MegaplanClient;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let host = env::var("MEGAPLAN_HOST").context("MEGAPLAN_HOST is not set")?;

    let client = match (env::var("MEGAPLAN_ACCESS_ID"), env::var("MEGAPLAN_SECRET_KEY")) {
        (Ok(access_id), Ok(secret_key)) => {
            MegaplanClient::with_credentials(host, access_id, secret_key)
        }
        _ => {
            let login = env::var("MEGAPLAN_LOGIN").context("MEGAPLAN_LOGIN is not set")?;
            let password =
                env::var("MEGAPLAN_PASSWORD").context("MEGAPLAN_PASSWORD is not set")?;
            let client = MegaplanClient::new(host);
            let grant = client.authenticate(&login, &password).await?;
            println!("signed in as employee {}", grant.employee_id);
            client
        }
    };

    let tasks = client.actual_tasks().await?;
    println!("{} active task(s)", tasks.len());
    for task in tasks {
        let name = task
            .get("Name")
            .and_then(|name| name.as_str())
            .unwrap_or("<unnamed>");
        println!("  {name}");
    }

    Ok(())
}
