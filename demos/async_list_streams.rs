//! List the first page of streams using the async `SmartDataClient`.
//!
//! Run:
//! `SMARTDATA_LOGIN=<login> SMARTDATA_PASSWORD=<password> cargo run --example async_list_streams`
//!
//! Optional env vars:
//! - `SMARTDATA_IN_URL` / `SMARTDATA_OUT_URL` (default to the production roots)
//! - `SMARTDATA_PROXY` (forwarding proxy)
//! - `SMARTDATA_PAGE_SIZE` (defaults to `5`)

use smartdata::{ClientConfig, Pagination, SmartDataClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let size = std::env::var("SMARTDATA_PAGE_SIZE")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(5);

    let client = SmartDataClient::from_config(ClientConfig::from_env()?)?;
    let streams = client.streams(Some(Pagination::new(0, size).into())).await?;

    for stream in &streams {
        println!("{}", serde_json::to_string(stream)?);
    }
    Ok(())
}
