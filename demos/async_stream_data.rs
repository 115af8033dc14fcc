//! Fetch filtered, sorted records from one stream.
//!
//! Run:
//! `SMARTDATA_LOGIN=<login> SMARTDATA_PASSWORD=<password> cargo run --example async_stream_data -- <stream-id> [query]`

use smartdata::{ClientConfig, DataQuery, SmartDataClient, SortOrder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let Some(stream_id) = args.next() else {
        eprintln!("usage: async_stream_data <stream-id> [query]");
        std::process::exit(2);
    };

    let client = SmartDataClient::from_config(ClientConfig::from_env()?)?;
    let stream = client.stream(&stream_id).await?;

    let mut query = DataQuery::new().page(0, 10).sort_by("_id", SortOrder::Desc);
    if let Some(filter) = args.next() {
        query = query.query(filter);
    }

    println!("fields: {}", stream.fields().await?);
    let data = stream.data(Some(query.into())).await?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}
