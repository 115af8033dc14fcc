//! Hand the stream listing to a callback instead of awaiting it.
//!
//! Run:
//! `SMARTDATA_LOGIN=<login> SMARTDATA_PASSWORD=<password> cargo run --example callback_streams`

use smartdata::callback::{self, Callback};
use smartdata::{ClientConfig, DataStream, SmartDataClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = SmartDataClient::from_config(ClientConfig::from_env()?)?;

    let on_streams: Callback<Vec<DataStream>> = Box::new(|result| match result {
        Ok(streams) => println!("received {} streams", streams.len()),
        Err(error) => eprintln!("listing failed: {error}"),
    });

    let pending = callback::spawn(async move { client.streams(None).await }, Some(on_streams));
    println!("request dispatched");
    pending.await?;
    Ok(())
}
