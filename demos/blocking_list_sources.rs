//! List sources and their fields with the `BlockingSmartDataClient`.
//!
//! Run:
//! `SMARTDATA_LOGIN=<login> SMARTDATA_PASSWORD=<password> cargo run --example blocking_list_sources`

use smartdata::{BlockingSmartDataClient, ClientConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}: set SMARTDATA_LOGIN and SMARTDATA_PASSWORD before running this example.");
            std::process::exit(2);
        }
    };

    let client = BlockingSmartDataClient::from_config(config)?;
    for source in client.sources(None)? {
        println!("{}: {}", source.id(), source.fields()?);
    }
    Ok(())
}
