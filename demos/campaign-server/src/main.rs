//! A minimal runnable campaign server.
//!
//! Seeds one zone so freshly connected clients have somewhere to drop
//! tokens, then serves WebSocket clients until the process is killed.
//!
//! ```sh
//! campaign-server [bind-addr]    # default 0.0.0.0:8080
//! ```

use loreforge::prelude::*;

fn starter_campaign() -> Campaign {
    let mut campaign = Campaign::new("Demo Campaign");
    campaign.put_zone(Zone::new("The Broken Keep"));
    campaign
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info")
                }),
        )
        .init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "0.0.0.0:8080".to_string());

    let server = LoreforgeServer::builder()
        .bind(&addr)
        .campaign(starter_campaign())
        .build()
        .await?;
    tracing::info!(%addr, "campaign server up");

    server.run().await?;
    Ok(())
}
