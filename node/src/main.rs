// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use logpong_node::config::NodeConfig;
use logpong_node::telemetry::init_telemetry;

#[tokio::main]
async fn main() {
    init_telemetry();

    let cfg = match NodeConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Refusing to start: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Initializing logpong node with config: {:?}", cfg);

    if let Err(e) = logpong_node::app::run(cfg).await {
        tracing::error!("Node stopped: {}", e);
        std::process::exit(1);
    }
}
