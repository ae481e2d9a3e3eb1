//! Run the full pipeline on an interval over the in-memory stores and
//! serve Prometheus metrics. Provider-backed store clients plug in at the
//! same trait seams when they exist.

use std::time::Duration;

use envconfig::Envconfig;

use sales_common::metrics::{serve, setup_metrics_router};
use sales_pipeline::Pipeline;

#[derive(Envconfig)]
struct Config {
    #[envconfig(from = "BIND_HOST", default = "0.0.0.0")]
    pub host: String,

    #[envconfig(from = "BIND_PORT", default = "3301")]
    pub port: u16,

    #[envconfig(from = "PASS_INTERVAL_SECS", default = "30")]
    pub pass_interval_secs: u64,

    #[envconfig(nested = true)]
    pub generator: sales_generator::config::Config,

    #[envconfig(nested = true)]
    pub propagator: sales_propagator::config::Config,

    #[envconfig(nested = true)]
    pub transformer: sales_transformer::config::Config,

    #[envconfig(nested = true)]
    pub aggregator: sales_aggregator::config::Config,
}

impl Config {
    /// Produce a host:port address for binding a TcpListener.
    fn bind(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::init_from_env().expect("failed to load configuration from env");

    tracing::info!(
        table = %config.generator.table_name,
        landing = %config.propagator.landing_bucket,
        cleansed = %config.transformer.cleansed_bucket,
        golden = %config.aggregator.golden_bucket,
        "starting pipeline over in-memory stores"
    );

    let pipeline = Pipeline::new(
        &config.propagator.landing_bucket,
        &config.transformer.cleansed_bucket,
        &config.aggregator.golden_bucket,
    );

    let bind = config.bind();
    tokio::task::spawn(async move {
        let router = setup_metrics_router();
        serve(router, &bind)
            .await
            .expect("failed to start serving metrics");
    });

    let mut interval = tokio::time::interval(Duration::from_secs(config.pass_interval_secs));
    loop {
        interval.tick().await;

        match pipeline.run_once().await {
            Ok(pass) => tracing::info!(
                generated = pass.generated,
                landed = pass.landed,
                cleansed = pass.cleansed,
                summaries = pass.summaries,
                "pipeline pass complete"
            ),
            Err(err) => tracing::error!("pipeline pass failed: {:#}", err),
        }
    }
}
