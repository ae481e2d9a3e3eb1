use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(from = "LANDING_BUCKET", default = "sales-landing")]
    pub landing_bucket: String,
}
