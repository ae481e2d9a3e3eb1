use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(from = "GOLDEN_BUCKET", default = "sales-golden")]
    pub golden_bucket: String,
}
