use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(from = "CLEANSED_BUCKET", default = "sales-cleansed")]
    pub cleansed_bucket: String,
}
