use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(from = "SALES_TABLE", default = "sales_transactions")]
    pub table_name: String,
}
