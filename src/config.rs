use std::env;

pub const DEFAULT_PRICE_API_URL: &str = "https://api.coinbase.com/v2/exchange-rates";

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON-RPC endpoint used to read pool snapshots; without it callers must send inline snapshots
    pub rpc_url: Option<String>,
    pub price_api_url: String,
    pub port: u16,

    // Pricing defaults for USD-denominated deposits
    pub default_token0_symbol: String,
    pub token1_usd_peg: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load configuration files (secrets first, then public config)
        dotenv::from_filename("secrets.env").ok();
        dotenv::from_filename("config/planner.env").ok();
        dotenv::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token1_usd_peg: f64 = match var("TOKEN1_USD_PEG") {
            Some(v) => v.parse().map_err(|_| format!("TOKEN1_USD_PEG must be a number, got {:?}", v))?,
            None => 1.0,
        };
        if !token1_usd_peg.is_finite() || token1_usd_peg <= 0.0 {
            return Err(format!("TOKEN1_USD_PEG must be positive, got {}", token1_usd_peg).into());
        }

        Ok(Config {
            rpc_url: var("RPC_URL").filter(|v| !v.trim().is_empty()),
            price_api_url: var("PRICE_API_URL")
                .unwrap_or_else(|| DEFAULT_PRICE_API_URL.to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse()
                .unwrap_or(8000),

            default_token0_symbol: var("DEFAULT_TOKEN0_SYMBOL")
                .unwrap_or_else(|| "ETH".to_string()),
            token1_usd_peg,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, Box<dyn std::error::Error>> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_vars(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let c = config_from(&[]).unwrap();
        assert!(c.rpc_url.is_none());
        assert_eq!(c.price_api_url, DEFAULT_PRICE_API_URL);
        assert_eq!(c.port, 8000);
        assert_eq!(c.default_token0_symbol, "ETH");
        assert_eq!(c.token1_usd_peg, 1.0);
    }

    #[test]
    fn reads_overrides() {
        let c = config_from(&[
            ("RPC_URL", "http://localhost:8545"),
            ("PORT", "9100"),
            ("DEFAULT_TOKEN0_SYMBOL", "BTC"),
            ("TOKEN1_USD_PEG", "0.999"),
        ])
        .unwrap();
        assert_eq!(c.rpc_url.as_deref(), Some("http://localhost:8545"));
        assert_eq!(c.port, 9100);
        assert_eq!(c.default_token0_symbol, "BTC");
        assert!((c.token1_usd_peg - 0.999).abs() < 1e-12);
    }

    #[test]
    fn bad_port_falls_back_and_blank_rpc_is_none() {
        let c = config_from(&[("PORT", "nope"), ("RPC_URL", "  ")]).unwrap();
        assert_eq!(c.port, 8000);
        assert!(c.rpc_url.is_none());
    }

    #[test]
    fn rejects_non_positive_peg() {
        assert!(config_from(&[("TOKEN1_USD_PEG", "0")]).is_err());
        assert!(config_from(&[("TOKEN1_USD_PEG", "x")]).is_err());
    }
}
