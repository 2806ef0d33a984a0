use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExchangeRatesResponse {
    data: ExchangeRatesData,
}

#[derive(Debug, Deserialize)]
struct ExchangeRatesData {
    rates: std::collections::HashMap<String, String>,
}

/// USD spot prices from the Coinbase exchange-rates endpoint.
pub struct PriceClient {
    client: Client,
    api_url: String,
}

impl PriceClient {
    pub fn new(api_url: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub async fn get_usd_price(&self, symbol: &str) -> Result<f64> {
        let response: ExchangeRatesResponse = self.client
            .get(&self.api_url)
            .query(&[("currency", symbol)])
            .send()
            .await
            .with_context(|| format!("Failed to fetch {} rates", symbol))?
            .error_for_status()
            .context("Price API returned an error status")?
            .json()
            .await
            .context("Failed to parse exchange-rates response")?;

        parse_usd_rate(&response)
    }
}

fn parse_usd_rate(response: &ExchangeRatesResponse) -> Result<f64> {
    let usd_rate = response.data.rates.get("USD")
        .context("USD rate not found in exchange-rates response")?;

    let price: f64 = usd_rate.parse()
        .context("Failed to parse USD rate as float")?;

    if !price.is_finite() || price <= 0.0 {
        anyhow::bail!("USD rate must be positive, got {}", price);
    }
    Ok(price)
}
