use anyhow::{Context, Result};
use ethers::prelude::*;
use std::sync::Arc;

pub fn create_provider(rpc_url: &str) -> Result<Arc<Provider<Http>>> {
    let provider = Provider::<Http>::try_from(rpc_url)
        .with_context(|| format!("invalid RPC url {}", rpc_url))?;
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_provider_without_network() {
        assert!(create_provider("http://localhost:8545").is_ok());
    }

    #[test]
    fn rejects_malformed_url() {
        assert!(create_provider("not a url").is_err());
    }
}
