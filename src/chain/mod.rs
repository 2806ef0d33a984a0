pub mod pool_client;
pub mod price_client;
pub mod providers;
