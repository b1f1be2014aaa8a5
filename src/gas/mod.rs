//! Gas station poller
//!
//! Periodically fetches the current gas prices from an external HTTP
//! service and keeps the latest payload for the foreign chain client's fee
//! computation. Reads are bounded by a configured maximum and select one of
//! the published price tiers.

use crate::error::{BridgeError, BridgeResult};

use async_trait::async_trait;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

const MIN_POLLING_INTERVAL: Duration = Duration::from_secs(1);
const MIN_REQUEST_TIME: Duration = Duration::from_millis(1);

/// Which gas station price tier the relayer submits with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPriceSelector {
    Fast,
    Fastest,
    SafeLow,
    Average,
}

impl GasPriceSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Fastest => "fastest",
            Self::SafeLow => "safe_low",
            Self::Average => "average",
        }
    }
}

impl FromStr for GasPriceSelector {
    type Err = BridgeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "fast" => Ok(Self::Fast),
            "fastest" => Ok(Self::Fastest),
            "safe_low" => Ok(Self::SafeLow),
            "average" => Ok(Self::Average),
            other => Err(BridgeError::InvalidGasPriceSelector(other.to_string())),
        }
    }
}

/// The gas station JSON payload. Fields the service omits read as zero;
/// selector problems surface at read time, not at fetch time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GasStationResponse {
    #[serde(default)]
    pub fast: u64,
    #[serde(default)]
    pub fastest: u64,
    #[serde(default)]
    pub safe_low: u64,
    #[serde(default)]
    pub average: u64,
}

/// Transport seam for the poller, reqwest-backed in production.
#[async_trait]
pub trait GasStationHttpClient: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> BridgeResult<GasStationResponse>;
}

pub struct ReqwestGasStationClient {
    client: reqwest::Client,
}

impl ReqwestGasStationClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestGasStationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GasStationHttpClient for ReqwestGasStationClient {
    async fn fetch(&self, url: &str, timeout: Duration) -> BridgeResult<GasStationResponse> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        Ok(response.json::<GasStationResponse>().await?)
    }
}

#[derive(Debug, Clone)]
pub struct GasStationConfig {
    pub request_url: String,
    pub polling_interval: Duration,
    pub request_time: Duration,
    pub maximum_gas_price: u64,
    pub selector: GasPriceSelector,
}

/// Periodic fetcher plus bounded reader of the latest gas prices.
pub struct GasStation {
    config: GasStationConfig,
    http_client: Arc<dyn GasStationHttpClient>,
    latest_response: RwLock<Option<GasStationResponse>>,
}

impl GasStation {
    pub fn new(
        config: GasStationConfig,
        http_client: Arc<dyn GasStationHttpClient>,
    ) -> BridgeResult<Arc<Self>> {
        if config.polling_interval < MIN_POLLING_INTERVAL {
            return Err(BridgeError::InvalidDuration {
                name: "polling_interval",
                got_millis: config.polling_interval.as_millis(),
                minimum_millis: MIN_POLLING_INTERVAL.as_millis(),
            });
        }
        if config.request_time < MIN_REQUEST_TIME {
            return Err(BridgeError::InvalidDuration {
                name: "request_time",
                got_millis: config.request_time.as_millis(),
                minimum_millis: MIN_REQUEST_TIME.as_millis(),
            });
        }

        Ok(Arc::new(Self {
            config,
            http_client,
            latest_response: RwLock::new(None),
        }))
    }

    /// Spawns the poll loop; it stops cleanly when the token fires.
    pub fn start(self: &Arc<Self>, cancellation: CancellationToken) -> JoinHandle<()> {
        let station = Arc::clone(self);
        tokio::spawn(async move { station.process_loop(cancellation).await })
    }

    async fn process_loop(&self, cancellation: CancellationToken) {
        loop {
            match self
                .http_client
                .fetch(&self.config.request_url, self.config.request_time)
                .await
            {
                Ok(response) => {
                    debug!("gas station fetched new response {:?}", response);
                    self.store_response(response);
                }
                Err(err) => error!("gas station fetch failed: {}", err),
            }

            tokio::select! {
                _ = cancellation.cancelled() => {
                    debug!("gas station poll loop is closing");
                    return;
                }
                _ = tokio::time::sleep(self.config.polling_interval) => {}
            }
        }
    }

    fn store_response(&self, response: GasStationResponse) {
        *self.latest_response.write().unwrap() = Some(response);
    }

    /// The selected price tier from the last successful poll. Errors before
    /// the first poll, and when the selected value exceeds the configured
    /// maximum.
    pub fn get_current_gas_price(&self) -> BridgeResult<u64> {
        let guard = self.latest_response.read().unwrap();
        let response = guard.as_ref().ok_or(BridgeError::GasPricesNotFetched)?;

        let gas_price = match self.config.selector {
            GasPriceSelector::Fast => response.fast,
            GasPriceSelector::Fastest => response.fastest,
            GasPriceSelector::SafeLow => response.safe_low,
            GasPriceSelector::Average => response.average,
        };

        if gas_price > self.config.maximum_gas_price {
            return Err(BridgeError::GasPriceAboveMaximum {
                maximum: self.config.maximum_gas_price,
                fetched: gas_price,
                selector: self.config.selector.as_str(),
            });
        }

        Ok(gas_price)
    }
}
