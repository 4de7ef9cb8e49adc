//! HTTP client for the Binance USDM futures REST API.
//!
//! Signed endpoints use the standard Binance scheme: the query string is
//! HMAC-SHA256 signed with the account secret and the API key travels in
//! the `X-MBX-APIKEY` header.

use crate::api::ExchangeApi;
use crate::error::{ExchangeError, ExchangeResult};
use crate::types::{ExchangeInfo, OrderAck, OrderRequest, Position};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};
use usdm_core::GlobalSettings;

type HmacSha256 = Hmac<Sha256>;

/// Production REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";

/// Timeout applied to every request at client construction.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

struct Credentials {
    api_key: String,
    secret: String,
}

/// REST client, either public (exchange info only) or signed per account.
pub struct UsdmClient {
    http: Client,
    base_url: String,
    credentials: Option<Credentials>,
    recv_window: u64,
}

impl UsdmClient {
    /// Client for public endpoints only.
    pub fn public(base_url: impl Into<String>) -> ExchangeResult<Self> {
        Self::build(base_url.into(), None, GlobalSettings::default().recv_window)
    }

    /// Client signing requests with one account's credential pair.
    pub fn signed(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        secret: impl Into<String>,
        recv_window: u64,
    ) -> ExchangeResult<Self> {
        Self::build(
            base_url.into(),
            Some(Credentials {
                api_key: api_key.into(),
                secret: secret.into(),
            }),
            recv_window,
        )
    }

    fn build(
        base_url: String,
        credentials: Option<Credentials>,
        recv_window: u64,
    ) -> ExchangeResult<Self> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ExchangeError::HttpClient(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url,
            credentials,
            recv_window,
        })
    }

    fn timestamp_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_millis() as u64
    }

    fn sign(secret: &str, query: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Append timestamp/recvWindow and the signature to `params`.
    fn signed_query(&self, params: &[(&str, String)]) -> ExchangeResult<(String, &Credentials)> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(ExchangeError::MissingCredentials)?;
        let mut query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(&format!(
            "recvWindow={}&timestamp={}",
            self.recv_window,
            Self::timestamp_ms()
        ));
        let signature = Self::sign(&credentials.secret, &query);
        query.push_str(&format!("&signature={signature}"));
        Ok((query, credentials))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ExchangeResult<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ExchangeError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ExchangeApi for UsdmClient {
    async fn exchange_info(&self) -> ExchangeResult<ExchangeInfo> {
        let url = format!("{}/fapi/v1/exchangeInfo", self.base_url);
        debug!(%url, "Fetching exchange info");
        let response = self.http.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn open_positions(&self) -> ExchangeResult<Vec<Position>> {
        let (query, credentials) = self.signed_query(&[])?;
        let url = format!("{}/fapi/v2/positionRisk?{query}", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("X-MBX-APIKEY", &credentials.api_key)
            .send()
            .await?;
        let positions: Vec<Position> = Self::decode(response).await?;
        Ok(positions
            .into_iter()
            .filter(|p| !p.position_amt.is_zero())
            .collect())
    }

    async fn submit_order(&self, request: &OrderRequest) -> ExchangeResult<OrderAck> {
        let params = request.query_params();
        let (query, credentials) = self.signed_query(&params)?;
        let url = format!("{}/fapi/v1/order?{query}", self.base_url);
        info!(
            symbol = %request.symbol,
            side = %request.side,
            order_type = %request.order_type,
            client_order_id = %request.client_order_id,
            "Submitting order"
        );
        let response = self
            .http
            .post(&url)
            .header("X-MBX-APIKEY", &credentials.api_key)
            .send()
            .await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_known_vector() {
        // Vector from the Binance API documentation.
        let secret = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            UsdmClient::sign(secret, query),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_signed_query_requires_credentials() {
        let client = UsdmClient::public(DEFAULT_BASE_URL).unwrap();
        assert!(matches!(
            client.signed_query(&[]),
            Err(ExchangeError::MissingCredentials)
        ));
    }

    #[test]
    fn test_signed_query_shape() {
        let client = UsdmClient::signed(DEFAULT_BASE_URL, "key", "secret", 5000).unwrap();
        let (query, credentials) = client
            .signed_query(&[("symbol", "BTCUSDT".to_string())])
            .unwrap();
        assert_eq!(credentials.api_key, "key");
        assert!(query.starts_with("symbol=BTCUSDT&recvWindow=5000&timestamp="));
        assert!(query.contains("&signature="));
    }
}
