//! Wire types for the USDM futures REST API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use usdm_core::{ClientOrderId, OrderSide, OrderType, Side, TimeInForce};

/// New-order request for `POST /fapi/v1/order`.
///
/// Optional fields are omitted from the signed query entirely when unset;
/// Binance rejects empty parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    /// Base-asset quantity, already quantized to the symbol's lot step.
    pub quantity: Option<String>,
    /// Limit price, already quantized to the symbol's price step.
    pub price: Option<String>,
    /// Trigger price for stop-type orders.
    pub stop_price: Option<String>,
    pub time_in_force: Option<TimeInForce>,
    /// Epoch milliseconds at which the exchange auto-cancels a GTD order.
    pub good_till_date: Option<i64>,
    /// When true the exchange closes the whole position; no quantity is sent.
    pub close_position: bool,
    /// Idempotency key, forwarded verbatim as `newClientOrderId`.
    pub client_order_id: ClientOrderId,
}

impl OrderRequest {
    /// Query parameters in wire order, excluding timestamp/recvWindow
    /// which the client appends before signing.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("symbol", self.symbol.clone()),
            ("side", self.side.as_str().to_string()),
            ("type", self.order_type.as_str().to_string()),
        ];
        if let Some(quantity) = &self.quantity {
            params.push(("quantity", quantity.clone()));
        }
        if let Some(price) = &self.price {
            params.push(("price", price.clone()));
        }
        if let Some(stop_price) = &self.stop_price {
            params.push(("stopPrice", stop_price.clone()));
        }
        if let Some(tif) = self.time_in_force {
            params.push(("timeInForce", tif.as_str().to_string()));
        }
        if let Some(gtd) = self.good_till_date {
            params.push(("goodTillDate", gtd.to_string()));
        }
        if self.close_position {
            params.push(("closePosition", "true".to_string()));
        }
        params.push(("newClientOrderId", self.client_order_id.to_string()));
        params
    }
}

/// Acknowledgement returned by the order endpoint.
///
/// Unrecognized fields are retained in `extra` so that persisting a
/// serialized ack round-trips the full exchange response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    pub order_id: i64,
    pub symbol: String,
    pub status: String,
    pub client_order_id: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One row of `GET /fapi/v2/positionRisk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    /// Signed position size: negative means short exposure.
    #[serde(with = "rust_decimal::serde::str")]
    pub position_amt: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub entry_price: Decimal,
}

impl Position {
    /// Direction of the open exposure, `None` when flat.
    pub fn side(&self) -> Option<Side> {
        if self.position_amt.is_zero() {
            None
        } else if self.position_amt.is_sign_positive() {
            Some(Side::Long)
        } else {
            Some(Side::Short)
        }
    }

    /// Absolute position size, suitable as an order quantity.
    pub fn size(&self) -> Decimal {
        self.position_amt.abs()
    }
}

/// Per-symbol filter from exchange info.
///
/// Binance models filters as a heterogeneous list discriminated by
/// `filterType`; only the two step filters carry fields we read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolFilter {
    pub filter_type: String,
    #[serde(default)]
    pub tick_size: Option<String>,
    #[serde(default)]
    pub step_size: Option<String>,
}

/// One symbol entry of `GET /fapi/v1/exchangeInfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub status: String,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
}

impl SymbolInfo {
    /// Whether the symbol is currently tradable.
    pub fn is_trading(&self) -> bool {
        self.status == "TRADING"
    }

    /// Price increment from the `PRICE_FILTER` entry.
    pub fn price_step(&self) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| f.filter_type == "PRICE_FILTER")
            .and_then(|f| f.tick_size.as_deref())
    }

    /// Quantity increment from the `LOT_SIZE` entry.
    pub fn quantity_step(&self) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| f.filter_type == "LOT_SIZE")
            .and_then(|f| f.step_size.as_deref())
    }
}

/// Exchange-wide trading rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}
