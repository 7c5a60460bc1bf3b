//! Built-in broker table.
//!
//! Used when the configuration file lists no brokers. Base URLs and client
//! ids come from the environment through the usual `${VAR:-default}`
//! interpolation; `${TOKEN:...}` and `${ENV:...}` refresh placeholders are
//! left for the adapter to resolve per request.

/// YAML for the `metatrader` and `zerodha` brokers.
///
/// Zerodha signals direction through signed quantities, so its side path is
/// empty and the quantity sign decides.
pub const BUILTIN_BROKERS_YAML: &str = r#"
- name: metatrader
  base_url: "${METATRADER_BASE_URL:-https://api.metatrader.com}"
  endpoints:
    trades: /v1/trades
    refresh: /v1/auth/refresh
  response_path: ""
  headers:
    X-API-Version: "1.0"
    X-Client-ID: "${METATRADER_CLIENT_ID:-}"
  mapping:
    symbol: symbol
    quantity: volume
    price: price
    timestamp: time
    side: type
  refresh_payload:
    refresh_token: "${TOKEN:refresh}"
    grant_type: refresh_token
    client_id: "${ENV:METATRADER_CLIENT_ID}"
    client_secret: "${ENV:METATRADER_CLIENT_SECRET}"

- name: zerodha
  base_url: "${ZERODHA_BASE_URL:-https://api.kite.trade}"
  endpoints:
    trades: /portfolio/positions
    refresh: /session/refresh_token
  response_path: data.positions.NRML
  headers:
    X-Kite-Version: "3"
  mapping:
    symbol: tradingsymbol
    quantity: quantity
    price: average_price
    timestamp: ""
    side: ""
  refresh_payload:
    refresh_token: "${TOKEN:refresh}"
    client_id: "${ENV:ZERODHA_API_KEY}"
    client_secret: "${ENV:ZERODHA_API_SECRET}"
"#;
