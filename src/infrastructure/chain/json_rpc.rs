use crate::core::errors::RentSplitError;
use crate::core::wallet::{format_ether, parse_quantity};
use crate::infrastructure::chain::ChainRpc;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

/// Ethereum-style JSON-RPC endpoint queried with `eth_getBalance`.
pub struct JsonRpcChain {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<Value>,
}

impl JsonRpcChain {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RentSplitError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RentSplitError::ChainRpcError(format!("HTTP client: {}", e)))?;
        Ok(JsonRpcChain {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ChainRpc for JsonRpcChain {
    async fn get_balance(&self, address: &str) -> Result<String, RentSplitError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_getBalance",
            "params": [address, "latest"],
        });
        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RentSplitError::ChainRpcError(e.to_string()))?
            .error_for_status()
            .map_err(|e| RentSplitError::ChainRpcError(e.to_string()))?
            .json()
            .await
            .map_err(|e| RentSplitError::ChainRpcError(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(RentSplitError::ChainRpcError(error.to_string()));
        }
        let quantity = response
            .result
            .ok_or_else(|| RentSplitError::ChainRpcError("empty result".to_string()))?;
        let wei = parse_quantity(&quantity)
            .ok_or_else(|| RentSplitError::ChainRpcError(format!("bad quantity {}", quantity)))?;
        Ok(format_ether(wei))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const ADDRESS: &str = "0x1111111111111111111111111111111111111111";

    async fn balance_for(status: u16, body: serde_json::Value) -> Result<String, RentSplitError> {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/rpc").json_body(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "eth_getBalance",
                "params": [ADDRESS, "latest"],
            }));
            then.status(status).json_body(body);
        });
        let chain = JsonRpcChain::new(server.url("/rpc"), Duration::from_secs(5)).unwrap();
        let result = chain.get_balance(ADDRESS).await;
        mock.assert();
        result
    }

    fn rpc_error(result: Result<String, RentSplitError>) -> String {
        match result {
            Err(RentSplitError::ChainRpcError(message)) => message,
            other => panic!("Expected ChainRpcError, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_balance_is_formatted_in_whole_units() {
        let balance = balance_for(200, json!({ "jsonrpc": "2.0", "id": 1, "result": "0x14d1120d7b160000" }))
            .await
            .unwrap();
        assert_eq!(balance, "1.5");
    }

    #[tokio::test]
    async fn test_rpc_error_object_is_reported() {
        let message = rpc_error(
            balance_for(
                200,
                json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -32000, "message": "header not found" } }),
            )
            .await,
        );
        assert!(message.contains("header not found"), "got: {message}");
    }

    #[tokio::test]
    async fn test_missing_result_and_http_failure_are_errors() {
        let message = rpc_error(balance_for(200, json!({ "jsonrpc": "2.0", "id": 1 })).await);
        assert_eq!(message, "empty result");

        let message = rpc_error(balance_for(200, json!({ "jsonrpc": "2.0", "id": 1, "result": "12" })).await);
        assert_eq!(message, "bad quantity 12");

        rpc_error(balance_for(500, json!({ "message": "upstream down" })).await);
    }
}
