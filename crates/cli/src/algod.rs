//! # algodクライアント
//!
//! Algorandノード（algod REST API v2）との通信。
//!
//! - `GET /v2/transactions/params`: トランザクション構築用パラメータ
//! - `POST /v2/transactions`: 署名済みトランザクションの送信（`application/x-binary`）
//!
//! 全リクエストに `X-Algo-API-Token` ヘッダを付与する（algonodeでは空文字列）。

use arcmint_types::{NodeErrorResponse, PostTransactionResponse, TransactionParams};

use crate::config::NodeEndpoint;
use crate::error::MintError;

/// APIトークンのヘッダ名
const API_TOKEN_HEADER: &str = "X-Algo-API-Token";

/// ノードAPIの抽象インターフェース。
#[async_trait::async_trait]
pub trait AlgodApi: Send + Sync {
    /// 推奨トランザクションパラメータを取得する。
    async fn transaction_params(&self) -> Result<TransactionParams, MintError>;

    /// 署名済みトランザクションを送信し、ノードが返したトランザクションIDを返す。
    async fn send_raw_transaction(&self, signed_txn: &[u8]) -> Result<String, MintError>;
}

/// reqwestによるalgodクライアント。
pub struct AlgodClient {
    http_client: reqwest::Client,
    /// `{url}:{port}`
    base_url: String,
    token: String,
}

impl AlgodClient {
    /// 接続先設定からクライアントを構築する。
    pub fn new(endpoint: &NodeEndpoint) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: format!("{}:{}", endpoint.url.trim_end_matches('/'), endpoint.port),
            token: endpoint.token.expose().to_string(),
        }
    }

    #[cfg(test)]
    fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 非2xxレスポンスをエラーに変換する。
    /// algodのエラーJSONに `message` があればそれを表に出す。
    async fn error_from_response(response: reqwest::Response, operation: &str) -> MintError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<NodeErrorResponse>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        tracing::error!(operation, %status, message = %message, "algodがエラーを返しました");
        MintError::Network(format!("{operation}: HTTP {status} - {message}"))
    }
}

#[async_trait::async_trait]
impl AlgodApi for AlgodClient {
    async fn transaction_params(&self) -> Result<TransactionParams, MintError> {
        let url = format!("{}/v2/transactions/params", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .header(API_TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| MintError::Network(format!("パラメータ取得の送信に失敗: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response, "パラメータ取得").await);
        }

        let params: TransactionParams = response
            .json()
            .await
            .map_err(|e| MintError::Network(format!("パラメータのパースに失敗: {e}")))?;
        tracing::debug!(
            last_round = params.last_round,
            genesis_id = %params.genesis_id,
            min_fee = params.min_fee,
            "トランザクションパラメータ取得"
        );
        Ok(params)
    }

    async fn send_raw_transaction(&self, signed_txn: &[u8]) -> Result<String, MintError> {
        let url = format!("{}/v2/transactions", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .header(API_TOKEN_HEADER, &self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/x-binary")
            .body(signed_txn.to_vec())
            .send()
            .await
            .map_err(|e| MintError::Network(format!("トランザクションの送信に失敗: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response, "トランザクション送信").await);
        }

        let result: PostTransactionResponse = response
            .json()
            .await
            .map_err(|e| MintError::Network(format!("送信結果のパースに失敗: {e}")))?;
        Ok(result.tx_id)
    }
}
