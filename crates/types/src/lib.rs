//! # arcmint 共有型定義
//!
//! コレクション入力、ARC-69メタデータ、およびPinata / algod との
//! 通信で使用するデータ構造をRust構造体として提供する。
//!
//! ## エンコーディング規則
//! - Base32: Algorandアドレス、トランザクションID
//! - Base64: algod JSON内のバイナリデータ（genesis hash等）
//! - Base58: CIDv0（`Qm...`）

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ARC-69 メタデータ
// ---------------------------------------------------------------------------

/// ARC-69の標準識別子。
pub const ARC69_STANDARD: &str = "arc69";

/// コレクション画像のMIMEタイプ。
pub const PNG_MIME_TYPE: &str = "image/png";

/// ARC-69形式のアテステーションドキュメント。
/// トランザクションのnoteフィールドにJSONとして格納される。
///
/// フィールドの宣言順がそのままJSONのキー順になる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc69Metadata {
    /// 標準識別子（常に "arc69"）
    pub standard: String,
    /// コレクション共通の説明文
    pub description: String,
    /// コレクション共通の外部URL
    pub external_url: String,
    /// メディアのMIMEタイプ
    pub mime_type: String,
    /// アイテム固有の属性（入力JSONのキー順を保持）
    pub properties: serde_json::Value,
}

/// 入力メタデータJSONの1エントリ。
/// キーは1始まりの位置を文字列化したもの（`"1"`, `"2"`, ...）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// アイテム固有の属性
    #[serde(default)]
    pub properties: serde_json::Value,
}

// ---------------------------------------------------------------------------
// 入力アイテム
// ---------------------------------------------------------------------------

/// コレクションの1アイテム。ミント対象の画像とメタデータの組。
#[derive(Debug, Clone)]
pub struct InputItem {
    /// ソート後の1始まりの位置（メタデータJSONのキーに対応）
    pub position: usize,
    /// ファイル名から得たインデックス（`7.png` → 7）
    pub file_index: u64,
    /// 表示名（`"{name} #{file_index}"`）
    pub name: String,
    /// ユニット名（`"{unit_prefix}{file_index}"`）
    pub unit_name: String,
    /// 画像ファイルの絶対パス
    pub image: PathBuf,
    /// フォーマット済みARC-69メタデータ
    pub metadata: Arc69Metadata,
}

// ---------------------------------------------------------------------------
// Pinata API
// ---------------------------------------------------------------------------

/// `pinataMetadata` マルチパートフィールド。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinataMetadata {
    /// Pinata上の表示名
    pub name: String,
}

/// `pinataOptions` マルチパートフィールド。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinataOptions {
    /// 返却するCIDのバージョン（0 = base58btc `Qm...`）
    pub cid_version: u8,
}

/// `POST /pinning/pinFileToIPFS` のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinFileResponse {
    /// ピン留めされたファイルのCID
    #[serde(rename = "IpfsHash")]
    pub ipfs_hash: Option<String>,
    /// ピンサイズ（バイト）
    #[serde(rename = "PinSize", default)]
    pub pin_size: Option<u64>,
    /// ピン留め日時（ISO 8601）
    #[serde(rename = "Timestamp", default)]
    pub timestamp: Option<String>,
    /// 既にピン留め済みのファイルだったか
    #[serde(rename = "isDuplicate", default)]
    pub is_duplicate: Option<bool>,
}

// ---------------------------------------------------------------------------
// algod API
// ---------------------------------------------------------------------------

/// `GET /v2/transactions/params` のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransactionParams {
    /// コンセンサスプロトコルのバージョン
    pub consensus_version: String,
    /// 1バイトあたりの手数料（microAlgos）
    pub fee: u64,
    /// Base64エンコードされたgenesis hash（32バイト）
    pub genesis_hash: String,
    /// ネットワークのgenesis ID（例: "testnet-v1.0"）
    pub genesis_id: String,
    /// 最新ラウンド
    pub last_round: u64,
    /// 最低手数料（microAlgos）
    pub min_fee: u64,
}

/// `POST /v2/transactions` のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostTransactionResponse {
    /// 受理されたトランザクションID
    #[serde(rename = "txId")]
    pub tx_id: String,
}

/// algodのエラーレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeErrorResponse {
    /// エラーメッセージ
    pub message: String,
}

// ---------------------------------------------------------------------------
// ミント結果
// ---------------------------------------------------------------------------

/// ノードに送信されたアセット作成トランザクション。
#[derive(Debug, Clone)]
pub struct MintedAsset {
    /// アセット名
    pub name: String,
    /// ユニット名
    pub unit_name: String,
    /// algodが返却したトランザクションID
    pub tx_id: String,
    /// 署名済みトランザクション（MessagePack）
    pub signed_txn: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc69_field_order() {
        let metadata = Arc69Metadata {
            standard: ARC69_STANDARD.to_string(),
            description: "desc".to_string(),
            external_url: "https://example.com".to_string(),
            mime_type: PNG_MIME_TYPE.to_string(),
            properties: serde_json::json!({"trait": "red"}),
        };
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(
            json,
            r#"{"standard":"arc69","description":"desc","external_url":"https://example.com","mime_type":"image/png","properties":{"trait":"red"}}"#
        );
    }

    #[test]
    fn test_transaction_params_kebab_case() {
        let body = r#"{
            "consensus-version": "https://github.com/algorandfoundation/specs/tree/925a46433742afb0b51bb939354bd907fa88bf95",
            "fee": 0,
            "genesis-hash": "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=",
            "genesis-id": "testnet-v1.0",
            "last-round": 40000000,
            "min-fee": 1000
        }"#;
        let params: TransactionParams = serde_json::from_str(body).unwrap();
        assert_eq!(params.genesis_id, "testnet-v1.0");
        assert_eq!(params.last_round, 40_000_000);
        assert_eq!(params.min_fee, 1000);
    }

    #[test]
    fn test_pin_response_without_hash() {
        let response: PinFileResponse = serde_json::from_str(r#"{"error":"bad"}"#).unwrap();
        assert!(response.ipfs_hash.is_none());
    }

    #[test]
    fn test_pinata_options_camel_case() {
        let json = serde_json::to_string(&PinataOptions { cid_version: 0 }).unwrap();
        assert_eq!(json, r#"{"cidVersion":0}"#);
    }
}
