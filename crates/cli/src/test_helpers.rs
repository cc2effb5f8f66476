//! # テスト用共通ヘルパー
//!
//! pinner, algod, minter, orchestratorテストで共有するモックサーバー群と
//! 入力ディレクトリ・設定の生成関数。

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use arcmint_core::cid::ContentId;
use arcmint_crypto::Account;
use arcmint_types::TransactionParams;
use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Json;

use crate::config::{CollectionConfig, Network, NodeEndpoint, PinningEndpoint, Secret};

/// TestNetのgenesis hash（Base64、32バイト）
pub const TEST_GENESIS_HASH: &str = "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=";

/// モックalgodが受け付けるAPIトークン
pub const TEST_ALGOD_TOKEN: &str = "test-algod-token";

/// テスト用の作成者アカウント
pub fn test_account() -> Account {
    Account::from_seed(&[7u8; 32])
}

/// モックalgodが返すトランザクションパラメータ
pub fn test_params() -> TransactionParams {
    TransactionParams {
        consensus_version: "https://github.com/algorandfoundation/specs/tree/test".to_string(),
        fee: 0,
        genesis_hash: TEST_GENESIS_HASH.to_string(),
        genesis_id: "testnet-v1.0".to_string(),
        last_round: 1000,
        min_fee: 1000,
    }
}

/// listenしていないポート番号を返す。
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn serve(app: axum::Router) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}

/// テスト中のログ出力を保持するバッファ。
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// これまでに出力されたログ
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// 現在のスレッドのログをバッファに記録する。ガードを破棄するまで有効。
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    (buffer, tracing::subscriber::set_default(subscriber))
}

// ---------------------------------------------------------------------------
// Pinata
// ---------------------------------------------------------------------------

/// モックPinataの応答パターン。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinataBehavior {
    /// 常に成功
    Succeed,
    /// 常に401
    Reject,
    /// 200だがIpfsHashを含まない
    OmitHash,
    /// 200だがCIDとして不正なIpfsHash
    InvalidHash,
    /// n回目（1始まり）のアップロードのみ500
    FailAt(usize),
}

/// モックPinataが受け取ったアップロード。
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    /// Authorizationヘッダ
    pub authorization: Option<String>,
    /// fileパートのファイル名
    pub file_name: Option<String>,
    /// マルチパート本文（UTF-8として不正なバイトは置換）
    pub body: String,
}

/// 起動済みのモックPinata。
pub struct MockPinata {
    /// listenポート
    pub port: u16,
    uploads: Arc<Mutex<Vec<RecordedUpload>>>,
}

impl MockPinata {
    /// 受信順のアップロード一覧
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    /// n回目（1始まり）のアップロードに返すCID
    pub fn cid_for(&self, n: usize) -> ContentId {
        mock_cid(n)
    }

    /// 接続先設定
    pub fn endpoint(&self) -> PinningEndpoint {
        PinningEndpoint {
            url: format!("http://127.0.0.1:{}", self.port),
            jwt: Secret::new("test-jwt"),
        }
    }
}

fn mock_cid(n: usize) -> ContentId {
    ContentId::v0_from_digest(arcmint_crypto::sha256(format!("image-{n}").as_bytes()))
}

fn multipart_file_name(body: &str) -> Option<String> {
    let start = body.find("filename=\"")? + "filename=\"".len();
    let end = body[start..].find('"')?;
    Some(body[start..start + end].to_string())
}

/// テスト用モックPinataを起動する。
pub async fn start_mock_pinata(behavior: PinataBehavior) -> MockPinata {
    let uploads: Arc<Mutex<Vec<RecordedUpload>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = uploads.clone();

    let app = axum::Router::new().route(
        "/pinning/pinFileToIPFS",
        post(move |headers: HeaderMap, body: Bytes| {
            let recorded = recorded.clone();
            async move {
                let body = String::from_utf8_lossy(&body).into_owned();
                let upload = RecordedUpload {
                    authorization: headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                    file_name: multipart_file_name(&body),
                    body,
                };
                let n = {
                    let mut uploads = recorded.lock().unwrap();
                    uploads.push(upload);
                    uploads.len()
                };

                match behavior {
                    PinataBehavior::Reject => (
                        StatusCode::UNAUTHORIZED,
                        Json(serde_json::json!({"error": "Invalid authentication"})),
                    ),
                    PinataBehavior::FailAt(fail) if fail == n => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(serde_json::json!({"error": "Internal error"})),
                    ),
                    PinataBehavior::OmitHash => (
                        StatusCode::OK,
                        Json(serde_json::json!({"error": "no hash"})),
                    ),
                    PinataBehavior::InvalidHash => (
                        StatusCode::OK,
                        Json(serde_json::json!({"IpfsHash": "not-a-cid"})),
                    ),
                    _ => (
                        StatusCode::OK,
                        Json(serde_json::json!({
                            "IpfsHash": mock_cid(n).to_string(),
                            "PinSize": 1024,
                            "Timestamp": "2024-01-01T00:00:00.000Z"
                        })),
                    ),
                }
            }
        }),
    );

    MockPinata {
        port: serve(app).await,
        uploads,
    }
}

// ---------------------------------------------------------------------------
// algod
// ---------------------------------------------------------------------------

/// モックalgodの応答パターン。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgodBehavior {
    /// 全て受理
    Accept,
    /// パラメータ取得を500で失敗させる
    ParamsUnavailable,
    /// n回目（1始まり）の送信のみ拒否
    RejectAt(usize),
}

/// モックalgodが受け取った送信。
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    /// Content-Typeヘッダ
    pub content_type: Option<String>,
    /// 署名済みトランザクション
    pub body: Vec<u8>,
}

/// 起動済みのモックalgod。
pub struct MockAlgod {
    /// listenポート
    pub port: u16,
    submissions: Arc<Mutex<Vec<RecordedSubmission>>>,
    params_calls: Arc<AtomicUsize>,
}

impl MockAlgod {
    /// 受信順の送信一覧
    pub fn submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions.lock().unwrap().clone()
    }

    /// パラメータ取得の呼び出し回数
    pub fn params_calls(&self) -> usize {
        self.params_calls.load(Ordering::SeqCst)
    }

    /// 接続先設定
    pub fn endpoint(&self) -> NodeEndpoint {
        NodeEndpoint {
            url: "http://127.0.0.1".to_string(),
            port: self.port,
            token: Secret::new(TEST_ALGOD_TOKEN),
        }
    }
}

/// n回目（1始まり）の送信に返すトランザクションID
pub fn mock_tx_id(n: usize) -> String {
    format!("MOCKTX{n}")
}

fn token_ok(headers: &HeaderMap) -> bool {
    headers
        .get("x-algo-api-token")
        .and_then(|v| v.to_str().ok())
        == Some(TEST_ALGOD_TOKEN)
}

fn unauthorized() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({"message": "Invalid API Token"})),
    )
        .into_response()
}

/// テスト用モックalgodを起動する。
pub async fn start_mock_algod(behavior: AlgodBehavior) -> MockAlgod {
    let submissions: Arc<Mutex<Vec<RecordedSubmission>>> = Arc::new(Mutex::new(Vec::new()));
    let params_calls = Arc::new(AtomicUsize::new(0));

    let calls = params_calls.clone();
    let recorded = submissions.clone();

    let app = axum::Router::new()
        .route(
            "/v2/transactions/params",
            get(move |headers: HeaderMap| {
                let calls = calls.clone();
                async move {
                    if !token_ok(&headers) {
                        return unauthorized();
                    }
                    calls.fetch_add(1, Ordering::SeqCst);
                    if behavior == AlgodBehavior::ParamsUnavailable {
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(serde_json::json!({"message": "node is catching up"})),
                        )
                            .into_response();
                    }
                    let params = test_params();
                    Json(serde_json::json!({
                        "consensus-version": params.consensus_version,
                        "fee": params.fee,
                        "genesis-hash": params.genesis_hash,
                        "genesis-id": params.genesis_id,
                        "last-round": params.last_round,
                        "min-fee": params.min_fee
                    }))
                    .into_response()
                }
            }),
        )
        .route(
            "/v2/transactions",
            post(move |headers: HeaderMap, body: Bytes| {
                let recorded = recorded.clone();
                async move {
                    if !token_ok(&headers) {
                        return unauthorized();
                    }
                    let n = {
                        let mut submissions = recorded.lock().unwrap();
                        submissions.push(RecordedSubmission {
                            content_type: headers
                                .get("content-type")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string),
                            body: body.to_vec(),
                        });
                        submissions.len()
                    };
                    if behavior == AlgodBehavior::RejectAt(n) {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(serde_json::json!({
                                "message": "TransactionPool.Remember: transaction rejected: overspend"
                            })),
                        )
                            .into_response();
                    }
                    Json(serde_json::json!({"txId": mock_tx_id(n)})).into_response()
                }
            }),
        );

    MockAlgod {
        port: serve(app).await,
        submissions,
        params_calls,
    }
}

// ---------------------------------------------------------------------------
// 入力と設定
// ---------------------------------------------------------------------------

/// `1.png` ～ `{count}.png` とメタデータJSONを書き出す。
/// 各エントリの属性は `{"color": colors[i]}`（不足分は `"gray"`）。
pub fn write_collection(dir: &Path, count: usize, colors: &[&str]) {
    let mut doc = serde_json::Map::new();
    for position in 1..=count {
        std::fs::write(
            dir.join(format!("{position}.png")),
            format!("\u{89}PNG image-{position}"),
        )
        .unwrap();
        let color = colors.get(position - 1).copied().unwrap_or("gray");
        doc.insert(
            position.to_string(),
            serde_json::json!({"properties": {"color": color}}),
        );
    }
    std::fs::write(
        dir.join("metadata.json"),
        serde_json::to_vec(&serde_json::Value::Object(doc)).unwrap(),
    )
    .unwrap();
}

/// モックサーバーに接続するテスト用設定を構築する。
pub fn test_config(
    input_dir: &Path,
    pinning: PinningEndpoint,
    node: NodeEndpoint,
    collection_size: usize,
    skip_first_n: usize,
) -> CollectionConfig {
    CollectionConfig {
        name: "Kitty".to_string(),
        unit_prefix: "KIT".to_string(),
        description: "Test kitties".to_string(),
        external_url: "https://example.com".to_string(),
        collection_size,
        skip_first_n,
        input_dir: input_dir.to_path_buf(),
        network: Network::TestNet,
        node,
        pinning,
        creator: test_account(),
    }
}
