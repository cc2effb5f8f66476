//! # コンテンツピン留め
//!
//! 画像ファイルをIPFSピン留めサービスにアップロードし、CIDを取得する。
//!
//! ## Pinata `POST /pinning/pinFileToIPFS`
//! マルチパートの各パート:
//! - `file`: 画像ファイル（ディスクからストリーム送信）
//! - `pinataMetadata`: `{"name": "<表示名>"}`
//! - `pinataOptions`: `{"cidVersion": 0}`

use std::path::Path;

use arcmint_core::cid::ContentId;
use arcmint_types::{PinFileResponse, PinataMetadata, PinataOptions, PNG_MIME_TYPE};
use reqwest::multipart::{Form, Part};

use crate::config::{PinningEndpoint, Secret};
use crate::error::MintError;

/// ピン留めAPIのパス
const PIN_FILE_PATH: &str = "/pinning/pinFileToIPFS";

/// CIDv0を要求する（reserveアドレスのテンプレートと対応）
const CID_VERSION: u8 = 0;

/// ピン留めサービスの抽象インターフェース。
#[async_trait::async_trait]
pub trait ContentPinner: Send + Sync {
    /// ファイルをピン留めしてCIDを返す。
    ///
    /// 失敗した場合は [`MintError::Upload`] を返し、CIDを返さない。
    async fn pin(&self, path: &Path, name: &str) -> Result<ContentId, MintError>;
}

/// Pinataによるピン留め実装。
pub struct PinataPinner {
    /// HTTPクライアント（実行中は使い回す）
    http_client: reqwest::Client,
    /// APIのベースURL
    endpoint: String,
    /// Bearer認証用JWT
    jwt: Secret,
}

impl PinataPinner {
    /// 接続先設定からPinataPinnerを構築する。
    pub fn new(endpoint: &PinningEndpoint) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint: endpoint.url.trim_end_matches('/').to_string(),
            jwt: endpoint.jwt.clone(),
        }
    }

    async fn build_form(path: &Path, name: &str) -> Result<Form, MintError> {
        let file = tokio::fs::File::open(path).await.map_err(|e| {
            MintError::Upload(format!("ファイルを開けません ({}): {e}", path.display()))
        })?;
        let len = file
            .metadata()
            .await
            .map_err(|e| {
                MintError::Upload(format!("ファイル情報の取得に失敗 ({}): {e}", path.display()))
            })?
            .len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let file_part = Part::stream_with_length(reqwest::Body::from(file), len)
            .file_name(file_name)
            .mime_str(PNG_MIME_TYPE)
            .map_err(|e| MintError::Upload(format!("MIMEタイプの設定に失敗: {e}")))?;

        let metadata = serde_json::to_string(&PinataMetadata {
            name: name.to_string(),
        })
        .map_err(|e| MintError::Upload(format!("pinataMetadataのシリアライズに失敗: {e}")))?;
        let options = serde_json::to_string(&PinataOptions {
            cid_version: CID_VERSION,
        })
        .map_err(|e| MintError::Upload(format!("pinataOptionsのシリアライズに失敗: {e}")))?;

        Ok(Form::new()
            .part("file", file_part)
            .text("pinataMetadata", metadata)
            .text("pinataOptions", options))
    }
}

#[async_trait::async_trait]
impl ContentPinner for PinataPinner {
    async fn pin(&self, path: &Path, name: &str) -> Result<ContentId, MintError> {
        if path.as_os_str().is_empty() {
            return Err(MintError::Upload("ファイルパスが指定されていません".to_string()));
        }
        if self.jwt.is_empty() {
            return Err(MintError::Upload("Pinata APIキーが指定されていません".to_string()));
        }

        let form = Self::build_form(path, name).await?;
        let url = format!("{}{PIN_FILE_PATH}", self.endpoint);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.jwt.expose())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(name = %name, error = %e, "Pinataへの送信に失敗");
                MintError::Upload(format!("HTTP送信失敗: {e}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MintError::Upload(format!("レスポンス読み取り失敗: {e}")))?;

        if !status.is_success() {
            tracing::error!(name = %name, %status, body = %body, "Pinataがエラーを返しました");
            return Err(MintError::Upload(format!(
                "Pinataがエラーを返しました: HTTP {status} - {body}"
            )));
        }

        let parsed: PinFileResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(name = %name, body = %body, "Pinataのレスポンスをパースできません");
            MintError::Upload(format!("レスポンスのパースに失敗: {e}"))
        })?;

        let ipfs_hash = parsed
            .ipfs_hash
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                tracing::error!(name = %name, body = %body, "レスポンスにIpfsHashがありません");
                MintError::Upload(format!("IPFSへのピン留めに失敗 ({name}): {body}"))
            })?;

        let cid = ipfs_hash
            .parse::<ContentId>()
            .map_err(|e| {
                tracing::error!(name = %name, body = %body, "Pinataが返したCIDが不正です");
                MintError::Upload(format!("Pinataが返したCIDが不正です: {e}"))
            })?;

        tracing::info!(
            name = %name,
            cid = %cid,
            duplicate = parsed.is_duplicate.unwrap_or(false),
            "📌 ピン留め完了"
        );
        Ok(cid)
    }
}
