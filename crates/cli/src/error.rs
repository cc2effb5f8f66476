//! # arcmint エラー型
//!
//! 全コンポーネントで共通のエラー型。
//! いずれのエラーもリトライせず、実行全体を中断する。

use arcmint_core::CoreError;
use arcmint_crypto::CryptoError;

/// ミント処理のエラー型。
#[derive(Debug, thiserror::Error)]
pub enum MintError {
    /// 設定・入力の不備（ネットワーク呼び出し前に検出）
    #[error("設定が不正です: {0}")]
    Configuration(String),
    /// ピン留めサービスとの通信失敗、または不正なレスポンス
    #[error("IPFSへのピン留めに失敗: {0}")]
    Upload(String),
    /// algodとの通信失敗、またはトランザクションの拒否
    #[error("algodとの通信に失敗: {0}")]
    Network(String),
    /// トランザクションを構築できない入力
    #[error("アセットを構築できません: {0}")]
    Asset(String),
}

impl From<CoreError> for MintError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Configuration(msg) => MintError::Configuration(msg),
            CoreError::InvalidCid(msg) | CoreError::Asset(msg) | CoreError::Encoding(msg) => {
                MintError::Asset(msg)
            }
        }
    }
}

impl From<CryptoError> for MintError {
    fn from(e: CryptoError) -> Self {
        MintError::Configuration(e.to_string())
    }
}
