//! # arcmint Core
//!
//! コレクションのミントに必要な、ネットワークに依存しない処理を実装する。
//!
//! ## 処理フロー
//! 1. 入力ディレクトリから画像とメタデータJSONを読み込む（[`input`]）
//! 2. アイテムごとにARC-69メタデータを組み立てる（[`arc69`]）
//! 3. ピン留めで得たCIDからreserveアドレスを導出する（[`cid`]）
//! 4. アセット作成トランザクションを構築・署名する（[`transaction`]）

pub mod arc69;
pub mod cid;
pub mod input;
pub mod transaction;

/// Coreモジュールのエラー型
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// 入力ディレクトリ・メタデータの不備
    #[error("入力が不正です: {0}")]
    Configuration(String),
    /// CIDのパースに失敗
    #[error("CIDが不正です: {0}")]
    InvalidCid(String),
    /// トランザクションの構築に使えない値
    #[error("アセットを構築できません: {0}")]
    Asset(String),
    /// MessagePackエンコードに失敗
    #[error("トランザクションのエンコードに失敗しました: {0}")]
    Encoding(String),
}
