//! # コレクションオーケストレーター
//!
//! 入力の読み込みから全アイテムのミントまでを順に実行する。
//!
//! ## フロー
//! 1. 入力ディレクトリを読み込み、アイテム数が `COLLECTION_SIZE` と一致するか検証
//! 2. 全アイテムの画像パス・ARC-69・属性を検証（ネットワーク呼び出し前）
//! 3. 先頭 `SKIP_FIRST_N` 件を除外
//! 4. 1件ずつ ピン留め → ミント を実行（並行実行しない）
//!
//! いずれかのアイテムで失敗した場合はその時点で中断し、
//! 再開に使う `SKIP_FIRST_N` の値をログに出力する。

use arcmint_core::arc69::has_properties;
use arcmint_core::input::load_input;
use arcmint_types::{InputItem, MintedAsset};

use crate::algod::{AlgodApi, AlgodClient};
use crate::config::CollectionConfig;
use crate::error::MintError;
use crate::minter::Minter;
use crate::pinner::{ContentPinner, PinataPinner};

/// ピン留めサービスとノードを保持するオーケストレーター。
pub struct Orchestrator {
    pinner: Box<dyn ContentPinner>,
    node: Box<dyn AlgodApi>,
}

/// ミント前に全アイテムを検証する。最初の違反で失敗する。
pub fn validate_items(items: &[InputItem]) -> Result<(), MintError> {
    for item in items {
        if item.image.as_os_str().is_empty() || !item.image.is_file() {
            return Err(MintError::Configuration(format!(
                "位置 {} の画像ファイルがありません: {}",
                item.position,
                item.image.display()
            )));
        }
        if item.metadata.standard.is_empty() {
            return Err(MintError::Configuration(format!(
                "位置 {} のARC-69メタデータがありません",
                item.position
            )));
        }
        if !has_properties(&item.metadata) {
            return Err(MintError::Configuration(format!(
                "位置 {} ({}) の属性が空です",
                item.position, item.name
            )));
        }
    }
    Ok(())
}

impl Orchestrator {
    pub fn new(pinner: Box<dyn ContentPinner>, node: Box<dyn AlgodApi>) -> Self {
        Self { pinner, node }
    }

    /// 設定の接続先からPinataとalgodのクライアントを構築する。
    pub fn from_config(config: &CollectionConfig) -> Self {
        Self::new(
            Box::new(PinataPinner::new(&config.pinning)),
            Box::new(AlgodClient::new(&config.node)),
        )
    }

    /// コレクション全体をミントし、送信したアセットを処理順に返す。
    pub async fn run(&self, config: &CollectionConfig) -> Result<Vec<MintedAsset>, MintError> {
        let items = load_input(&config.input_dir, &config.input_template())?;
        if items.len() != config.collection_size {
            return Err(MintError::Configuration(format!(
                "アイテム数がCOLLECTION_SIZEと一致しません: 入力 {}件, 期待 {}件",
                items.len(),
                config.collection_size
            )));
        }
        validate_items(&items)?;

        if config.skip_first_n > items.len() {
            return Err(MintError::Configuration(format!(
                "SKIP_FIRST_N ({}) がアイテム数 ({}) を超えています",
                config.skip_first_n,
                items.len()
            )));
        }
        let pending = &items[config.skip_first_n..];

        tracing::info!(
            total = items.len(),
            skip = config.skip_first_n,
            pending = pending.len(),
            network = %config.network,
            creator = %config.creator.address(),
            "⏳ ミントを開始します"
        );

        let minter = Minter::new(self.node.as_ref(), &config.creator);
        let mut minted = Vec::with_capacity(pending.len());

        for item in pending {
            match self.process_item(&minter, item).await {
                Ok(asset) => minted.push(asset),
                Err(e) => {
                    tracing::error!(
                        position = item.position,
                        name = %item.name,
                        error = %e,
                        resume_skip_first_n = config.skip_first_n + minted.len(),
                        "❌ ミントを中断しました"
                    );
                    return Err(e);
                }
            }
        }

        tracing::info!(minted = minted.len(), "🎉 全アイテムのミントが完了しました");
        Ok(minted)
    }

    async fn process_item(
        &self,
        minter: &Minter<'_>,
        item: &InputItem,
    ) -> Result<MintedAsset, MintError> {
        tracing::info!(
            position = item.position,
            name = %item.name,
            image = %item.image.display(),
            "処理中"
        );
        let cid = self.pinner.pin(&item.image, &item.name).await?;
        minter
            .mint(Some(&item.metadata), &item.name, &item.unit_name, &cid)
            .await
    }
}
