//! # arcmint
//!
//! 連番PNG画像とメタデータJSONからNFTコレクションを一括ミントするCLI。
//!
//! ## 処理内容
//! - 画像をPinataでIPFSにピン留め（CIDv0）
//! - CIDのダイジェストをreserveアドレスに埋め込んだARC-19アセットを作成
//! - ARC-69メタデータをnoteに格納
//! - 作成者の25単語ニーモニックで署名し、algodへ送信
//!
//! 設定は環境変数（`.env` 対応）またはコマンドライン引数で与える。

mod algod;
mod config;
mod error;
mod minter;
mod orchestrator;
mod pinner;
#[cfg(test)]
mod test_helpers;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{Args, CollectionConfig};
use crate::orchestrator::Orchestrator;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // .envが無くてもエラーにしない
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = CollectionConfig::from_args(Args::parse())?;
    tracing::info!(
        name = %config.name,
        network = %config.network,
        node = %format!("{}:{}", config.node.url, config.node.port),
        input_dir = %config.input_dir.display(),
        "設定を読み込みました"
    );

    let minted = Orchestrator::from_config(&config).run(&config).await?;
    for asset in &minted {
        tracing::info!(name = %asset.name, tx_id = %asset.tx_id, "ミント済み");
    }
    tracing::info!(count = minted.len(), "完了");
    Ok(())
}
