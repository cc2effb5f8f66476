//! # アセットミント
//!
//! ピン留め済みの画像1枚につき、1点物のアセット作成トランザクションを
//! 構築・署名・送信する。
//!
//! ## フロー
//! 1. CIDのSHA-256ダイジェストをreserveアドレスに変換（ARC-19）
//! 2. algodから推奨パラメータを取得
//! 3. ARC-69ドキュメントをnoteに設定してトランザクションを構築
//! 4. 作成者の鍵で署名
//! 5. algodへ送信し、トランザクションIDを記録

use arcmint_core::cid::ContentId;
use arcmint_core::transaction::{build_asset_create, AssetCreate};
use arcmint_crypto::Account;
use arcmint_types::{Arc69Metadata, MintedAsset};

use crate::algod::AlgodApi;
use crate::error::MintError;

/// 作成者アカウントとノードを束ねたミンター。
pub struct Minter<'a> {
    node: &'a dyn AlgodApi,
    creator: &'a Account,
}

impl<'a> Minter<'a> {
    pub fn new(node: &'a dyn AlgodApi, creator: &'a Account) -> Self {
        Self { node, creator }
    }

    /// アセットを1つミントする。
    ///
    /// `attestation` が `None` の場合、noteは空になる。
    pub async fn mint(
        &self,
        attestation: Option<&Arc69Metadata>,
        name: &str,
        unit_name: &str,
        cid: &ContentId,
    ) -> Result<MintedAsset, MintError> {
        let reserve = cid.reserve_address()?;
        tracing::debug!(
            name = %name,
            cid = %cid,
            reserve = %hex::encode(reserve.as_bytes()),
            "reserveアドレスを導出"
        );

        let params = self.node.transaction_params().await?;

        let note = attestation
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| MintError::Asset(format!("ARC-69のシリアライズに失敗: {e}")))?;

        let txn = build_asset_create(
            &AssetCreate {
                creator: self.creator.address(),
                asset_name: name,
                unit_name,
                reserve,
                note,
            },
            &params,
        )?;
        let local_id = txn.id()?;
        let signed_txn = txn.sign(self.creator)?;

        let tx_id = self.node.send_raw_transaction(&signed_txn).await?;
        if tx_id != local_id {
            tracing::warn!(
                name = %name,
                node_tx_id = %tx_id,
                local_tx_id = %local_id,
                "ノードが返したトランザクションIDがローカル計算値と異なります"
            );
        }

        tracing::info!(
            name = %name,
            unit_name = %unit_name,
            tx_id = %tx_id,
            fee = txn.fee,
            "✅ アセット作成トランザクションを送信"
        );

        Ok(MintedAsset {
            name: name.to_string(),
            unit_name: unit_name.to_string(),
            tx_id,
            signed_txn,
        })
    }
}
