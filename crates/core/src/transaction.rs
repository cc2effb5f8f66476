//! # アセット作成トランザクション
//!
//! Algorandのアセット作成（`acfg`）トランザクションを構築し、
//! 正規化MessagePackにエンコードして署名する。
//!
//! ## 正規化エンコーディング
//! - マップのキーは辞書順（構造体フィールドを辞書順に宣言する）
//! - ゼロ値（0, false, 空文字列, 空バイト列, 未設定アドレス）は省略
//! - バイト列はbin形式
//!
//! ## 署名
//! `Ed25519(b"TX" || msgpack(txn))`。トランザクションIDは
//! `Base32(SHA-512/256(b"TX" || msgpack(txn)))`。

use arcmint_crypto::{sha512_256, Account, Address};
use arcmint_types::TransactionParams;
use base64::Engine;
use data_encoding::BASE32_NOPAD;
use serde::Serialize;

use crate::CoreError;

/// ARC-19のアセットURLテンプレート。
/// エクスプローラーはreserveアドレスをCIDv0（dag-pb, sha2-256）として解決する。
pub const ARC19_TEMPLATE_URL: &str = "template-ipfs://{ipfscid:0:dag-pb:reserve:sha2-256}";

/// 署名対象のドメイン分離プレフィックス
pub const TX_PREFIX: &[u8] = b"TX";

/// 有効ラウンド幅（first valid からの差分）
pub const VALIDITY_WINDOW: u64 = 1000;

/// 署名・エンベロープ追加分の推定バイト数
const SIGNATURE_OVERHEAD: u64 = 75;

/// アセット名の最大バイト長
pub const MAX_ASSET_NAME_LEN: usize = 32;
/// ユニット名の最大バイト長
pub const MAX_UNIT_NAME_LEN: usize = 8;
/// アセットURLの最大バイト長
pub const MAX_URL_LEN: usize = 96;
/// noteフィールドの最大バイト長
pub const MAX_NOTE_LEN: usize = 1024;

fn is_zero(v: &u64) -> bool {
    *v == 0
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// アセットパラメータ（`apar`）。フィールドはキーの辞書順。
#[derive(Debug, Clone, Serialize)]
pub struct AssetParams {
    /// アセット名
    #[serde(rename = "an", skip_serializing_if = "String::is_empty")]
    pub asset_name: String,
    /// アセットURL
    #[serde(rename = "au", skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// clawbackアドレス
    #[serde(rename = "c", skip_serializing_if = "Option::is_none")]
    pub clawback: Option<Address>,
    /// 小数点以下桁数
    #[serde(rename = "dc", skip_serializing_if = "is_zero_u32")]
    pub decimals: u32,
    /// デフォルトで凍結するか
    #[serde(rename = "df", skip_serializing_if = "is_false")]
    pub default_frozen: bool,
    /// freezeアドレス
    #[serde(rename = "f", skip_serializing_if = "Option::is_none")]
    pub freeze: Option<Address>,
    /// managerアドレス
    #[serde(rename = "m", skip_serializing_if = "Option::is_none")]
    pub manager: Option<Address>,
    /// reserveアドレス（ARC-19ではCIDのダイジェスト）
    #[serde(rename = "r", skip_serializing_if = "Option::is_none")]
    pub reserve: Option<Address>,
    /// 総発行量
    #[serde(rename = "t", skip_serializing_if = "is_zero")]
    pub total: u64,
    /// ユニット名
    #[serde(rename = "un", skip_serializing_if = "String::is_empty")]
    pub unit_name: String,
}

/// アセット作成トランザクション。フィールドはキーの辞書順。
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    /// アセットパラメータ
    #[serde(rename = "apar")]
    pub asset_params: AssetParams,
    /// 手数料（microAlgos）
    #[serde(rename = "fee", skip_serializing_if = "is_zero")]
    pub fee: u64,
    /// 有効期間の開始ラウンド
    #[serde(rename = "fv", skip_serializing_if = "is_zero")]
    pub first_valid: u64,
    /// genesis ID
    #[serde(rename = "gen", skip_serializing_if = "String::is_empty")]
    pub genesis_id: String,
    /// genesis hash（32バイト）
    #[serde(rename = "gh", with = "serde_bytes")]
    pub genesis_hash: Vec<u8>,
    /// 有効期間の終了ラウンド
    #[serde(rename = "lv", skip_serializing_if = "is_zero")]
    pub last_valid: u64,
    /// 任意データ（ARC-69 JSON）
    #[serde(rename = "note", with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<u8>,
    /// 送信者
    #[serde(rename = "snd")]
    pub sender: Address,
    /// トランザクション種別（"acfg"）
    #[serde(rename = "type")]
    pub txn_type: String,
}

/// 署名済みトランザクション。
#[derive(Serialize)]
struct SignedTransaction<'a> {
    #[serde(rename = "sig", with = "serde_bytes")]
    sig: &'a [u8],
    #[serde(rename = "txn")]
    txn: &'a Transaction,
}

/// 1点物のアセット作成に必要な入力。
#[derive(Debug, Clone)]
pub struct AssetCreate<'a> {
    /// 作成者（送信者・manager）
    pub creator: Address,
    /// アセット名
    pub asset_name: &'a str,
    /// ユニット名
    pub unit_name: &'a str,
    /// reserveアドレス
    pub reserve: Address,
    /// noteに格納するバイト列（Noneの場合は省略）
    pub note: Option<Vec<u8>>,
}

fn check_len(field: &str, value: &[u8], max: usize) -> Result<(), CoreError> {
    if value.len() > max {
        return Err(CoreError::Asset(format!(
            "{field}が長すぎます: {}バイト (上限: {max}バイト)",
            value.len()
        )));
    }
    Ok(())
}

impl Transaction {
    /// 正規化MessagePackにエンコードする。
    pub fn encode(&self) -> Result<Vec<u8>, CoreError> {
        rmp_serde::to_vec_named(self).map_err(|e| CoreError::Encoding(e.to_string()))
    }

    /// 署名対象のバイト列（`b"TX" || msgpack(txn)`）
    pub fn bytes_to_sign(&self) -> Result<Vec<u8>, CoreError> {
        let encoded = self.encode()?;
        let mut buf = Vec::with_capacity(TX_PREFIX.len() + encoded.len());
        buf.extend_from_slice(TX_PREFIX);
        buf.extend_from_slice(&encoded);
        Ok(buf)
    }

    /// トランザクションID（52文字のBase32）
    pub fn id(&self) -> Result<String, CoreError> {
        Ok(BASE32_NOPAD.encode(&sha512_256(&self.bytes_to_sign()?)))
    }

    /// アカウントで署名し、送信可能な署名済みトランザクションを返す。
    pub fn sign(&self, account: &Account) -> Result<Vec<u8>, CoreError> {
        if account.address() != self.sender {
            return Err(CoreError::Asset(format!(
                "署名者 {} がトランザクションの送信者 {} と一致しません",
                account.address(),
                self.sender
            )));
        }
        let sig = account.sign(&self.bytes_to_sign()?);
        let signed = SignedTransaction {
            sig: &sig,
            txn: self,
        };
        rmp_serde::to_vec_named(&signed).map_err(|e| CoreError::Encoding(e.to_string()))
    }

    /// 署名後のサイズ見積もり（バイト）
    pub fn estimate_size(&self) -> Result<u64, CoreError> {
        Ok(self.encode()?.len() as u64 + SIGNATURE_OVERHEAD)
    }
}

/// 1点物（総量1、小数0、非凍結）のアセット作成トランザクションを構築する。
///
/// manager・senderは作成者、URLはARC-19テンプレート固定。
/// 手数料は `max(fee × 署名後サイズ, min_fee)`。
pub fn build_asset_create(
    request: &AssetCreate<'_>,
    params: &TransactionParams,
) -> Result<Transaction, CoreError> {
    check_len("アセット名", request.asset_name.as_bytes(), MAX_ASSET_NAME_LEN)?;
    check_len("ユニット名", request.unit_name.as_bytes(), MAX_UNIT_NAME_LEN)?;
    check_len("アセットURL", ARC19_TEMPLATE_URL.as_bytes(), MAX_URL_LEN)?;
    let note = request.note.clone().unwrap_or_default();
    check_len("note", &note, MAX_NOTE_LEN)?;

    if request.reserve.is_zero() {
        return Err(CoreError::Asset("reserveアドレスが未設定です".to_string()));
    }

    let genesis_hash = base64::engine::general_purpose::STANDARD
        .decode(&params.genesis_hash)
        .map_err(|e| CoreError::Asset(format!("genesis hashのBase64デコードに失敗: {e}")))?;
    if genesis_hash.len() != 32 {
        return Err(CoreError::Asset(format!(
            "genesis hashは32バイトである必要があります: {}バイト",
            genesis_hash.len()
        )));
    }

    let mut txn = Transaction {
        asset_params: AssetParams {
            asset_name: request.asset_name.to_string(),
            url: ARC19_TEMPLATE_URL.to_string(),
            clawback: None,
            decimals: 0,
            default_frozen: false,
            freeze: None,
            manager: Some(request.creator),
            reserve: Some(request.reserve),
            total: 1,
            unit_name: request.unit_name.to_string(),
        },
        fee: 0,
        first_valid: params.last_round,
        genesis_id: params.genesis_id.clone(),
        genesis_hash,
        last_valid: params.last_round + VALIDITY_WINDOW,
        note,
        sender: request.creator,
        txn_type: "acfg".to_string(),
    };

    // 手数料自体もエンコード長に含まれるため、値が変わらなくなるまで再計算する
    loop {
        let fee = params
            .fee
            .saturating_mul(txn.estimate_size()?)
            .max(params.min_fee);
        if fee <= txn.fee {
            break;
        }
        txn.fee = fee;
    }
    Ok(txn)
}
