//! # コンテンツ識別子（CID）
//!
//! ピン留めサービスが返すCIDをパースし、埋め込まれたSHA-256ダイジェストを
//! 取り出す。ダイジェストはアセット作成トランザクションのreserveアドレスとして
//! 使用される（ARC-19）。
//!
//! ## 対応形式
//! - CIDv0: Base58btc（`Qm...`）。暗黙的に dag-pb / sha2-256
//! - CIDv1: multibase `b` プレフィックスのBase32小文字
//!   `varint(version) || varint(codec) || multihash`

use std::fmt;
use std::str::FromStr;

use arcmint_crypto::Address;
use base58::{FromBase58, ToBase58};
use data_encoding::BASE32_NOPAD;

use crate::CoreError;

/// multihashのsha2-256コード
pub const MULTIHASH_SHA2_256: u64 = 0x12;

/// dag-pbコーデック
pub const CODEC_DAG_PB: u64 = 0x70;

/// SHA-256ダイジェストのバイト長
const DIGEST_LEN: usize = 32;

/// パース済みのCID。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentId {
    text: String,
    version: u64,
    codec: u64,
    digest: [u8; DIGEST_LEN],
}

impl ContentId {
    /// SHA-256ダイジェストからCIDv0を構築する。
    pub fn v0_from_digest(digest: [u8; DIGEST_LEN]) -> Self {
        let mut multihash = vec![MULTIHASH_SHA2_256 as u8, DIGEST_LEN as u8];
        multihash.extend_from_slice(&digest);
        Self {
            text: multihash.to_base58(),
            version: 0,
            codec: CODEC_DAG_PB,
            digest,
        }
    }

    /// CIDのバージョン（0 or 1）
    pub fn version(&self) -> u64 {
        self.version
    }

    /// コンテンツのコーデック
    pub fn codec(&self) -> u64 {
        self.codec
    }

    /// multihashに含まれるSHA-256ダイジェスト
    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }

    /// 文字列表現
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// ダイジェストをreserveアドレスに変換する。
    ///
    /// アセットURLのテンプレートが dag-pb を前提とするため、
    /// それ以外のコーデックのCIDは [`CoreError::Asset`] とする。
    pub fn reserve_address(&self) -> Result<Address, CoreError> {
        if self.codec != CODEC_DAG_PB {
            return Err(CoreError::Asset(format!(
                "reserveに埋め込めないコーデックです: 0x{:x} ({})",
                self.codec, self.text
            )));
        }
        Ok(Address::new(self.digest))
    }
}

/// unsigned varint（LEB128）を1つ読み取る。
fn read_varint(bytes: &[u8]) -> Result<(u64, &[u8]), CoreError> {
    let mut value: u64 = 0;
    for (i, &b) in bytes.iter().enumerate().take(9) {
        value |= ((b & 0x7f) as u64) << (7 * i);
        if b & 0x80 == 0 {
            return Ok((value, &bytes[i + 1..]));
        }
    }
    Err(CoreError::InvalidCid("varintが途中で終わっています".to_string()))
}

/// multihashを検証し、SHA-256ダイジェストを取り出す。
fn parse_multihash(bytes: &[u8]) -> Result<[u8; DIGEST_LEN], CoreError> {
    let (code, rest) = read_varint(bytes)?;
    let (len, digest) = read_varint(rest)?;
    if code != MULTIHASH_SHA2_256 {
        return Err(CoreError::InvalidCid(format!(
            "未対応のハッシュ関数です: 0x{code:x}"
        )));
    }
    if len as usize != DIGEST_LEN || digest.len() != DIGEST_LEN {
        return Err(CoreError::InvalidCid(format!(
            "ダイジェスト長が不正です: 宣言 {len}, 実際 {}",
            digest.len()
        )));
    }
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(digest);
    Ok(out)
}

impl FromStr for ContentId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();

        if text.len() == 46 && text.starts_with("Qm") {
            let bytes = text
                .from_base58()
                .map_err(|e| CoreError::InvalidCid(format!("Base58デコードに失敗 ({text}): {e:?}")))?;
            return Ok(Self {
                text: text.to_string(),
                version: 0,
                codec: CODEC_DAG_PB,
                digest: parse_multihash(&bytes)?,
            });
        }

        if let Some(encoded) = text.strip_prefix('b') {
            let bytes = BASE32_NOPAD
                .decode(encoded.to_ascii_uppercase().as_bytes())
                .map_err(|e| CoreError::InvalidCid(format!("Base32デコードに失敗 ({text}): {e}")))?;
            let (version, rest) = read_varint(&bytes)?;
            if version != 1 {
                return Err(CoreError::InvalidCid(format!(
                    "未対応のCIDバージョンです: {version}"
                )));
            }
            let (codec, multihash) = read_varint(rest)?;
            return Ok(Self {
                text: text.to_string(),
                version,
                codec,
                digest: parse_multihash(multihash)?,
            });
        }

        Err(CoreError::InvalidCid(format!("認識できないCID形式です: {text}")))
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
