//! # arcmint 暗号処理
//!
//! Algorandのアカウント操作に必要な暗号プリミティブを提供する。
//!
//! ## 暗号アルゴリズム
//! | 用途 | アルゴリズム |
//! |------|------------|
//! | 署名 | Ed25519 |
//! | アドレスチェックサム / トランザクションID | SHA-512/256 |
//! | ニーモニック | BIP-39英単語リスト（11ビット、リトルエンディアン） |
//! | アドレス表現 | Base32（パディングなし） |

pub mod mnemonic;

use std::fmt;
use std::str::FromStr;

use data_encoding::BASE32_NOPAD;
use ed25519_dalek::Signer;
use sha2::{Digest, Sha256, Sha512_256};

pub use ed25519_dalek::{
    Signature as Ed25519Signature, SigningKey as Ed25519SigningKey,
    VerifyingKey as Ed25519VerifyingKey,
};

/// 暗号処理のエラー型
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// ニーモニックが不正
    #[error("ニーモニックが不正です: {0}")]
    InvalidMnemonic(String),
    /// アドレスが不正
    #[error("アドレスが不正です: {0}")]
    InvalidAddress(String),
}

/// アドレス文字列に付与されるチェックサムのバイト長
const CHECKSUM_LEN: usize = 4;

/// SHA-512/256ハッシュ計算。
pub fn sha512_256(data: &[u8]) -> [u8; 32] {
    Sha512_256::digest(data).into()
}

/// SHA-256ハッシュ計算。
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

// ---------------------------------------------------------------------------
// アドレス
// ---------------------------------------------------------------------------

/// Algorandアドレス（Ed25519公開鍵、32バイト）。
///
/// 文字列表現は `Base32(pubkey || SHA-512/256(pubkey)[28..32])` の58文字。
/// トランザクション内ではチェックサムなしの生バイトとしてエンコードされる。
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// 全ビット0のアドレス
    pub const ZERO: Address = Address([0u8; 32]);

    /// 生バイトからアドレスを構築する。
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// 生バイトを返す。
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// 全ビット0か
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        let hash = sha512_256(&self.0);
        let mut checksum = [0u8; CHECKSUM_LEN];
        checksum.copy_from_slice(&hash[32 - CHECKSUM_LEN..]);
        checksum
    }

    /// チェックサム付きBase32文字列にエンコードする。
    pub fn encode(&self) -> String {
        let mut buf = Vec::with_capacity(32 + CHECKSUM_LEN);
        buf.extend_from_slice(&self.0);
        buf.extend_from_slice(&self.checksum());
        BASE32_NOPAD.encode(&buf)
    }
}

impl FromStr for Address {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = BASE32_NOPAD
            .decode(s.trim().as_bytes())
            .map_err(|e| CryptoError::InvalidAddress(format!("Base32デコードに失敗 ({s}): {e}")))?;
        if decoded.len() != 32 + CHECKSUM_LEN {
            return Err(CryptoError::InvalidAddress(format!(
                "デコード後の長さが{}バイトではありません: {}バイト",
                32 + CHECKSUM_LEN,
                decoded.len()
            )));
        }

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded[..32]);
        let address = Address(bytes);

        if decoded[32..] != address.checksum() {
            return Err(CryptoError::InvalidAddress(format!(
                "チェックサムが一致しません: {s}"
            )));
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

// ---------------------------------------------------------------------------
// アカウント
// ---------------------------------------------------------------------------

/// 署名鍵とアドレスの組。
pub struct Account {
    signing_key: Ed25519SigningKey,
    address: Address,
}

impl Account {
    /// 32バイトのシードからアカウントを導出する。
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = Ed25519SigningKey::from_bytes(seed);
        let address = Address(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            address,
        }
    }

    /// 25単語のニーモニックからアカウントを導出する。
    /// 同じニーモニックからは常に同じ鍵が導出される。
    pub fn from_mnemonic(phrase: &str) -> Result<Self, CryptoError> {
        let seed = mnemonic::mnemonic_to_seed(phrase)?;
        Ok(Self::from_seed(&seed))
    }

    /// アカウントのアドレス
    pub fn address(&self) -> Address {
        self.address
    }

    /// 検証用公開鍵
    pub fn verifying_key(&self) -> Ed25519VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// アカウントのニーモニック
    pub fn mnemonic(&self) -> String {
        mnemonic::seed_to_mnemonic(&self.signing_key.to_bytes())
    }

    /// メッセージにEd25519署名する。
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
