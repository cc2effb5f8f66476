//! # Algorandニーモニック
//!
//! 32バイトのシードと25単語のニーモニックを相互変換する。
//!
//! ## 形式
//! - 先頭24単語: シードを11ビット単位（リトルエンディアン）に分割した値
//! - 25単語目: `SHA-512/256(seed)` の先頭11ビット（チェックサム）
//!
//! 単語はBIP-39英単語リストのインデックスで表す。

use crate::{sha512_256, CryptoError};

/// ニーモニックの単語数
pub const MNEMONIC_WORDS: usize = 25;

/// 1単語が表すビット数
const BITS_PER_WORD: u32 = 11;

fn word_list() -> &'static [&'static str; 2048] {
    bip39::Language::English.word_list()
}

/// 8ビット列を11ビット列に詰め直す（リトルエンディアン）。
fn to_11_bit(bytes: &[u8]) -> Vec<u16> {
    let mut out = Vec::with_capacity(bytes.len() * 8 / BITS_PER_WORD as usize + 1);
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    for &b in bytes {
        acc |= (b as u32) << bits;
        bits += 8;
        if bits >= BITS_PER_WORD {
            out.push((acc & 0x7ff) as u16);
            acc >>= BITS_PER_WORD;
            bits -= BITS_PER_WORD;
        }
    }
    if bits > 0 {
        out.push((acc & 0x7ff) as u16);
    }
    out
}

/// 11ビット列を8ビット列に戻す（リトルエンディアン）。
fn from_11_bit(words: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(words.len() * BITS_PER_WORD as usize / 8 + 1);
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    for &w in words {
        acc |= (w as u32) << bits;
        bits += BITS_PER_WORD;
        while bits >= 8 {
            out.push((acc & 0xff) as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 {
        out.push((acc & 0xff) as u8);
    }
    out
}

fn checksum_word(seed: &[u8; 32]) -> u16 {
    to_11_bit(&sha512_256(seed))[0]
}

/// シードを25単語のニーモニックに変換する。
pub fn seed_to_mnemonic(seed: &[u8; 32]) -> String {
    let list = word_list();
    let mut words: Vec<&str> = to_11_bit(seed)
        .into_iter()
        .map(|i| list[i as usize])
        .collect();
    words.push(list[checksum_word(seed) as usize]);
    words.join(" ")
}

/// 25単語のニーモニックをシードに変換する。
///
/// 単語は空白区切り、大文字小文字を区別しない。
pub fn mnemonic_to_seed(phrase: &str) -> Result<[u8; 32], CryptoError> {
    let words: Vec<String> = phrase.split_whitespace().map(str::to_lowercase).collect();
    if words.len() != MNEMONIC_WORDS {
        return Err(CryptoError::InvalidMnemonic(format!(
            "単語数は{MNEMONIC_WORDS}である必要があります: {}単語",
            words.len()
        )));
    }

    let list = word_list();
    let indices = words
        .iter()
        .map(|w| {
            list.iter()
                .position(|candidate| candidate == w)
                .map(|i| i as u16)
                .ok_or_else(|| CryptoError::InvalidMnemonic(format!("未知の単語: {w}")))
        })
        .collect::<Result<Vec<u16>, CryptoError>>()?;

    let (data, checksum) = indices.split_at(MNEMONIC_WORDS - 1);
    let bytes = from_11_bit(data);
    // 24単語 = 264ビット。末尾の8ビットは0でなければならない
    if bytes.len() != 33 || bytes[32] != 0 {
        return Err(CryptoError::InvalidMnemonic(
            "シード部分のビット列が不正です".to_string(),
        ));
    }

    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes[..32]);

    if checksum_word(&seed) != checksum[0] {
        return Err(CryptoError::InvalidMnemonic(
            "チェックサムが一致しません".to_string(),
        ));
    }
    Ok(seed)
}
