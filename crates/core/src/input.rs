//! # 入力ローダー
//!
//! 連番の画像ファイル（`{index}.png`）と1つのメタデータJSONを含む
//! ディレクトリを読み込み、ミント順に並んだ [`InputItem`] の列を生成する。
//!
//! ## 対応関係
//! - 並び順: ファイル名の整数値による数値順（`2.png` は `10.png` より前）
//! - 名前・ユニット名: ファイル名のインデックスを使用
//! - メタデータ: ソート後の1始まりの位置をキーとして参照

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use arcmint_types::{InputItem, MetadataEntry};

use crate::arc69::{format_arc69, Arc69Template};
use crate::CoreError;

/// 画像ファイルの拡張子
pub const IMAGE_EXTENSION: &str = "png";

/// メタデータドキュメントの拡張子
pub const METADATA_EXTENSION: &str = "json";

/// 入力アイテムの命名規則とARC-69固定値。
#[derive(Debug, Clone)]
pub struct InputTemplate {
    /// コレクション名（表示名 `"{name} #{index}"` に使用）
    pub name: String,
    /// ユニット名プレフィックス（`"{unit_prefix}{index}"`）
    pub unit_prefix: String,
    /// ARC-69固定値
    pub arc69: Arc69Template,
}

/// 画像ファイル名からインデックスを取り出す。
///
/// ファイル名の拡張子を除いた部分が、先頭0のない正の整数でなければならない。
/// それ以外は並び順が定まらないためエラーとする。
pub fn parse_image_index(file_name: &str) -> Result<u64, CoreError> {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let invalid = || {
        CoreError::Configuration(format!(
            "画像ファイル名は正の整数である必要があります: {file_name}"
        ))
    };

    if stem.is_empty() || stem.starts_with('0') || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    stem.parse::<u64>().map_err(|_| invalid())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// 入力ディレクトリを読み込み、数値順に並んだアイテム列を返す。
///
/// メタデータJSONが存在しない・複数ある・パースできない場合、
/// またはいずれかの位置に対応するエントリがない場合は
/// [`CoreError::Configuration`] を返す。
pub fn load_input(dir: &Path, template: &InputTemplate) -> Result<Vec<InputItem>, CoreError> {
    let dir = dir.canonicalize().map_err(|e| {
        CoreError::Configuration(format!(
            "入力ディレクトリを開けません ({}): {e}",
            dir.display()
        ))
    })?;

    let entries = std::fs::read_dir(&dir).map_err(|e| {
        CoreError::Configuration(format!(
            "入力ディレクトリの読み込みに失敗 ({}): {e}",
            dir.display()
        ))
    })?;

    let mut images: Vec<(u64, PathBuf)> = Vec::new();
    let mut metadata_files: Vec<PathBuf> = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| {
            CoreError::Configuration(format!("ディレクトリエントリの読み込みに失敗: {e}"))
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        if has_extension(&path, IMAGE_EXTENSION) {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            images.push((parse_image_index(&file_name)?, path));
        } else if has_extension(&path, METADATA_EXTENSION) {
            metadata_files.push(path);
        }
    }

    let metadata_path = match metadata_files.as_slice() {
        [single] => single,
        [] => {
            return Err(CoreError::Configuration(format!(
                "メタデータJSONが見つかりません: {}",
                dir.display()
            )))
        }
        many => {
            return Err(CoreError::Configuration(format!(
                "メタデータJSONは1つである必要があります: {}個",
                many.len()
            )))
        }
    };

    let contents = std::fs::read_to_string(metadata_path).map_err(|e| {
        CoreError::Configuration(format!(
            "メタデータJSONの読み込みに失敗 ({}): {e}",
            metadata_path.display()
        ))
    })?;
    let document: HashMap<String, MetadataEntry> = serde_json::from_str(&contents)
        .map_err(|e| {
            CoreError::Configuration(format!(
                "メタデータJSONのパースに失敗 ({}): {e}",
                metadata_path.display()
            ))
        })?;

    images.sort_by_key(|(index, _)| *index);

    images
        .into_iter()
        .enumerate()
        .map(|(i, (file_index, image))| {
            let position = i + 1;
            let entry = document.get(&position.to_string()).ok_or_else(|| {
                CoreError::Configuration(format!(
                    "メタデータJSONに位置 {position} のエントリがありません"
                ))
            })?;

            Ok(InputItem {
                position,
                file_index,
                name: format!("{} #{file_index}", template.name),
                unit_name: format!("{}{file_index}", template.unit_prefix),
                image,
                metadata: format_arc69(&template.arc69, entry),
            })
        })
        .collect()
}
