//! # ARC-69 メタデータ整形
//!
//! コレクション共通の固定値とアイテムごとの属性をマージして
//! ARC-69ドキュメントを生成する。

use arcmint_types::{Arc69Metadata, MetadataEntry, ARC69_STANDARD, PNG_MIME_TYPE};

/// コレクション共通のARC-69固定値。
#[derive(Debug, Clone)]
pub struct Arc69Template {
    /// 説明文
    pub description: String,
    /// 外部URL
    pub external_url: String,
}

/// メタデータJSONの1エントリをARC-69ドキュメントに整形する。
///
/// `properties` が存在しないエントリは `null` のまま保持し、
/// 判定は呼び出し側（[`has_properties`]）に委ねる。
pub fn format_arc69(template: &Arc69Template, entry: &MetadataEntry) -> Arc69Metadata {
    Arc69Metadata {
        standard: ARC69_STANDARD.to_string(),
        description: template.description.clone(),
        external_url: template.external_url.clone(),
        mime_type: PNG_MIME_TYPE.to_string(),
        properties: entry.properties.clone(),
    }
}

/// ARC-69ドキュメントが空でない属性を持つか。
/// `null`、空オブジェクト、空配列、空文字列は空とみなす。
pub fn has_properties(metadata: &Arc69Metadata) -> bool {
    match &metadata.properties {
        serde_json::Value::Null => false,
        serde_json::Value::Object(map) => !map.is_empty(),
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
