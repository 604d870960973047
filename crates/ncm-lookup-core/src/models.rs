//! Core data models shared by the cache, the storage provider, and the
//! backend client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One row of the NCM table as served by the backend.
///
/// The backend uses Portuguese column names; the English field names are
/// accepted as aliases so locally authored JSON files load too. Columns not
/// modelled here are kept in [`NcmItem::extra`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NcmItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "codigo", alias = "code")]
    pub code: String,
    #[serde(rename = "descricao", alias = "description", default)]
    pub description: String,
    #[serde(rename = "data_inicio", alias = "start", default)]
    pub start: String,
    #[serde(rename = "data_fim", alias = "end", default)]
    pub end: String,
    #[serde(rename = "tipo_ato_inicio", alias = "act_kind", default)]
    pub act_kind: String,
    #[serde(rename = "numero_ato_inicio", alias = "act_number", default)]
    pub act_number: String,
    #[serde(rename = "ano_ato_inicio", alias = "act_year", default)]
    pub act_year: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl NcmItem {
    /// Minimal item carrying only a code and its description.
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}

/// In-memory chapter and position descriptions.
///
/// Chapter keys are exactly two ASCII digits, position keys exactly four.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NcmContext {
    pub chapters: BTreeMap<String, String>,
    pub positions: BTreeMap<String, String>,
}

impl NcmContext {
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty() && self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.chapters.clear();
        self.positions.clear();
    }
}

/// The single persisted record holding a snapshot of [`NcmContext`].
///
/// Field names match the persisted shape
/// `{ id, chapters, positions, version, lastUpdated }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredContext {
    pub id: String,
    pub chapters: BTreeMap<String, String>,
    pub positions: BTreeMap<String, String>,
    pub version: String,
    /// Epoch milliseconds.
    pub last_updated: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_deserializes_backend_columns() {
        let json = r#"{
            "id": 7,
            "codigo": "0101.21.00",
            "descricao": "Reprodutores de ra&ccedil;a pura",
            "data_inicio": "2022-04-01",
            "data_fim": "9999-12-31",
            "tipo_ato_inicio": "Res Camex",
            "numero_ato_inicio": "272",
            "ano_ato_inicio": "2021",
            "unidade": "UN"
        }"#;
        let item: NcmItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, Some(7));
        assert_eq!(item.code, "0101.21.00");
        assert_eq!(item.act_year, "2021");
        assert_eq!(item.extra.get("unidade").unwrap(), "UN");
    }

    #[test]
    fn test_item_accepts_english_aliases() {
        let item: NcmItem =
            serde_json::from_str(r#"{"code": "01", "description": "Animais vivos"}"#).unwrap();
        assert_eq!(item.id, None);
        assert_eq!(item.code, "01");
        assert_eq!(item.description, "Animais vivos");
        assert!(item.start.is_empty());
    }

    #[test]
    fn test_stored_context_uses_camel_case() {
        let stored = StoredContext {
            id: "ncm-context".to_string(),
            chapters: BTreeMap::from([("01".to_string(), "Animais vivos".to_string())]),
            positions: BTreeMap::new(),
            version: "1.0.0".to_string(),
            last_updated: 42,
        };
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["lastUpdated"], 42);
        assert_eq!(value["chapters"]["01"], "Animais vivos");
    }
}
