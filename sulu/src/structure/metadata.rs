// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Localized labels keyed by language, e.g. `en -> Title`.
pub type Titles = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CacheLifetime {
    Seconds(u64),
    /// Cron expression evaluated by the HTTP cache layer.
    Expression(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub mandatory: bool,
    pub multilingual: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_occurs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_occurs: Option<u32>,
    #[serde(default)]
    pub titles: Titles,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Property {
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    #[serde(default)]
    pub titles: Titles,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockType {
    pub name: String,
    #[serde(default)]
    pub titles: Titles,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub name: String,
    pub default_type: String,
    pub mandatory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_occurs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_occurs: Option<u32>,
    #[serde(default)]
    pub titles: Titles,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub types: Vec<BlockType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Item {
    Property(Property),
    Section(Section),
    Block(Block),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Property(property) => &property.name,
            Item::Section(section) => &section.name,
            Item::Block(block) => &block.name,
        }
    }

    fn tags(&self) -> &[Tag] {
        match self {
            Item::Property(property) => &property.tags,
            Item::Block(block) => &block.tags,
            Item::Section(_) => &[],
        }
    }
}

/// Template metadata of one structure type, e.g. the `default` page template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureMetadata {
    pub key: String,
    pub document_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_lifetime: Option<CacheLifetime>,
    #[serde(default)]
    pub titles: Titles,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub items: Vec<Item>,
    /// File the metadata was read from.
    pub resource: String,
}

impl StructureMetadata {
    pub fn title(&self, language: &str) -> Option<&str> {
        self.titles.get(language).map(|title| title.as_str())
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }

    /// Every property, with section contents inlined. Block children are not included.
    pub fn properties(&self) -> Vec<&Property> {
        fn collect<'a>(items: &'a [Item], out: &mut Vec<&'a Property>) {
            for item in items {
                match item {
                    Item::Property(property) => out.push(property),
                    Item::Section(section) => collect(&section.items, out),
                    Item::Block(_) => {}
                }
            }
        }
        let mut result = Vec::new();
        collect(&self.items, &mut result);
        result
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties()
            .into_iter()
            .find(|property| property.name == name)
    }

    /// Name of the first top-level item (or section child) carrying `tag`.
    pub fn item_name_by_tag(&self, tag: &str) -> Option<&str> {
        fn find<'a>(items: &'a [Item], tag: &str) -> Option<&'a str> {
            for item in items {
                if item.tags().iter().any(|candidate| candidate.name == tag) {
                    return Some(item.name());
                }
                if let Item::Section(section) = item
                    && let Some(found) = find(&section.items, tag)
                {
                    return Some(found);
                }
            }
            None
        }
        find(&self.items, tag)
    }

    /// JSON form model for admin clients.
    pub fn to_model(&self) -> Value {
        json!({
            "key": self.key,
            "type": self.document_type,
            "title": self.titles,
            "view": self.view,
            "controller": self.controller,
            "cacheLifetime": self.cache_lifetime,
            "tags": self.tags,
            "form": form_model(&self.items),
        })
    }
}

fn form_model(items: &[Item]) -> Value {
    let mut form = Map::new();
    for item in items {
        let entry = match item {
            Item::Property(property) => json!({
                "type": property.property_type,
                "label": property.titles,
                "required": property.mandatory,
                "multilingual": property.multilingual,
                "minOccurs": property.min_occurs,
                "maxOccurs": property.max_occurs,
                "params": params_model(&property.params),
                "tags": property.tags,
            }),
            Item::Section(section) => json!({
                "type": "section",
                "label": section.titles,
                "items": form_model(&section.items),
            }),
            Item::Block(block) => {
                let mut types = Map::new();
                for block_type in &block.types {
                    types.insert(
                        block_type.name.clone(),
                        json!({
                            "title": block_type.titles,
                            "form": form_model(&block_type.items),
                        }),
                    );
                }
                json!({
                    "type": "block",
                    "label": block.titles,
                    "required": block.mandatory,
                    "minOccurs": block.min_occurs,
                    "maxOccurs": block.max_occurs,
                    "defaultType": block.default_type,
                    "types": types,
                    "tags": block.tags,
                })
            }
        };
        form.insert(item.name().to_string(), entry);
    }
    Value::Object(form)
}

fn params_model(params: &[Param]) -> Value {
    let mut result = Map::new();
    for param in params {
        let value = if param.children.is_empty() {
            json!(param.value)
        } else {
            params_model(&param.children)
        };
        result.insert(param.name.clone(), value);
    }
    Value::Object(result)
}
