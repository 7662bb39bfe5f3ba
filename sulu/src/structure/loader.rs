// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::StructureError;
use super::metadata::{
    Block, BlockType, CacheLifetime, Item, Param, Property, Section, StructureMetadata, Tag,
    Titles,
};
use crate::config::StructureTypeConfig;
use crate::xml::{XmlElement, XmlError, parse_document};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub trait StructureLoader: Send + Sync {
    fn load(&self, path: &Path, document_type: &str) -> Result<StructureMetadata, StructureError>;
}

/// Requirements every structure of a document type must meet.
#[derive(Debug, Clone, Default)]
pub struct StructureRequirements {
    pub properties: Vec<String>,
    pub tags: Vec<String>,
}

/// Reads structure templates from XML files.
#[derive(Debug, Clone, Default)]
pub struct XmlStructureLoader {
    requirements: BTreeMap<String, StructureRequirements>,
}

impl XmlStructureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(structures: &BTreeMap<String, StructureTypeConfig>) -> Self {
        let requirements = structures
            .iter()
            .map(|(document_type, config)| {
                (
                    document_type.clone(),
                    StructureRequirements {
                        properties: config.required_properties.clone(),
                        tags: config.required_tags.clone(),
                    },
                )
            })
            .collect();
        Self { requirements }
    }

    pub fn with_requirements(
        mut self,
        document_type: &str,
        requirements: StructureRequirements,
    ) -> Self {
        self.requirements
            .insert(document_type.to_string(), requirements);
        self
    }

    pub fn parse(
        &self,
        content: &str,
        resource: &str,
        document_type: &str,
    ) -> Result<StructureMetadata, StructureError> {
        let invalid_xml = |err: XmlError| StructureError::InvalidXml {
            file: resource.to_string(),
            message: err.to_string(),
        };
        let root = parse_document(content).map_err(invalid_xml)?;
        if root.name != "template" {
            return Err(StructureError::InvalidStructure {
                file: resource.to_string(),
                message: format!("root element must be <template>, got <{}>", root.name),
            });
        }

        let key = root
            .child_text("key")
            .ok_or_else(|| StructureError::InvalidStructure {
                file: resource.to_string(),
                message: "<key> is required".to_string(),
            })?
            .to_string();

        let cache_lifetime = match root.child("cacheLifetime") {
            Some(node) => Some(parse_cache_lifetime(node).map_err(invalid_xml)?),
            None => None,
        };

        let items = match root.child("properties") {
            Some(node) => parse_items(node).map_err(invalid_xml)?,
            None => Vec::new(),
        };

        let metadata = StructureMetadata {
            key,
            document_type: document_type.to_string(),
            view: root.child_text("view").map(str::to_string),
            controller: root.child_text("controller").map(str::to_string),
            cache_lifetime,
            titles: parse_titles(&root),
            tags: parse_tags(&root).map_err(invalid_xml)?,
            items,
            resource: resource.to_string(),
        };
        self.validate(&metadata)?;
        Ok(metadata)
    }

    fn validate(&self, metadata: &StructureMetadata) -> Result<(), StructureError> {
        let invalid = |message: String| StructureError::InvalidStructure {
            file: metadata.resource.clone(),
            message,
        };

        let stem = Path::new(&metadata.resource)
            .file_stem()
            .and_then(|stem| stem.to_str());
        if let Some(stem) = stem
            && stem != metadata.key
        {
            return Err(invalid(format!(
                "key '{}' does not match file name '{}'",
                metadata.key, stem
            )));
        }

        let Some(requirements) = self.requirements.get(&metadata.document_type) else {
            return Ok(());
        };
        for name in &requirements.properties {
            if metadata.property(name).is_none() {
                return Err(invalid(format!(
                    "{} template '{}' is missing required property '{}'",
                    metadata.document_type, metadata.key, name
                )));
            }
        }
        for tag in &requirements.tags {
            if metadata.item_name_by_tag(tag).is_none() {
                return Err(invalid(format!(
                    "{} template '{}' is missing required tag '{}'",
                    metadata.document_type, metadata.key, tag
                )));
            }
        }
        Ok(())
    }
}

impl StructureLoader for XmlStructureLoader {
    fn load(&self, path: &Path, document_type: &str) -> Result<StructureMetadata, StructureError> {
        let content = fs::read_to_string(path)
            .map_err(|err| StructureError::Io(format!("{}: {}", path.display(), err)))?;
        self.parse(&content, &path.display().to_string(), document_type)
    }
}

fn parse_cache_lifetime(node: &XmlElement) -> Result<CacheLifetime, XmlError> {
    let value = node.text();
    match node.attr("type").unwrap_or("seconds") {
        "seconds" => value.parse::<u64>().map(CacheLifetime::Seconds).map_err(|_| {
            XmlError::new(format!("<cacheLifetime> must be a number of seconds, got '{}'", value))
        }),
        "expression" => Ok(CacheLifetime::Expression(value.to_string())),
        other => Err(XmlError::new(format!(
            "<cacheLifetime> has unknown type '{}'",
            other
        ))),
    }
}

/// Titles from `<meta><title lang="..">`.
fn parse_titles(node: &XmlElement) -> Titles {
    let mut titles = Titles::new();
    if let Some(meta) = node.child("meta") {
        for title in meta.children_named("title") {
            if let Some(lang) = title.attr("lang") {
                titles.insert(lang.to_string(), title.text().to_string());
            }
        }
    }
    titles
}

fn parse_tags(node: &XmlElement) -> Result<Vec<Tag>, XmlError> {
    let mut tags = Vec::new();
    for tag in node.children_named("tag") {
        let name = tag
            .attr("name")
            .ok_or_else(|| XmlError::new("<tag> requires a 'name' attribute"))?;
        let attributes = tag
            .attributes
            .iter()
            .filter(|(key, _)| key != "name" && key != "priority")
            .cloned()
            .collect();
        tags.push(Tag {
            name: name.to_string(),
            priority: tag.u32_attr("priority")?,
            attributes,
        });
    }
    Ok(tags)
}

fn parse_params(node: &XmlElement) -> Result<Vec<Param>, XmlError> {
    let Some(list) = node.child("params") else {
        return Ok(Vec::new());
    };
    list.children_named("param").map(parse_param).collect()
}

fn parse_param(node: &XmlElement) -> Result<Param, XmlError> {
    let name = node
        .attr("name")
        .ok_or_else(|| XmlError::new("<param> requires a 'name' attribute"))?;
    let children = node
        .children_named("param")
        .map(parse_param)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Param {
        name: name.to_string(),
        value: node.attr("value").map(str::to_string),
        children,
    })
}

fn parse_items(node: &XmlElement) -> Result<Vec<Item>, XmlError> {
    let mut items = Vec::new();
    for child in &node.children {
        match child.name.as_str() {
            "property" => items.push(Item::Property(parse_property(child)?)),
            "section" => items.push(Item::Section(parse_section(child)?)),
            "block" => items.push(Item::Block(parse_block(child)?)),
            _ => {}
        }
    }
    Ok(items)
}

fn required_name(node: &XmlElement) -> Result<String, XmlError> {
    node.attr("name")
        .map(str::to_string)
        .ok_or_else(|| XmlError::new(format!("<{}> requires a 'name' attribute", node.name)))
}

fn parse_property(node: &XmlElement) -> Result<Property, XmlError> {
    let name = required_name(node)?;
    let property_type = node
        .attr("type")
        .ok_or_else(|| XmlError::new(format!("property '{}' requires a 'type'", name)))?
        .to_string();
    Ok(Property {
        property_type,
        mandatory: node.bool_attr("mandatory")?.unwrap_or(false),
        multilingual: node.bool_attr("multilingual")?.unwrap_or(true),
        min_occurs: node.u32_attr("minOccurs")?,
        max_occurs: node.u32_attr("maxOccurs")?,
        titles: parse_titles(node),
        params: parse_params(node)?,
        tags: parse_tags(node)?,
        name,
    })
}

fn parse_section(node: &XmlElement) -> Result<Section, XmlError> {
    Ok(Section {
        name: required_name(node)?,
        titles: parse_titles(node),
        items: match node.child("properties") {
            Some(properties) => parse_items(properties)?,
            None => Vec::new(),
        },
    })
}

fn parse_block(node: &XmlElement) -> Result<Block, XmlError> {
    let name = required_name(node)?;
    let mut types = Vec::new();
    if let Some(list) = node.child("types") {
        for type_node in list.children_named("type") {
            types.push(BlockType {
                name: required_name(type_node)?,
                titles: parse_titles(type_node),
                items: match type_node.child("properties") {
                    Some(properties) => parse_items(properties)?,
                    None => Vec::new(),
                },
            });
        }
    }
    if types.is_empty() {
        return Err(XmlError::new(format!("block '{}' defines no types", name)));
    }
    let default_type = match node.attr("default-type") {
        Some(default_type) => {
            if !types.iter().any(|block_type| block_type.name == default_type) {
                return Err(XmlError::new(format!(
                    "block '{}' default type '{}' is not defined",
                    name, default_type
                )));
            }
            default_type.to_string()
        }
        None => types[0].name.clone(),
    };
    Ok(Block {
        default_type,
        mandatory: node.bool_attr("mandatory")?.unwrap_or(false),
        min_occurs: node.u32_attr("minOccurs")?,
        max_occurs: node.u32_attr("maxOccurs")?,
        titles: parse_titles(node),
        tags: parse_tags(node)?,
        types,
        name,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const DEFAULT_PAGE: &str = r#"<?xml version="1.0" ?>
<template xmlns="http://schemas.sulu.io/template/template">
    <key>default</key>
    <view>pages/default</view>
    <controller>Sulu\Bundle\WebsiteBundle\Controller\DefaultController::indexAction</controller>
    <cacheLifetime>604800</cacheLifetime>
    <meta>
        <title lang="en">Default</title>
        <title lang="de">Standard</title>
    </meta>
    <properties>
        <property name="title" type="text_line" mandatory="true">
            <meta><title lang="en">Title</title></meta>
            <params><param name="headline" value="true"/></params>
            <tag name="sulu.rlp.part"/>
        </property>
        <property name="url" type="resource_locator" mandatory="true">
            <tag name="sulu.rlp"/>
        </property>
        <section name="highlight">
            <properties>
                <property name="image" type="single_media_selection" multilingual="false"/>
            </properties>
        </section>
        <block name="blocks" default-type="text" minOccurs="0">
            <types>
                <type name="text">
                    <meta><title lang="en">Text</title></meta>
                    <properties>
                        <property name="text" type="text_editor"/>
                    </properties>
                </type>
                <type name="quote">
                    <properties>
                        <property name="quote" type="text_area"/>
                    </properties>
                </type>
            </types>
        </block>
    </properties>
</template>"#;

    fn page_loader() -> XmlStructureLoader {
        XmlStructureLoader::new().with_requirements(
            "page",
            StructureRequirements {
                properties: vec!["title".to_string()],
                tags: vec!["sulu.rlp".to_string()],
            },
        )
    }

    #[test]
    fn parses_template_document() {
        let metadata = page_loader()
            .parse(DEFAULT_PAGE, "templates/pages/default.xml", "page")
            .expect("valid template");
        assert_eq!(metadata.key, "default");
        assert_eq!(metadata.view.as_deref(), Some("pages/default"));
        assert_eq!(metadata.cache_lifetime, Some(CacheLifetime::Seconds(604800)));
        assert_eq!(metadata.title("de"), Some("Standard"));
        assert_eq!(metadata.items.len(), 4);

        let title = metadata.property("title").expect("title");
        assert!(title.mandatory);
        assert_eq!(title.params[0].value.as_deref(), Some("true"));
        assert!(title.has_tag("sulu.rlp.part"));

        let image = metadata.property("image").expect("image in section");
        assert!(!image.multilingual);

        let Item::Block(block) = &metadata.items[3] else {
            panic!("expected block");
        };
        assert_eq!(block.default_type, "text");
        assert_eq!(block.types.len(), 2);
        assert_eq!(block.min_occurs, Some(0));
    }

    #[test]
    fn key_must_match_file_name() {
        let err = page_loader()
            .parse(DEFAULT_PAGE, "templates/pages/homepage.xml", "page")
            .expect_err("mismatched key");
        assert!(matches!(err, StructureError::InvalidStructure { .. }));
    }

    #[test]
    fn enforces_required_properties_and_tags() {
        let without_tag = DEFAULT_PAGE.replace(r#"<tag name="sulu.rlp"/>"#, "");
        let err = page_loader()
            .parse(&without_tag, "default.xml", "page")
            .expect_err("missing tag");
        assert!(err.to_string().contains("sulu.rlp"));

        // Snippets have no requirements configured.
        assert!(page_loader().parse(&without_tag, "default.xml", "snippet").is_ok());
    }

    #[test]
    fn rejects_unknown_block_default_type() {
        let xml = DEFAULT_PAGE.replace(r#"default-type="text""#, r#"default-type="image""#);
        let err = page_loader()
            .parse(&xml, "default.xml", "page")
            .expect_err("unknown default type");
        assert!(matches!(err, StructureError::InvalidXml { .. }));
    }
}
