// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod factory;
pub mod loader;
pub mod metadata;

pub use factory::StructureFactory;
pub use loader::{StructureLoader, StructureRequirements, XmlStructureLoader};
pub use metadata::{Item, Property, StructureMetadata};

#[derive(Debug)]
pub enum StructureError {
    DocumentTypeNotFound(String),
    StructureTypeNotFound {
        document_type: String,
        structure_type: String,
    },
    InvalidXml {
        file: String,
        message: String,
    },
    InvalidStructure {
        file: String,
        message: String,
    },
    Io(String),
    Cache(String),
}

impl std::fmt::Display for StructureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructureError::DocumentTypeNotFound(document_type) => {
                write!(f, "No structure paths configured for document type '{}'", document_type)
            }
            StructureError::StructureTypeNotFound {
                document_type,
                structure_type,
            } => write!(
                f,
                "Structure '{}' of document type '{}' not found",
                structure_type, document_type
            ),
            StructureError::InvalidXml { file, message } => {
                write!(f, "Invalid structure XML in {}: {}", file, message)
            }
            StructureError::InvalidStructure { file, message } => {
                write!(f, "Invalid structure in {}: {}", file, message)
            }
            StructureError::Io(message) => write!(f, "Structure I/O error: {}", message),
            StructureError::Cache(message) => write!(f, "Structure cache error: {}", message),
        }
    }
}

impl std::error::Error for StructureError {}
