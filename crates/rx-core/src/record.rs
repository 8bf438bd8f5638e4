//! Core record types for extracted report rows

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A single product row extracted from a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier of the originating document (file name)
    pub source_document: String,
    /// "Razón Social" value of the document, empty if absent
    pub entity_name: String,
    /// Ten-digit product code
    pub code: String,
    /// Free-text description
    pub description: String,
    /// Integer quantity as a digit string
    pub quantity: String,
    /// Discount as a digit string, optionally with a decimal point
    pub discount: String,
}

impl Record {
    /// Get a cell value by column
    pub fn get(&self, column: Column) -> &str {
        column.value(self)
    }
}

/// The six record columns, in display and export order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Document,
    EntityName,
    Code,
    Description,
    Quantity,
    Discount,
}

impl Column {
    /// All columns in display order
    pub const ALL: [Column; 6] = [
        Column::Document,
        Column::EntityName,
        Column::Code,
        Column::Description,
        Column::Quantity,
        Column::Discount,
    ];

    /// Column index (0-based)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column at a 0-based index
    pub fn from_index(index: usize) -> Option<Column> {
        Self::ALL.get(index).copied()
    }

    /// Stable snake_case identifier
    pub fn id(self) -> &'static str {
        match self {
            Column::Document => "document",
            Column::EntityName => "entity_name",
            Column::Code => "code",
            Column::Description => "description",
            Column::Quantity => "quantity",
            Column::Discount => "discount",
        }
    }

    /// Header label used on export
    pub fn label(self) -> &'static str {
        match self {
            Column::Document => "Archivo",
            Column::EntityName => "Razón Social",
            Column::Code => "Código",
            Column::Description => "Descripción",
            Column::Quantity => "Cantidad",
            Column::Discount => "Descuento",
        }
    }

    /// Free-text columns are quoted on export
    pub fn is_free_text(self) -> bool {
        matches!(
            self,
            Column::Document | Column::EntityName | Column::Description
        )
    }

    /// The record's value for this column
    pub fn value(self, record: &Record) -> &str {
        match self {
            Column::Document => &record.source_document,
            Column::EntityName => &record.entity_name,
            Column::Code => &record.code,
            Column::Description => &record.description,
            Column::Quantity => &record.quantity,
            Column::Discount => &record.discount,
        }
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        let column = match key.as_str() {
            "document" | "file" | "archivo" => Column::Document,
            "entity_name" | "entity" | "razón_social" | "razon_social" => Column::EntityName,
            "code" | "código" | "codigo" => Column::Code,
            "description" | "descripción" | "descripcion" => Column::Description,
            "quantity" | "cantidad" => Column::Quantity,
            "discount" | "descuento" => Column::Discount,
            _ => return Err(Error::UnknownColumn(s.to_string())),
        };
        Ok(column)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}
