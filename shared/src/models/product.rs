//! Product Model
//!
//! 香水/化妆品目录的商品记录（schema v2，扁平库存）。
//! JSON 字段统一使用 camelCase，金额字段在 JSON 中是数字。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current schema revision written to every stored record
pub const SCHEMA_VERSION: u32 = 2;

/// Maximum number of image references per product
pub const MAX_IMAGES: usize = 3;

/// Packaging size of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Volumen {
    #[serde(rename = "5ml")]
    Ml5,
    #[serde(rename = "10ml")]
    Ml10,
    #[serde(rename = "15ml")]
    Ml15,
    #[serde(rename = "30ml")]
    Ml30,
    #[serde(rename = "50ml")]
    Ml50,
    #[serde(rename = "60ml")]
    Ml60,
    #[serde(rename = "75ml")]
    Ml75,
    #[serde(rename = "80ml")]
    Ml80,
    #[serde(rename = "90ml")]
    Ml90,
    #[serde(rename = "100ml")]
    Ml100,
    #[serde(rename = "125ml")]
    Ml125,
    #[serde(rename = "150ml")]
    Ml150,
    #[serde(rename = "200ml")]
    Ml200,
}

impl Volumen {
    pub const ALL: [Volumen; 13] = [
        Volumen::Ml5,
        Volumen::Ml10,
        Volumen::Ml15,
        Volumen::Ml30,
        Volumen::Ml50,
        Volumen::Ml60,
        Volumen::Ml75,
        Volumen::Ml80,
        Volumen::Ml90,
        Volumen::Ml100,
        Volumen::Ml125,
        Volumen::Ml150,
        Volumen::Ml200,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Volumen::Ml5 => "5ml",
            Volumen::Ml10 => "10ml",
            Volumen::Ml15 => "15ml",
            Volumen::Ml30 => "30ml",
            Volumen::Ml50 => "50ml",
            Volumen::Ml60 => "60ml",
            Volumen::Ml75 => "75ml",
            Volumen::Ml80 => "80ml",
            Volumen::Ml90 => "90ml",
            Volumen::Ml100 => "100ml",
            Volumen::Ml125 => "125ml",
            Volumen::Ml150 => "150ml",
            Volumen::Ml200 => "200ml",
        }
    }
}

impl fmt::Display for Volumen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target gender
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genero {
    Masculino,
    Femenino,
    #[default]
    Unisex,
}

/// 旧版嵌套规格（仅作为输入接受，入库前折叠为扁平库存）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentacion {
    pub volumen: Volumen,
    #[serde(default)]
    pub stock: i64,
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Internal identifier (UUID v4), stored as `uid` in the document store
    #[serde(alias = "uid")]
    pub id: String,
    /// Business code (unique key)
    pub codigo: String,
    #[serde(default)]
    pub volumen: Option<Volumen>,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub marca: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub categoria: String,
    #[serde(default)]
    pub genero: Genero,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub precio: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub precio_neto: Decimal,
    /// Net price of the wholesale tier
    #[serde(default, with = "rust_decimal::serde::float")]
    pub precio_neto_mayorista: Decimal,
    #[serde(default)]
    pub descuento: bool,
    /// 0..=100
    #[serde(default, with = "rust_decimal::serde::float")]
    pub porcentaje_descuento: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub precio_descuento: Decimal,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub imagenes: Vec<String>,
    #[serde(default)]
    pub ubicacion: String,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Incoming product payload (one entry of `POST /products`, or a `PUT` body)
///
/// Every field is optional at decode time; required-field and range rules are
/// applied by the server's validation pass so a batch can report per-entry
/// errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub codigo: Option<String>,
    pub volumen: Option<Volumen>,
    pub nombre: Option<String>,
    pub marca: Option<String>,
    pub descripcion: Option<String>,
    pub categoria: Option<String>,
    pub genero: Option<Genero>,
    pub tags: Option<Vec<String>>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub precio: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub precio_neto: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub precio_neto_mayorista: Option<Decimal>,
    pub descuento: Option<bool>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub porcentaje_descuento: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub precio_descuento: Option<Decimal>,
    pub stock: Option<i64>,
    pub imagenes: Option<Vec<String>>,
    pub ubicacion: Option<String>,
    /// Legacy nested stock
    pub presentaciones: Option<Vec<Presentacion>>,
}

/// `PATCH /products/location/{codigo}` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub ubicacion: Option<String>,
}

/// Per-entry validation failure of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryError {
    /// Position of the entry in the normalized batch
    pub index: usize,
    /// Entry codigo, when one could be read
    pub codigo: Option<String>,
    pub message: String,
}

/// Successful reconciliation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub status: String,
    pub inserted_count: u64,
    pub modified_count: u64,
}

impl BatchResult {
    pub fn ok(inserted_count: u64, modified_count: u64) -> Self {
        Self {
            status: "ok".to_string(),
            inserted_count,
            modified_count,
        }
    }
}

/// Delete result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}
