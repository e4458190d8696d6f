//! Product write models

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{Genero, Product, SCHEMA_VERSION, Volumen};

/// Validated product fields, ready to be written
///
/// `stock` is the absolute value for a snapshot replace. For a bulk upsert
/// the stock travels separately in [`UpsertOp::inc_stock`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub codigo: String,
    pub volumen: Option<Volumen>,
    pub nombre: String,
    pub marca: String,
    pub descripcion: String,
    pub categoria: String,
    pub genero: Genero,
    pub tags: Vec<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio_neto: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio_neto_mayorista: Decimal,
    pub descuento: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub porcentaje_descuento: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio_descuento: Decimal,
    #[serde(skip)]
    pub stock: i64,
    pub imagenes: Vec<String>,
    pub ubicacion: String,
}

impl ProductDraft {
    /// Build a stored record from this draft
    pub fn into_product(self, id: String, created_at: i64, updated_at: i64) -> Product {
        Product {
            id,
            codigo: self.codigo,
            volumen: self.volumen,
            nombre: self.nombre,
            marca: self.marca,
            descripcion: self.descripcion,
            categoria: self.categoria,
            genero: self.genero,
            tags: self.tags,
            precio: self.precio,
            precio_neto: self.precio_neto,
            precio_neto_mayorista: self.precio_neto_mayorista,
            descuento: self.descuento,
            porcentaje_descuento: self.porcentaje_descuento,
            precio_descuento: self.precio_descuento,
            stock: self.stock,
            imagenes: self.imagenes,
            ubicacion: self.ubicacion,
            schema_version: SCHEMA_VERSION,
            created_at,
            updated_at,
        }
    }

    /// Overwrite the descriptive fields of `product`, stock is left untouched
    pub fn merge_into(&self, product: &mut Product, now: i64) {
        product.codigo = self.codigo.clone();
        product.volumen = self.volumen;
        product.nombre = self.nombre.clone();
        product.marca = self.marca.clone();
        product.descripcion = self.descripcion.clone();
        product.categoria = self.categoria.clone();
        product.genero = self.genero;
        product.tags = self.tags.clone();
        product.precio = self.precio;
        product.precio_neto = self.precio_neto;
        product.precio_neto_mayorista = self.precio_neto_mayorista;
        product.descuento = self.descuento;
        product.porcentaje_descuento = self.porcentaje_descuento;
        product.precio_descuento = self.precio_descuento;
        product.imagenes = self.imagenes.clone();
        product.ubicacion = self.ubicacion.clone();
        product.schema_version = SCHEMA_VERSION;
        product.updated_at = now;
    }

    /// Descriptive fields as a MERGE document (camelCase, no stock)
    pub fn merge_document(&self, now: i64) -> Result<serde_json::Value, serde_json::Error> {
        let mut doc = serde_json::to_value(self)?;
        if let serde_json::Value::Object(map) = &mut doc {
            map.insert("schemaVersion".to_string(), SCHEMA_VERSION.into());
            map.insert("updatedAt".to_string(), now.into());
        }
        Ok(doc)
    }
}

/// One reconciliation write: filter by codigo, set descriptive fields,
/// increment stock by a delta
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOp {
    pub set: ProductDraft,
    pub inc_stock: i64,
}

impl UpsertOp {
    /// The draft's stock becomes the increment
    pub fn from_draft(mut set: ProductDraft) -> Self {
        let inc_stock = std::mem::take(&mut set.stock);
        Self { set, inc_stock }
    }

    pub fn codigo(&self) -> &str {
        &self.set.codigo
    }
}

/// Counts of a bulk upsert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkWriteResult {
    pub inserted_count: u64,
    pub modified_count: u64,
}

#[cfg(test)]
pub(crate) fn sample_draft(codigo: &str, stock: i64) -> ProductDraft {
    ProductDraft {
        codigo: codigo.to_string(),
        volumen: Some(Volumen::Ml50),
        nombre: format!("Perfume {codigo}"),
        marca: "Marca".to_string(),
        descripcion: String::new(),
        categoria: "Eau de parfum".to_string(),
        genero: Genero::Unisex,
        tags: vec!["floral".to_string()],
        precio: Decimal::new(4999, 2),
        precio_neto: Decimal::new(4000, 2),
        precio_neto_mayorista: Decimal::new(3500, 2),
        descuento: false,
        porcentaje_descuento: Decimal::ZERO,
        precio_descuento: Decimal::ZERO,
        stock,
        imagenes: vec![],
        ubicacion: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_document_excludes_stock() {
        let doc = sample_draft("A-1", 7).merge_document(42).unwrap();
        assert!(doc.get("stock").is_none());
        assert_eq!(doc["codigo"], "A-1");
        assert_eq!(doc["volumen"], "50ml");
        assert_eq!(doc["precioNetoMayorista"], 35.0);
        assert_eq!(doc["updatedAt"], 42);
        assert_eq!(doc["schemaVersion"], 2);
    }

    #[test]
    fn upsert_op_moves_stock_to_increment() {
        let op = UpsertOp::from_draft(sample_draft("A-1", 5));
        assert_eq!(op.inc_stock, 5);
        assert_eq!(op.set.stock, 0);
        assert_eq!(op.codigo(), "A-1");
    }

    #[test]
    fn merge_into_keeps_stock() {
        let mut product = sample_draft("A-1", 10).into_product("id".into(), 1, 1);
        let mut update = sample_draft("A-1", 99);
        update.nombre = "Nuevo".to_string();
        update.merge_into(&mut product, 5);
        assert_eq!(product.nombre, "Nuevo");
        assert_eq!(product.stock, 10);
        assert_eq!(product.updated_at, 5);
        assert_eq!(product.created_at, 1);
    }
}
