//! Product payload validation
//!
//! 把 [`ProductInput`] 校验并补全默认值，得到可写入的 [`ProductDraft`]。

use rust_decimal::Decimal;
use shared::models::{MAX_IMAGES, ProductInput};

use crate::db::models::ProductDraft;
use crate::utils::validation::{
    MAX_CODE_LEN, MAX_DESCRIPTION_LEN, MAX_LOCATION_LEN, MAX_NAME_LEN, MAX_TAG_LEN, MAX_URL_LEN,
    validate_optional_text, validate_percentage, validate_price, validate_required_text,
    validate_text_len,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Validate an incoming payload and apply the documented defaults
///
/// - `codigo` is trimmed and required
/// - legacy `presentaciones` are folded into the scalar stock
/// - `precioDescuento` is derived from `precio` when not given explicitly
pub fn validate_product(input: ProductInput) -> AppResult<ProductDraft> {
    let codigo = input.codigo.as_deref().unwrap_or_default().trim().to_string();
    validate_required_text(&codigo, "codigo", MAX_CODE_LEN)?;

    validate_optional_text(&input.nombre, "nombre", MAX_NAME_LEN)?;
    validate_optional_text(&input.marca, "marca", MAX_NAME_LEN)?;
    validate_optional_text(&input.categoria, "categoria", MAX_NAME_LEN)?;
    validate_optional_text(&input.descripcion, "descripcion", MAX_DESCRIPTION_LEN)?;
    validate_optional_text(&input.ubicacion, "ubicacion", MAX_LOCATION_LEN)?;

    let tags = input.tags.unwrap_or_default();
    for tag in &tags {
        validate_text_len(tag, "tags", MAX_TAG_LEN)?;
    }

    let imagenes = input.imagenes.unwrap_or_default();
    if imagenes.len() > MAX_IMAGES {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("At most {MAX_IMAGES} images are allowed"),
        )
        .with_detail("field", "imagenes"));
    }
    for url in &imagenes {
        validate_text_len(url, "imagenes", MAX_URL_LEN)?;
    }

    let precio = input.precio.unwrap_or_default();
    let precio_neto = input.precio_neto.unwrap_or_default();
    let precio_neto_mayorista = input.precio_neto_mayorista.unwrap_or_default();
    validate_price(precio, "precio")?;
    validate_price(precio_neto, "precioNeto")?;
    validate_price(precio_neto_mayorista, "precioNetoMayorista")?;

    let descuento = input.descuento.unwrap_or(false);
    let porcentaje_descuento = input.porcentaje_descuento.unwrap_or_default();
    validate_percentage(porcentaje_descuento, "porcentajeDescuento")?;

    let precio_descuento = match input.precio_descuento {
        Some(explicit) => {
            validate_price(explicit, "precioDescuento")?;
            explicit
        }
        None => discounted_price(descuento, precio, porcentaje_descuento),
    };

    // 旧版嵌套规格：库存累加，唯一规格时沿用其 volumen
    let presentaciones = input.presentaciones.unwrap_or_default();
    let stock = presentaciones
        .iter()
        .try_fold(input.stock.unwrap_or(0), |acc, p| acc.checked_add(p.stock))
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ValueOutOfRange, "stock is out of range")
                .with_detail("field", "stock")
        })?;
    let volumen = match (input.volumen, presentaciones.as_slice()) {
        (Some(v), _) => Some(v),
        (None, [only]) => Some(only.volumen),
        (None, _) => None,
    };

    Ok(ProductDraft {
        codigo,
        volumen,
        nombre: input.nombre.unwrap_or_default(),
        marca: input.marca.unwrap_or_default(),
        descripcion: input.descripcion.unwrap_or_default(),
        categoria: input.categoria.unwrap_or_default(),
        genero: input.genero.unwrap_or_default(),
        tags,
        precio,
        precio_neto,
        precio_neto_mayorista,
        descuento,
        porcentaje_descuento,
        precio_descuento,
        stock,
        imagenes,
        ubicacion: input.ubicacion.unwrap_or_default(),
    })
}

fn discounted_price(descuento: bool, precio: Decimal, porcentaje: Decimal) -> Decimal {
    if !descuento {
        return Decimal::ZERO;
    }
    (precio * (Decimal::ONE_HUNDRED - porcentaje) / Decimal::ONE_HUNDRED).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Genero, Presentacion, Volumen};

    fn input(codigo: &str) -> ProductInput {
        ProductInput {
            codigo: Some(codigo.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn applies_defaults() {
        let draft = validate_product(input("  P-100 ")).unwrap();
        assert_eq!(draft.codigo, "P-100");
        assert_eq!(draft.genero, Genero::Unisex);
        assert_eq!(draft.stock, 0);
        assert_eq!(draft.precio_descuento, Decimal::ZERO);
        assert!(draft.volumen.is_none());
        assert!(draft.tags.is_empty());
    }

    #[test]
    fn codigo_is_required() {
        let err = validate_product(input("   ")).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        let err = validate_product(ProductInput::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
    }

    #[test]
    fn derives_discount_price() {
        let mut i = input("P-1");
        i.precio = Some(Decimal::new(4999, 2));
        i.descuento = Some(true);
        i.porcentaje_descuento = Some(Decimal::new(15, 0));
        let draft = validate_product(i.clone()).unwrap();
        // 49.99 * 0.85 = 42.4915
        assert_eq!(draft.precio_descuento, Decimal::new(4249, 2));

        i.precio_descuento = Some(Decimal::new(40, 0));
        assert_eq!(validate_product(i).unwrap().precio_descuento, Decimal::new(40, 0));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut i = input("P-1");
        i.precio = Some(Decimal::new(-5, 0));
        assert_eq!(
            validate_product(i).unwrap_err().code,
            ErrorCode::ProductInvalidPrice
        );

        let mut i = input("P-1");
        i.porcentaje_descuento = Some(Decimal::new(120, 0));
        assert_eq!(validate_product(i).unwrap_err().code, ErrorCode::ValueOutOfRange);

        let mut i = input("P-1");
        i.imagenes = Some(vec!["a.jpg".into(), "b.jpg".into(), "c.jpg".into(), "d.jpg".into()]);
        assert_eq!(validate_product(i).unwrap_err().code, ErrorCode::ValueOutOfRange);
    }

    #[test]
    fn folds_presentaciones() {
        let mut i = input("P-1");
        i.stock = Some(2);
        i.presentaciones = Some(vec![Presentacion {
            volumen: Volumen::Ml100,
            stock: 4,
        }]);
        let draft = validate_product(i.clone()).unwrap();
        assert_eq!(draft.stock, 6);
        assert_eq!(draft.volumen, Some(Volumen::Ml100));

        i.presentaciones = Some(vec![
            Presentacion {
                volumen: Volumen::Ml30,
                stock: 1,
            },
            Presentacion {
                volumen: Volumen::Ml50,
                stock: 1,
            },
        ]);
        let draft = validate_product(i).unwrap();
        assert_eq!(draft.stock, 4);
        assert!(draft.volumen.is_none());
    }

    #[test]
    fn folded_stock_overflow_is_rejected() {
        let mut i = input("P-1");
        i.stock = Some(i64::MAX);
        i.presentaciones = Some(vec![Presentacion {
            volumen: Volumen::Ml50,
            stock: 1,
        }]);
        let err = validate_product(i).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert_eq!(err.details.unwrap()["field"], "stock");
    }
}
