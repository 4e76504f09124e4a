use rust_decimal::Decimal;
use serde_json::{Map, Value};
use validator::Validate;

use super::models::NewProduct;
use crate::shared::AppError;
use crate::validation::{
    optional_bool, optional_string, required_string, ValidationErrors, NULL, REQUIRED,
};

pub const BANNED_TITLE_WORD: &str = "fuck";
pub const INVALID_TITLE: &str = "This is not a valid title";

/// Precision of the `NUMERIC(12, 2)` price column
pub const PRICE_MAX_DIGITS: u32 = 12;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

const INVALID_NUMBER: &str = "A valid number is required.";

/// Product fields that passed presence and type checks
#[derive(Debug, Validate)]
struct ProductForm {
    #[validate(length(max = 120, message = "Ensure this field has no more than 120 characters."))]
    title: Option<String>,
}

/// Rejects titles containing the banned word anywhere, in any case
pub fn check_title(title: &str) -> Result<(), &'static str> {
    if title.to_lowercase().contains(BANNED_TITLE_WORD) {
        return Err(INVALID_TITLE);
    }
    Ok(())
}

/// Applies the column's digit limits and the non-negative rule, returning
/// the price rescaled to two decimal places
pub fn check_price(price: Decimal) -> Result<Decimal, String> {
    let normalized = price.normalize();
    let decimal_places = normalized.scale();
    let whole = normalized.trunc().abs().normalize();
    let whole_digits = if whole.is_zero() {
        0
    } else {
        whole.to_string().len() as u32
    };
    let max_whole_digits = PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES;

    if whole_digits + decimal_places > PRICE_MAX_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {} digits in total.",
            PRICE_MAX_DIGITS
        ));
    }
    if decimal_places > PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {} decimal places.",
            PRICE_DECIMAL_PLACES
        ));
    }
    if whole_digits > max_whole_digits {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            max_whole_digits
        ));
    }
    if normalized.is_sign_negative() && !normalized.is_zero() {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }

    let mut price = if normalized.is_zero() {
        Decimal::ZERO
    } else {
        normalized
    };
    price.rescale(PRICE_DECIMAL_PLACES);
    Ok(price)
}

fn read_price(data: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<Decimal> {
    let raw = match data.get("price") {
        None => {
            errors.add("price", REQUIRED);
            return None;
        }
        Some(Value::Null) => {
            errors.add("price", NULL);
            return None;
        }
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => {
            errors.add("price", INVALID_NUMBER);
            return None;
        }
    };

    let parsed = match Decimal::from_str_exact(&raw) {
        Ok(parsed) => parsed,
        Err(_) => {
            errors.add("price", INVALID_NUMBER);
            return None;
        }
    };

    match check_price(parsed) {
        Ok(price) => Some(price),
        Err(message) => {
            errors.add("price", message);
            None
        }
    }
}

impl NewProduct {
    /// Validates a product form body
    pub fn from_payload(data: &Map<String, Value>) -> Result<Self, AppError> {
        let mut errors = ValidationErrors::new();

        let form = ProductForm {
            title: required_string(data, "title", false, &mut errors),
        };
        errors.extend_from(form.validate());
        if let Some(title) = &form.title {
            if !errors.has_field("title") {
                if let Err(message) = check_title(title) {
                    errors.add("title", message);
                }
            }
        }
        let description = optional_string(data, "description", &mut errors);
        let price = read_price(data, &mut errors);
        let featured = optional_bool(data, "featured", false, &mut errors);

        match (form.title, price) {
            (Some(title), Some(price)) if errors.is_empty() => Ok(Self {
                title,
                description,
                price,
                featured,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}
