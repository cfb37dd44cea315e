//! Input validation. Failures carry the offending field so the error body
//! can include field-level detail.

use taskdeck_db::StoreError;

pub(crate) fn email(value: &str) -> Result<(), StoreError> {
    let valid = match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::Validation {
            field: "email",
            message: "invalid email address",
        })
    }
}

pub(crate) fn password(value: &str) -> Result<(), StoreError> {
    if value.len() < 6 {
        return Err(StoreError::Validation {
            field: "password",
            message: "password must be at least 6 characters",
        });
    }
    Ok(())
}

pub(crate) fn non_empty(field: &'static str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation {
            field,
            message: "must not be empty",
        });
    }
    Ok(())
}

/// `#RRGGBB`
pub(crate) fn color(value: &str) -> Result<(), StoreError> {
    let ok = value.len() == 7
        && value.starts_with('#')
        && value[1..].bytes().all(|b| b.is_ascii_hexdigit());
    if ok {
        Ok(())
    } else {
        Err(StoreError::Validation {
            field: "color",
            message: "color must be a hex value like #3b82f6",
        })
    }
}

pub(crate) fn sort_order(value: i64) -> Result<(), StoreError> {
    if value < 0 {
        return Err(StoreError::Validation {
            field: "order",
            message: "order must be non-negative",
        });
    }
    Ok(())
}
