// zeno-embed - Type conversion traits
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! Type conversion between Rust and script values.
//!
//! This module provides the [`IntoNative`] and [`FromNative`] traits
//! for converting between Rust types and [`Native`].
//!
//! # Built-in Conversions
//!
//! | Rust Type | Script Type |
//! |-----------|-------------|
//! | `()` | `nil` |
//! | `bool` | `bool` |
//! | `i32`, `i64`, `usize` | `number` |
//! | `f32`, `f64` | `number` |
//! | `String`, `&str` | `string` |
//! | `Option<T>` | `T` or `nil` |
//!
//! Numbers are stored as 64-bit floats, so integer conversions check
//! that the value survives the trip exactly.

use zeno_core::{Error, Native, Result};

/// Convert a Rust type into a script value.
pub trait IntoNative {
    fn into_native(self) -> Native;
}

/// Convert a script value into a Rust type.
pub trait FromNative: Sized {
    fn from_native(value: &Native) -> Result<Self>;
}

// ============================================================================
// IntoNative implementations
// ============================================================================

impl IntoNative for Native {
    fn into_native(self) -> Native {
        self
    }
}

impl IntoNative for () {
    fn into_native(self) -> Native {
        Native::Nil
    }
}

impl IntoNative for bool {
    fn into_native(self) -> Native {
        Native::Bool(self)
    }
}

impl IntoNative for i32 {
    fn into_native(self) -> Native {
        Native::Num(self as f64)
    }
}

impl IntoNative for i64 {
    fn into_native(self) -> Native {
        Native::Num(self as f64)
    }
}

impl IntoNative for usize {
    fn into_native(self) -> Native {
        Native::Num(self as f64)
    }
}

impl IntoNative for f32 {
    fn into_native(self) -> Native {
        Native::Num(self as f64)
    }
}

impl IntoNative for f64 {
    fn into_native(self) -> Native {
        Native::Num(self)
    }
}

impl IntoNative for &str {
    fn into_native(self) -> Native {
        Native::str(self)
    }
}

impl IntoNative for String {
    fn into_native(self) -> Native {
        Native::from(self)
    }
}

impl<T: IntoNative> IntoNative for Option<T> {
    fn into_native(self) -> Native {
        match self {
            Some(v) => v.into_native(),
            None => Native::Nil,
        }
    }
}

// ============================================================================
// FromNative implementations
// ============================================================================

impl FromNative for Native {
    fn from_native(value: &Native) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromNative for () {
    fn from_native(value: &Native) -> Result<Self> {
        match value {
            Native::Nil => Ok(()),
            other => Err(Error::type_error("nil", other.type_name())),
        }
    }
}

impl FromNative for bool {
    fn from_native(value: &Native) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| Error::type_error("bool", value.type_name()))
    }
}

impl FromNative for f64 {
    fn from_native(value: &Native) -> Result<Self> {
        value
            .as_num()
            .ok_or_else(|| Error::type_error("number", value.type_name()))
    }
}

impl FromNative for f32 {
    fn from_native(value: &Native) -> Result<Self> {
        let n = f64::from_native(value)?;
        let narrowed = n as f32;
        if n.is_finite() && !narrowed.is_finite() {
            return Err(Error::type_error("f32-range number", "out-of-range number"));
        }
        Ok(narrowed)
    }
}

impl FromNative for i64 {
    fn from_native(value: &Native) -> Result<Self> {
        let n = f64::from_native(value)?;
        if n.fract() != 0.0 || n < i64::MIN as f64 || n > i64::MAX as f64 {
            return Err(Error::type_error("integer", "fractional or out-of-range number"));
        }
        Ok(n as i64)
    }
}

impl FromNative for i32 {
    fn from_native(value: &Native) -> Result<Self> {
        let n = i64::from_native(value)?;
        i32::try_from(n).map_err(|_| Error::type_error("i32-range integer", "out-of-range number"))
    }
}

impl FromNative for usize {
    fn from_native(value: &Native) -> Result<Self> {
        let n = i64::from_native(value)?;
        usize::try_from(n).map_err(|_| Error::type_error("non-negative integer", "negative number"))
    }
}

impl FromNative for String {
    fn from_native(value: &Native) -> Result<Self> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| Error::type_error("string", value.type_name()))
    }
}

impl<T: FromNative> FromNative for Option<T> {
    fn from_native(value: &Native) -> Result<Self> {
        match value {
            Native::Nil => Ok(None),
            other => T::from_native(other).map(Some),
        }
    }
}
