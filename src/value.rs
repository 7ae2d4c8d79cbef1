//! Typed value cells bound to caller-owned storage.
//!
//! A [`Value`] is what an [`Opt`](crate::Opt) writes into. The common case is
//! [`bind`], which wraps a `&mut T` for any `T: FlagValue`:
//!
//! ```ignore
//! let mut port: u16 = 0;
//! let mut set = OptionSet::new();
//! set.add(Opt::new(bind(&mut port)).short('p').long("port").default("80"))?;
//! ```
//!
//! Every cell is transactional: text is parsed into a temporary first and the
//! destination is only overwritten once parsing succeeded.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::duration;
use crate::error::ValueError;

/// A single typed setting that can be parsed from and rendered to text.
pub trait Value: fmt::Display {
    /// Parse `text` and store it. On error the stored value is unchanged.
    fn set(&mut self, text: &str) -> Result<(), ValueError>;

    /// Whether a flag bound to this value needs an argument.
    ///
    /// Boolean cells return `false`: their argument is optional and
    /// defaults to `true`.
    fn takes_value(&self) -> bool {
        true
    }
}

impl<V: Value + ?Sized> Value for &mut V {
    fn set(&mut self, text: &str) -> Result<(), ValueError> {
        (**self).set(text)
    }

    fn takes_value(&self) -> bool {
        (**self).takes_value()
    }
}

/// Types that know their own text grammar.
pub trait FlagValue: Sized {
    /// Name used in error messages.
    const EXPECTED: &'static str;

    /// See [`Value::takes_value`].
    const TAKES_VALUE: bool = true;

    fn parse_flag(text: &str) -> Result<Self, ValueError>;

    fn format_flag(&self) -> String;
}

/// A [`Value`] writing through to borrowed storage.
pub struct Bound<'a, T> {
    dest: &'a mut T,
}

/// Bind a destination so it can be registered as an option's value.
pub fn bind<T: FlagValue>(dest: &mut T) -> Bound<'_, T> {
    Bound { dest }
}

impl<T: FlagValue> Value for Bound<'_, T> {
    fn set(&mut self, text: &str) -> Result<(), ValueError> {
        *self.dest = T::parse_flag(text)?;
        Ok(())
    }

    fn takes_value(&self) -> bool {
        T::TAKES_VALUE
    }
}

impl<T: FlagValue> fmt::Display for Bound<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dest.format_flag())
    }
}

impl FlagValue for bool {
    const EXPECTED: &'static str = "bool";
    const TAKES_VALUE: bool = false;

    fn parse_flag(text: &str) -> Result<Self, ValueError> {
        parse_bool(text)
    }

    fn format_flag(&self) -> String {
        self.to_string()
    }
}

/// Accepts `1`, `t`, `T`, `true`, `TRUE`, `True` and their false counterparts.
pub(crate) fn parse_bool(text: &str) -> Result<bool, ValueError> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(ValueError::new("bool", text)),
    }
}

/// Split an integer literal into sign, radix and digits.
///
/// Accepts decimal and `0x`/`0o`/`0b` prefixed forms, with `_` allowed
/// between digits.
fn split_int(text: &str) -> Option<(bool, u32, String)> {
    let (negative, body) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = match body.get(..2) {
        Some("0x" | "0X") => (16, &body[2..]),
        Some("0o" | "0O") => (8, &body[2..]),
        Some("0b" | "0B") => (2, &body[2..]),
        _ => (10, body),
    };
    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return None;
    }
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    // from_str_radix tolerates a sign of its own; the sign was already taken.
    if cleaned.starts_with(['+', '-']) {
        return None;
    }
    Some((negative, radix, cleaned))
}

macro_rules! signed_flag_value {
    ($($ty:ty),*) => {$(
        impl FlagValue for $ty {
            const EXPECTED: &'static str = stringify!($ty);

            fn parse_flag(text: &str) -> Result<Self, ValueError> {
                let err = || ValueError::new(Self::EXPECTED, text);
                let (negative, radix, digits) = split_int(text).ok_or_else(err)?;
                let signed = if negative { format!("-{digits}") } else { digits };
                <$ty>::from_str_radix(&signed, radix).map_err(|e| err().with_detail(e))
            }

            fn format_flag(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

macro_rules! unsigned_flag_value {
    ($($ty:ty),*) => {$(
        impl FlagValue for $ty {
            const EXPECTED: &'static str = stringify!($ty);

            fn parse_flag(text: &str) -> Result<Self, ValueError> {
                let err = || ValueError::new(Self::EXPECTED, text);
                let (negative, radix, digits) = split_int(text).ok_or_else(err)?;
                if negative && digits.chars().any(|c| c != '0') {
                    return Err(err().with_detail("negative value"));
                }
                <$ty>::from_str_radix(&digits, radix).map_err(|e| err().with_detail(e))
            }

            fn format_flag(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

signed_flag_value!(i8, i16, i32, i64, isize);
unsigned_flag_value!(u8, u16, u32, u64, usize);

macro_rules! float_flag_value {
    ($($ty:ty),*) => {$(
        impl FlagValue for $ty {
            const EXPECTED: &'static str = stringify!($ty);

            fn parse_flag(text: &str) -> Result<Self, ValueError> {
                text.parse::<$ty>()
                    .map_err(|e| ValueError::new(Self::EXPECTED, text).with_detail(e))
            }

            fn format_flag(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

float_flag_value!(f32, f64);

impl FlagValue for String {
    const EXPECTED: &'static str = "string";

    fn parse_flag(text: &str) -> Result<Self, ValueError> {
        Ok(text.to_string())
    }

    fn format_flag(&self) -> String {
        self.clone()
    }
}

impl FlagValue for Duration {
    const EXPECTED: &'static str = "duration";

    fn parse_flag(text: &str) -> Result<Self, ValueError> {
        duration::parse_duration(text)
    }

    fn format_flag(&self) -> String {
        duration::format_duration(*self)
    }
}

impl FlagValue for Url {
    const EXPECTED: &'static str = "url";

    fn parse_flag(text: &str) -> Result<Self, ValueError> {
        Url::parse(text).map_err(|e| ValueError::new(Self::EXPECTED, text).with_detail(e))
    }

    fn format_flag(&self) -> String {
        self.as_str().to_string()
    }
}

/// For destinations without a natural zero value. Renders as empty text
/// while unset.
impl<T: FlagValue> FlagValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;
    const TAKES_VALUE: bool = T::TAKES_VALUE;

    fn parse_flag(text: &str) -> Result<Self, ValueError> {
        T::parse_flag(text).map(Some)
    }

    fn format_flag(&self) -> String {
        self.as_ref().map(T::format_flag).unwrap_or_default()
    }
}
