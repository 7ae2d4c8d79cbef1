/// Storage kind of a decoded field.
///
/// Integer kinds are widened to 64 bits while flags are parsed; narrowing to
/// the field's real type (and the range check that goes with it) happens
/// when the struct is deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    Str,
    /// A compound duration such as `1h30m`, decoded into `std::time::Duration`.
    Duration,
    /// An absolute URL, decoded into `url::Url`.
    Url,
}

/// Result of decoding: the typed config plus the arguments that were not flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<C> {
    pub config: C,
    pub positionals: Vec<String>,
}
