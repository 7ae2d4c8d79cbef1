use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::duration;
use crate::env::Environment;
use crate::error::{FlenvError, ValueError};
use crate::help;
use crate::option::Opt;
use crate::option_set::OptionSet;
use crate::shape;
use crate::table;
use crate::types::{Decoded, Kind};
use crate::value::{FlagValue, Value};

/// Entry point for decoding a config struct from flags and the environment.
pub struct Flenv;

impl Flenv {
    pub fn builder<C: DeserializeOwned>() -> FlenvBuilder<C> {
        FlenvBuilder::new()
    }
}

/// Description of one config field: where its value may come from and how
/// it is spelled on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    kind: Kind,
    env: Option<String>,
    short: Option<char>,
    long: Option<String>,
    default: String,
    help: String,
    required: bool,
}

impl Field {
    /// `name` is the struct field to fill. Dotted names (`database.url`)
    /// address fields of nested structs.
    pub fn new(name: &str, kind: Kind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            env: None,
            short: None,
            long: None,
            default: String::new(),
            help: String::new(),
            required: false,
        }
    }

    pub fn env(mut self, name: &str) -> Self {
        self.env = (!name.is_empty()).then(|| name.to_string());
        self
    }

    /// Flag spellings, comma separated, e.g. `"-p,--port"`.
    ///
    /// Leading dashes are optional. A one-character spelling is the short
    /// name, anything longer the long name.
    pub fn flag(mut self, spellings: &str) -> Self {
        for name in spellings
            .split(',')
            .map(|bit| bit.trim().trim_start_matches('-'))
            .filter(|name| !name.is_empty())
        {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => self.short = Some(c),
                _ => self.long = Some(name.to_string()),
            }
        }
        self
    }

    pub fn default(mut self, text: &str) -> Self {
        self.default = text.to_string();
        self
    }

    pub fn help(mut self, text: &str) -> Self {
        self.help = text.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn has_flag(&self) -> bool {
        self.short.is_some() || self.long.is_some()
    }
}

/// Owned storage for one field while flags are parsed.
#[derive(Debug)]
enum Slot {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Duration(Duration),
    Url(Option<Url>),
}

#[derive(Debug)]
struct FieldCell {
    slot: Slot,
    populated: bool,
}

impl FieldCell {
    fn new(kind: Kind) -> Self {
        let slot = match kind {
            Kind::Bool => Slot::Bool(false),
            Kind::Int => Slot::Int(0),
            Kind::Uint => Slot::Uint(0),
            Kind::Float => Slot::Float(0.0),
            Kind::Str => Slot::Str(String::new()),
            Kind::Duration => Slot::Duration(Duration::ZERO),
            Kind::Url => Slot::Url(None),
        };
        Self {
            slot,
            populated: false,
        }
    }

    /// An absent switch means `false`, so flagged booleans start populated.
    fn for_field(field: &Field) -> Self {
        let mut cell = Self::new(field.kind);
        cell.populated = field.kind == Kind::Bool && field.has_flag();
        cell
    }

    /// Current text, or empty when nothing has been stored yet.
    fn text(&self) -> String {
        if self.populated {
            self.to_string()
        } else {
            String::new()
        }
    }

    fn to_toml(&self, name: &str) -> Result<Option<toml::Value>, FlenvError> {
        if !self.populated {
            return Ok(None);
        }
        let value = match &self.slot {
            Slot::Bool(b) => toml::Value::Boolean(*b),
            Slot::Int(i) => toml::Value::Integer(*i),
            Slot::Uint(u) => {
                let i = i64::try_from(*u).map_err(|_| FlenvError::Decode {
                    reason: format!("'{name}' is too large: {u}"),
                })?;
                toml::Value::Integer(i)
            }
            Slot::Float(f) => toml::Value::Float(*f),
            Slot::Str(s) => toml::Value::String(s.clone()),
            // The shape serde uses for `std::time::Duration`.
            Slot::Duration(d) => {
                let mut table = toml::Table::new();
                table.insert("secs".into(), toml::Value::Integer(d.as_secs() as i64));
                table.insert("nanos".into(), toml::Value::Integer(i64::from(d.subsec_nanos())));
                toml::Value::Table(table)
            }
            Slot::Url(Some(url)) => toml::Value::String(url.as_str().to_string()),
            Slot::Url(None) => return Ok(None),
        };
        Ok(Some(value))
    }
}

impl Value for FieldCell {
    fn set(&mut self, text: &str) -> Result<(), ValueError> {
        match &mut self.slot {
            Slot::Bool(b) => *b = bool::parse_flag(text)?,
            Slot::Int(i) => *i = i64::parse_flag(text)?,
            Slot::Uint(u) => *u = u64::parse_flag(text)?,
            Slot::Float(f) => *f = f64::parse_flag(text)?,
            Slot::Str(s) => *s = String::parse_flag(text)?,
            Slot::Duration(d) => *d = Duration::parse_flag(text)?,
            Slot::Url(u) => *u = Some(Url::parse_flag(text)?),
        }
        self.populated = true;
        Ok(())
    }

    fn takes_value(&self) -> bool {
        !matches!(self.slot, Slot::Bool(_))
    }
}

impl fmt::Display for FieldCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Slot::Bool(b) => write!(f, "{b}"),
            Slot::Int(i) => write!(f, "{i}"),
            Slot::Uint(u) => write!(f, "{u}"),
            Slot::Float(x) => write!(f, "{x}"),
            Slot::Str(s) => f.write_str(s),
            Slot::Duration(d) => f.write_str(&duration::format_duration(*d)),
            Slot::Url(u) => f.write_str(u.as_ref().map(Url::as_str).unwrap_or("")),
        }
    }
}

/// Builder describing a config struct field by field.
///
/// Each field is first filled from its environment variable, then its
/// default. Fields with a flag spelling can then be overridden on the
/// command line.
///
/// ```ignore
/// let decoded = Flenv::builder::<ServerConfig>()
///     .field(Field::new("host", Kind::Str).env("HOST").flag("-h,--host").default("localhost"))
///     .field(Field::new("port", Kind::Uint).env("PORT").flag("-p,--port").default("80"))
///     .decode()?;
/// ```
pub struct FlenvBuilder<C> {
    fields: Vec<Field>,
    env: Environment,
    help_width: usize,
    _phantom: PhantomData<C>,
}

impl<C: DeserializeOwned> FlenvBuilder<C> {
    fn new() -> Self {
        Self {
            fields: Vec::new(),
            env: Environment::Process,
            help_width: help::DEFAULT_WIDTH,
            _phantom: PhantomData,
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Read environment variables from `env` instead of the process.
    pub fn env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    /// Total width of [`usage`](Self::usage) text (default 80).
    pub fn help_width(mut self, width: usize) -> Self {
        self.help_width = width;
        self
    }

    /// Decode from the process arguments (program name excluded).
    pub fn decode(self) -> Result<Decoded<C>, FlenvError> {
        self.decode_from(std::env::args().skip(1))
    }

    /// Decode from an explicit argument vector.
    pub fn decode_from<I, S>(self, args: I) -> Result<Decoded<C>, FlenvError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !shape::is_struct_like::<C>() {
            return Err(FlenvError::NotAStruct {
                type_name: std::any::type_name::<C>(),
            });
        }

        let mut cells: Vec<FieldCell> = self.fields.iter().map(FieldCell::for_field).collect();
        for (field, cell) in self.fields.iter().zip(cells.iter_mut()) {
            let text = match field.env.as_deref().and_then(|name| self.env.lookup(name)) {
                Some(found) => {
                    debug!(field = %field.name, "populated from environment");
                    found
                }
                None => field.default.clone(),
            };
            if !text.is_empty() {
                cell.set(&text).map_err(|source| FlenvError::InvalidValue {
                    key: field.name.clone(),
                    source,
                })?;
            }
        }

        let positionals = {
            let mut set = self.option_set(&mut cells)?;
            set.parse(args)?;
            set.positionals().to_vec()
        };

        let mut entries = Vec::new();
        for (field, cell) in self.fields.iter().zip(&cells) {
            if field.required && !cell.populated {
                return Err(FlenvError::MissingRequired {
                    key: field.name.clone(),
                });
            }
            if let Some(value) = cell.to_toml(&field.name)? {
                entries.push((field.name.clone(), value));
            }
        }

        let table = table::entries_to_table(entries)?;
        let config: C = toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| FlenvError::Decode {
                reason: e.to_string(),
            })?;
        Ok(Decoded {
            config,
            positionals,
        })
    }

    /// Usage text for the fields that have flag spellings.
    pub fn usage(&self) -> Result<String, FlenvError> {
        let mut cells: Vec<FieldCell> = self.fields.iter().map(FieldCell::for_field).collect();
        let set = self.option_set(&mut cells)?;
        Ok(set.usage_with_width(self.help_width))
    }

    /// Register an option for every flagged field, bound to its cell. The
    /// option's default is whatever the field already holds.
    fn option_set<'c>(&self, cells: &'c mut [FieldCell]) -> Result<OptionSet<'c>, FlenvError> {
        let mut set = OptionSet::with_env(self.env.clone());
        for (field, cell) in self.fields.iter().zip(cells.iter_mut()) {
            if !field.has_flag() {
                continue;
            }
            let default = cell.text();
            let mut opt = Opt::new(cell).default(&default).help(&field.help);
            if let Some(short) = field.short {
                opt = opt.short(short);
            }
            if let Some(long) = &field.long {
                opt = opt.long(long);
            }
            if field.required {
                opt = opt.required();
            }
            set.add(opt)?;
        }
        Ok(set)
    }
}
