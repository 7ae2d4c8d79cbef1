//! A single named, typed option and its resolution chain.

use std::cmp::Ordering;
use std::fmt;

use tracing::debug;

use crate::env::Environment;
use crate::error::{FlenvError, ValueError};
use crate::value::Value;

/// Identity of an option: its short and long names together.
///
/// Displays as `-p, --port`, `--port` or `-p`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionKey {
    short: Option<char>,
    long: Option<String>,
}

impl OptionKey {
    pub fn short(&self) -> Option<char> {
        self.short
    }

    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    /// Text used for ordering, e.g. `p,port`.
    fn label(&self) -> String {
        match (self.short, &self.long) {
            (Some(s), Some(l)) => format!("{s},{l}"),
            (Some(s), None) => s.to_string(),
            (None, Some(l)) => l.clone(),
            (None, None) => String::new(),
        }
    }
}

impl Ord for OptionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label()
            .cmp(&other.label())
            .then_with(|| (self.short, &self.long).cmp(&(other.short, &other.long)))
    }
}

impl PartialOrd for OptionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.short, &self.long) {
            (Some(s), Some(l)) => write!(f, "-{s}, --{l}"),
            (Some(s), None) => write!(f, "-{s}"),
            (None, Some(l)) => write!(f, "--{l}"),
            (None, None) => Ok(()),
        }
    }
}

/// One named, typed setting.
///
/// Built fluently and handed to [`OptionSet::add`](crate::OptionSet::add):
///
/// ```ignore
/// Opt::new(bind(&mut port))
///     .short('p')
///     .long("port")
///     .default("80")
///     .env("PORT")
///     .help("Port to bind on")
/// ```
pub struct Opt<'a> {
    value: Box<dyn Value + 'a>,
    short: Option<char>,
    long: Option<String>,
    default: String,
    env: Option<String>,
    help: String,
    required: bool,
}

impl<'a> Opt<'a> {
    pub fn new(value: impl Value + 'a) -> Self {
        Self {
            value: Box::new(value),
            short: None,
            long: None,
            default: String::new(),
            env: None,
            help: String::new(),
            required: false,
        }
    }

    pub fn short(mut self, name: char) -> Self {
        self.short = Some(name);
        self
    }

    /// Set the long name. An empty name means "no long name".
    pub fn long(mut self, name: &str) -> Self {
        self.long = (!name.is_empty()).then(|| name.to_string());
        self
    }

    /// Raw default text, parsed only when no other source supplies a value.
    pub fn default(mut self, text: &str) -> Self {
        self.default = text.to_string();
        self
    }

    /// Environment variable consulted before the default. An empty name means none.
    pub fn env(mut self, name: &str) -> Self {
        self.env = (!name.is_empty()).then(|| name.to_string());
        self
    }

    pub fn help(mut self, text: &str) -> Self {
        self.help = text.to_string();
        self
    }

    /// Fail resolution when no source yields any text.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn key(&self) -> OptionKey {
        OptionKey {
            short: self.short,
            long: self.long.clone(),
        }
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub(crate) fn takes_value(&self) -> bool {
        self.value.takes_value()
    }

    /// Current value, rendered as text.
    pub(crate) fn current(&self) -> String {
        self.value.to_string()
    }

    /// Parse `text` straight into the value, bypassing the fallback chain.
    pub(crate) fn try_assign(&mut self, text: &str) -> Result<(), ValueError> {
        self.value.set(text)
    }

    /// Resolve the effective text (explicit > environment > default) and
    /// store it.
    ///
    /// When no source yields any text the value is left as it is, unless the
    /// option is required.
    pub(crate) fn resolve(&mut self, explicit: &str, env: &Environment) -> Result<(), FlenvError> {
        let key = self.key();
        let (text, source) = if !explicit.is_empty() {
            (explicit.to_string(), "argument")
        } else if let Some(found) = self.env.as_deref().and_then(|name| env.lookup(name)) {
            (found, "environment")
        } else {
            (self.default.clone(), "default")
        };

        if text.is_empty() {
            if self.required {
                return Err(FlenvError::MissingRequired {
                    key: key.to_string(),
                });
            }
            debug!(option = %key, "no value from any source, leaving as is");
            return Ok(());
        }

        debug!(option = %key, source, "resolved option");
        self.value
            .set(&text)
            .map_err(|source| FlenvError::InvalidValue {
                key: key.to_string(),
                source,
            })
    }
}

impl fmt::Debug for Opt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opt")
            .field("key", &self.key())
            .field("value", &self.value.to_string())
            .field("default", &self.default)
            .field("env", &self.env)
            .field("required", &self.required)
            .finish()
    }
}
