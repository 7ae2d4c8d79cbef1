//! Typed configuration from command-line flags, environment variables and
//! compiled-in defaults.
//!
//! Flenv has two layers. The core is a small option parser: register typed
//! options on an [`OptionSet`], hand it an argument vector, and every option
//! ends up resolved from the first source that has something to say:
//!
//! ```text
//! Default text          Opt::default("80")
//!        ↑ overridden by
//! Environment variable  Opt::env("PORT")
//!        ↑ overridden by
//! Command line          -p 9090, --port 9090, --port=9090
//! ```
//!
//! ```ignore
//! let mut port: u16 = 0;
//! let mut verbose = false;
//!
//! let mut set = OptionSet::new();
//! set.add(Opt::new(bind(&mut port)).short('p').long("port").default("80").env("PORT"))?;
//! set.add(Opt::new(bind(&mut verbose)).short('v').long("verbose"))?;
//! set.parse(std::env::args().skip(1))?;
//! let files = set.positionals().to_vec();
//! ```
//!
//! On top of it, [`Flenv::builder()`] decodes a whole `serde::Deserialize`
//! struct from a list of [`Field`] descriptions, each naming an environment
//! variable, a default, and optionally the flags that may override it.
//!
//! # Command-line grammar
//!
//! - `-x` is a short flag, `--name` and `--name=value` are long flags.
//! - Flags that take a value read it from `=value` or the next token, even if
//!   that token starts with a dash.
//! - Boolean flags take an optional value: `-v`, `-v true` and `--verbose=0`
//!   all work. A token after a boolean flag that does not parse as a boolean
//!   is left alone, so `-v file.txt` keeps `file.txt` as a positional.
//! - `--` ends flag processing. Everything after it is positional.
//! - Anything else (including `-` on its own) is positional.
//!
//! Booleans accept `1`, `t`, `T`, `true`, `TRUE`, `True` and the matching
//! false spellings. Integers accept decimal and `0x`/`0o`/`0b` literals.
//! Durations use the compound form `1h30m`, `500ms`, `2.5s`.
//!
//! # Values are transactional
//!
//! A value that fails to parse leaves its destination exactly as it was.
//! An option that gets no text from any source (and is not required) is not
//! touched either, so a destination can carry its own default.
//!
//! # Testing without the process environment
//!
//! Environment lookups go through [`Environment`]. Pass
//! [`Environment::from_pairs`] to [`OptionSet::with_env`] or
//! [`FlenvBuilder::env`] to test precedence without mutating real variables.
//!
//! # Error handling
//!
//! All fallible operations return [`FlenvError`]. Parsing stops at the first
//! error; values assigned before it are kept. The caller decides whether to
//! print [`OptionSet::usage`] and exit.

pub mod duration;
pub mod error;
pub mod types;
pub mod value;

mod builder;
mod env;
mod help;
mod option;
mod option_set;
mod shape;
mod table;

#[cfg(test)]
mod fixtures;

pub use builder::{Field, Flenv, FlenvBuilder};
pub use env::Environment;
pub use error::{FlenvError, ValueError};
pub use help::fill_text;
pub use option::{Opt, OptionKey};
pub use option_set::OptionSet;
pub use types::{Decoded, Kind};
pub use value::{Bound, FlagValue, Value, bind};
