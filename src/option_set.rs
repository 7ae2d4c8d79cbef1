//! The option registry and the argv parser.
//!
//! Parsing is a single left-to-right pass over the argument vector:
//!
//! 1. Tokens that are empty, a lone `-`, or do not start with `-` are
//!    positional.
//! 2. `--` ends flag processing; everything after it is positional.
//! 3. `-x` is a short flag, `--name` / `--name=value` a long flag.
//! 4. Non-boolean flags take their value from `=value` or the next token.
//!    Boolean flags only consume the next token if it parses as a boolean,
//!    otherwise they are implicitly `true`.
//!
//! Once the vector is exhausted, every option that was not given on the
//! command line is resolved from its environment variable or default.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use tracing::{debug, trace};

use crate::env::Environment;
use crate::error::FlenvError;
use crate::help;
use crate::option::{Opt, OptionKey};

/// Registry of options, indexed by short name, long name and [`OptionKey`].
#[derive(Debug, Default)]
pub struct OptionSet<'a> {
    short: HashMap<char, OptionKey>,
    long: HashMap<String, OptionKey>,
    params: BTreeMap<OptionKey, Opt<'a>>,
    provided: HashSet<OptionKey>,
    positionals: Vec<String>,
    env: Environment,
}

enum Token {
    Positional,
    Terminator,
    Short(char),
    Long { name: String, value: Option<String> },
    Malformed,
}

fn classify(token: &str) -> Token {
    if token == "--" {
        return Token::Terminator;
    }
    let Some(body) = token.strip_prefix('-') else {
        return Token::Positional;
    };
    let mut chars = body.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Token::Positional,
        (Some('-'), Some(_)) => {
            let long = &body[1..];
            match long.split_once('=') {
                Some(("", _)) => Token::Malformed,
                Some((name, value)) => Token::Long {
                    name: name.to_string(),
                    value: Some(value.to_string()),
                },
                None => Token::Long {
                    name: long.to_string(),
                    value: None,
                },
            }
        }
        (Some(c), None) => Token::Short(c),
        // `-abc`: not a flag shape we recognize, kept as an argument.
        (Some(_), Some(_)) => Token::Positional,
    }
}

impl<'a> OptionSet<'a> {
    /// An empty set reading the process environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty set reading environment variables from `env`.
    pub fn with_env(env: Environment) -> Self {
        Self {
            env,
            ..Self::default()
        }
    }

    /// Register an option.
    ///
    /// Fails if the option has no name, a name that cannot be spelled on a
    /// command line, or a short or long name that is already taken.
    pub fn add(&mut self, opt: Opt<'a>) -> Result<(), FlenvError> {
        let key = opt.key();
        if key.short().is_none() && key.long().is_none() {
            return Err(FlenvError::UnnamedOption);
        }

        if let Some(short) = key.short() {
            if short == '-' || short == '=' || short.is_whitespace() {
                return Err(FlenvError::InvalidName {
                    name: short.to_string(),
                });
            }
            if self.short.contains_key(&short) {
                return Err(FlenvError::DuplicateOption {
                    name: format!("-{short}"),
                });
            }
        }
        if let Some(long) = key.long() {
            if long.chars().count() < 2
                || long.starts_with('-')
                || long.contains('=')
                || long.chars().any(char::is_whitespace)
            {
                return Err(FlenvError::InvalidName {
                    name: long.to_string(),
                });
            }
            if self.long.contains_key(long) {
                return Err(FlenvError::DuplicateOption {
                    name: format!("--{long}"),
                });
            }
        }

        if let Some(short) = key.short() {
            self.short.insert(short, key.clone());
        }
        if let Some(long) = key.long() {
            self.long.insert(long.to_string(), key.clone());
        }
        debug!(option = %key, "registered option");
        self.params.insert(key, opt);
        Ok(())
    }

    /// Parse an argument vector (without the program name).
    ///
    /// Positionals and "provided" markers from a previous call are
    /// discarded. The first error aborts parsing; values already assigned
    /// are kept.
    pub fn parse<I, S>(&mut self, args: I) -> Result<(), FlenvError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.positionals.clear();
        self.provided.clear();

        let mut args: VecDeque<String> = args.into_iter().map(Into::into).collect();
        while let Some(token) = args.pop_front() {
            match classify(&token) {
                Token::Positional => {
                    trace!(%token, "positional argument");
                    self.positionals.push(token);
                }
                Token::Terminator => {
                    trace!(remaining = args.len(), "flag terminator");
                    self.positionals.extend(args.drain(..));
                }
                Token::Short(name) => {
                    let key = self.short.get(&name).cloned();
                    let key = key.ok_or(FlenvError::UnknownFlag { flag: token.clone() })?;
                    self.consume(key, &token, None, &mut args)?;
                }
                Token::Long { name, value } => {
                    let key = self.long.get(&name).cloned();
                    let key = key.ok_or(FlenvError::UnknownFlag {
                        flag: format!("--{name}"),
                    })?;
                    self.consume(key, &token, value, &mut args)?;
                }
                Token::Malformed => return Err(FlenvError::MalformedFlag { token }),
            }
        }

        for (key, opt) in self.params.iter_mut() {
            if !self.provided.contains(key) {
                opt.resolve("", &self.env)?;
            }
        }
        Ok(())
    }

    /// Assign the value of a matched flag, pulling its argument from
    /// `inline` (`--name=value`) or the front of `args`.
    fn consume(
        &mut self,
        key: OptionKey,
        token: &str,
        inline: Option<String>,
        args: &mut VecDeque<String>,
    ) -> Result<(), FlenvError> {
        let Some(opt) = self.params.get_mut(&key) else {
            return Err(FlenvError::UnknownFlag {
                flag: token.to_string(),
            });
        };

        if opt.takes_value() {
            let text = match inline {
                Some(text) => text,
                None => args.pop_front().ok_or_else(|| FlenvError::MissingValue {
                    flag: token.to_string(),
                })?,
            };
            debug!(option = %key, "flag with value");
            opt.resolve(&text, &self.env)?;
        } else {
            // The argument of a boolean flag is optional: keep it only if it
            // parses, otherwise the flag just means `true`.
            let accepted = match inline {
                Some(text) => opt.try_assign(&text).is_ok(),
                None => {
                    let takes_next = args.front().is_some_and(|next| opt.try_assign(next).is_ok());
                    if takes_next {
                        args.pop_front();
                    }
                    takes_next
                }
            };
            if !accepted {
                opt.resolve("true", &self.env)?;
            }
            debug!(option = %key, accepted, "boolean flag");
        }

        self.provided.insert(key);
        Ok(())
    }

    /// Set an option by short (one character) or long name and mark it as
    /// provided, as if it had been given on the command line.
    pub fn set(&mut self, name: &str, text: &str) -> Result<(), FlenvError> {
        let key = self.lookup(name).cloned().ok_or_else(|| FlenvError::UnknownFlag {
            flag: name.to_string(),
        })?;
        if let Some(opt) = self.params.get_mut(&key) {
            opt.resolve(text, &self.env)?;
        }
        self.provided.insert(key);
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<&OptionKey> {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.short.get(&c),
            _ => self.long.get(name),
        }
    }

    /// Arguments that were not flags or flag values, in order.
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// Whether the named option was given explicitly during the last parse.
    pub fn was_provided(&self, name: &str) -> bool {
        self.lookup(name)
            .is_some_and(|key| self.provided.contains(key))
    }

    /// Current value of the named option, rendered as text.
    pub fn get(&self, name: &str) -> Option<String> {
        self.lookup(name)
            .and_then(|key| self.params.get(key))
            .map(Opt::current)
    }

    /// Every option with its current value, ordered by key.
    pub fn listing(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(key, opt)| (key.to_string(), opt.current()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Usage text at the default width of 80 columns.
    pub fn usage(&self) -> String {
        self.usage_with_width(help::DEFAULT_WIDTH)
    }

    /// Usage text wrapped to `width` columns.
    pub fn usage_with_width(&self, width: usize) -> String {
        help::render(
            self.params.iter().map(|(key, opt)| (key, opt.help_text())),
            width,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::bind;

    #[test]
    fn happy_path_with_defaults() {
        let mut secure = false;
        let mut port = 0i32;
        let mut host = String::new();
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(
            Opt::new(bind(&mut secure))
                .short('s')
                .long("secure")
                .default("false")
                .env("SECURE"),
        )
        .unwrap();
        set.add(Opt::new(bind(&mut port)).short('p').long("port").default("80").env("PORT"))
            .unwrap();
        set.add(Opt::new(bind(&mut host)).short('h').long("host").env("HOST"))
            .unwrap();

        set.parse(["-s"]).unwrap();
        assert!(set.was_provided("secure"));
        assert!(!set.was_provided("p"));
        drop(set);

        assert!(secure);
        assert_eq!(port, 80);
        assert_eq!(host, "");
    }

    #[test]
    fn short_and_long_boolean_flags() {
        for args in [vec!["-s"], vec!["--secure"], vec!["-s", "true"], vec!["--secure=true"]] {
            let mut secure = false;
            let mut set = OptionSet::with_env(Environment::empty());
            set.add(Opt::new(bind(&mut secure)).short('s').long("secure").default("false"))
                .unwrap();
            set.parse(args.clone()).unwrap();
            assert!(set.positionals().is_empty(), "{args:?}");
            drop(set);
            assert!(secure, "{args:?}");
        }
    }

    #[test]
    fn boolean_flag_accepts_explicit_false() {
        let mut secure = true;
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(Opt::new(bind(&mut secure)).short('s')).unwrap();
        set.parse(["-s", "false", "rest"]).unwrap();
        assert_eq!(set.positionals(), ["rest"]);
        drop(set);
        assert!(!secure);
    }

    #[test]
    fn boolean_flag_leaves_non_boolean_token() {
        let mut secure = false;
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(Opt::new(bind(&mut secure)).short('s')).unwrap();
        set.parse(["foo", "-s", "bar"]).unwrap();
        assert_eq!(set.positionals(), ["foo", "bar"]);
        drop(set);
        assert!(secure);
    }

    #[test]
    fn boolean_inline_garbage_means_true() {
        let mut secure = false;
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(Opt::new(bind(&mut secure)).long("secure")).unwrap();
        set.parse(["--secure=maybe", "next"]).unwrap();
        assert_eq!(set.positionals(), ["next"]);
        drop(set);
        assert!(secure);
    }

    #[test]
    fn boolean_followed_by_flag() {
        let mut secure = false;
        let mut verbose = false;
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(Opt::new(bind(&mut secure)).short('s')).unwrap();
        set.add(Opt::new(bind(&mut verbose)).short('v')).unwrap();
        set.parse(["-s", "-v"]).unwrap();
        assert!(set.was_provided("s"));
        assert!(set.was_provided("v"));
        drop(set);
        assert!(secure && verbose);
    }

    #[test]
    fn equals_and_separate_value_agree() {
        let mut a = 0u16;
        let mut b = 0u16;
        let mut first = OptionSet::with_env(Environment::empty());
        first.add(Opt::new(bind(&mut a)).long("port")).unwrap();
        first.parse(["--port=8080"]).unwrap();
        let mut second = OptionSet::with_env(Environment::empty());
        second.add(Opt::new(bind(&mut b)).long("port")).unwrap();
        second.parse(["--port", "8080"]).unwrap();
        drop(first);
        drop(second);
        assert_eq!(a, 8080);
        assert_eq!(a, b);
    }

    #[test]
    fn value_may_contain_equals_and_look_like_a_flag() {
        let mut filter = String::new();
        let mut name = String::new();
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(Opt::new(bind(&mut filter)).long("filter")).unwrap();
        set.add(Opt::new(bind(&mut name)).short('n')).unwrap();
        set.parse(["--filter=a=b", "-n", "-x"]).unwrap();
        drop(set);
        assert_eq!(filter, "a=b");
        assert_eq!(name, "-x");
    }

    #[test]
    fn positionals_in_order() {
        let mut secure = false;
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(Opt::new(bind(&mut secure)).short('s').long("secure")).unwrap();
        set.parse(["foo", "", "-", "bar"]).unwrap();
        assert_eq!(set.positionals(), ["foo", "", "-", "bar"]);
    }

    #[test]
    fn terminator_makes_everything_positional() {
        let mut secure = false;
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(Opt::new(bind(&mut secure)).short('s').long("secure")).unwrap();
        set.parse(["--", "-s", "--secure", "--", "x"]).unwrap();
        assert_eq!(set.positionals(), ["-s", "--secure", "--", "x"]);
        assert!(!set.was_provided("s"));
        drop(set);
        assert!(!secure);
    }

    #[test]
    fn unknown_short_flag() {
        let mut secure = false;
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(Opt::new(bind(&mut secure)).long("secure").default("false"))
            .unwrap();
        let err = set.parse(["-s"]).unwrap_err();
        assert!(matches!(err, FlenvError::UnknownFlag { ref flag } if flag == "-s"));
        drop(set);
        assert!(!secure);
    }

    #[test]
    fn unknown_long_flag_does_not_touch_values() {
        let mut port = 7u16;
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(Opt::new(bind(&mut port)).long("port").default("80")).unwrap();
        let err = set.parse(["--prot=80"]).unwrap_err();
        assert!(matches!(err, FlenvError::UnknownFlag { ref flag } if flag == "--prot"));
        drop(set);
        assert_eq!(port, 7);
    }

    #[test]
    fn empty_long_name_is_malformed() {
        let mut set = OptionSet::with_env(Environment::empty());
        let err = set.parse(["--=value"]).unwrap_err();
        assert!(matches!(err, FlenvError::MalformedFlag { ref token } if token == "--=value"));
    }

    #[test]
    fn missing_value_at_end() {
        let mut port = 0u16;
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(Opt::new(bind(&mut port)).short('p').long("port")).unwrap();
        let err = set.parse(["--port"]).unwrap_err();
        assert!(matches!(err, FlenvError::MissingValue { ref flag } if flag == "--port"));
    }

    #[test]
    fn bad_value_is_reported() {
        let mut port = 0u16;
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(Opt::new(bind(&mut port)).short('p').long("port")).unwrap();
        let err = set.parse(["-p", "http"]).unwrap_err();
        assert!(matches!(err, FlenvError::InvalidValue { .. }));
        drop(set);
        assert_eq!(port, 0);
    }

    #[test]
    fn default_env_and_cli_precedence() {
        let cases = [
            (Environment::empty(), vec![], 80),
            (Environment::from_pairs([("PORT", "9090")]), vec![], 9090),
            (Environment::from_pairs([("PORT", "9090")]), vec!["-p", "9091"], 9091),
        ];
        for (env, args, expected) in cases {
            let mut port = 0u16;
            let mut set = OptionSet::with_env(env);
            set.add(Opt::new(bind(&mut port)).short('p').long("port").default("80").env("PORT"))
                .unwrap();
            set.parse(args).unwrap();
            drop(set);
            assert_eq!(port, expected);
        }
    }

    #[test]
    fn required_option_missing() {
        let mut token = String::new();
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(Opt::new(bind(&mut token)).long("token").env("TOKEN").required())
            .unwrap();
        let err = set.parse(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, FlenvError::MissingRequired { ref key } if key == "--token"));
        drop(set);
        assert_eq!(token, "");
    }

    #[test]
    fn required_option_satisfied_by_env() {
        let mut token = String::new();
        let mut set = OptionSet::with_env(Environment::from_pairs([("TOKEN", "s3cret")]));
        set.add(Opt::new(bind(&mut token)).long("token").env("TOKEN").required())
            .unwrap();
        set.parse(Vec::<String>::new()).unwrap();
        drop(set);
        assert_eq!(token, "s3cret");
    }

    #[test]
    fn registration_rejects_bad_names() {
        let mut a = false;
        let mut b = false;
        let mut c = false;
        let mut d = false;
        let mut set = OptionSet::new();
        assert!(matches!(set.add(Opt::new(bind(&mut a))), Err(FlenvError::UnnamedOption)));
        assert!(matches!(
            set.add(Opt::new(bind(&mut b)).short('-')),
            Err(FlenvError::InvalidName { .. })
        ));
        assert!(matches!(
            set.add(Opt::new(bind(&mut c)).long("a=b")),
            Err(FlenvError::InvalidName { .. })
        ));
        assert!(matches!(
            set.add(Opt::new(bind(&mut d)).long("x")),
            Err(FlenvError::InvalidName { .. })
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn registration_rejects_duplicates() {
        let mut a = false;
        let mut b = false;
        let mut c = false;
        let mut set = OptionSet::new();
        set.add(Opt::new(bind(&mut a)).short('v').long("verbose")).unwrap();
        assert!(matches!(
            set.add(Opt::new(bind(&mut b)).short('v')),
            Err(FlenvError::DuplicateOption { ref name }) if name == "-v"
        ));
        assert!(matches!(
            set.add(Opt::new(bind(&mut c)).long("verbose")),
            Err(FlenvError::DuplicateOption { ref name }) if name == "--verbose"
        ));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn set_by_name_marks_provided() {
        let mut port = 0u16;
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(Opt::new(bind(&mut port)).short('p').long("port").default("80"))
            .unwrap();
        set.set("port", "1234").unwrap();
        assert!(set.was_provided("p"));
        assert_eq!(set.get("p").as_deref(), Some("1234"));
        assert!(matches!(set.set("q", "1"), Err(FlenvError::UnknownFlag { .. })));
    }

    #[test]
    fn reparse_resets_positionals() {
        let mut secure = false;
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(Opt::new(bind(&mut secure)).short('s')).unwrap();
        set.parse(["a", "b"]).unwrap();
        set.parse(["c"]).unwrap();
        assert_eq!(set.positionals(), ["c"]);
    }

    #[test]
    fn listing_is_sorted_by_key() {
        let mut port = 0u16;
        let mut host = String::new();
        let mut set = OptionSet::with_env(Environment::empty());
        set.add(Opt::new(bind(&mut port)).short('p').long("port").default("80"))
            .unwrap();
        set.add(Opt::new(bind(&mut host)).short('h').long("host").default("localhost"))
            .unwrap();
        set.parse(Vec::<String>::new()).unwrap();
        assert_eq!(
            set.listing(),
            vec![
                ("-h, --host".to_string(), "localhost".to_string()),
                ("-p, --port".to_string(), "80".to_string()),
            ]
        );
    }
}
