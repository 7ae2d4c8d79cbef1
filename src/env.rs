use std::collections::HashMap;

/// Where environment variables are looked up.
///
/// Lookups happen at resolution time, never at registration, so a variable
/// set after an option is added but before parsing is honored.
/// [`Environment::Fixed`] lets tests pass synthetic data instead of touching
/// the process environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Environment {
    /// The real process environment.
    #[default]
    Process,
    /// A fixed name → value mapping.
    Fixed(HashMap<String, String>),
}

impl Environment {
    /// Build a fixed environment from `(name, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Environment::Fixed(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// An environment where nothing is set.
    pub fn empty() -> Self {
        Environment::Fixed(HashMap::new())
    }

    /// Look up `name`. Unset and empty variables both yield `None`.
    pub fn lookup(&self, name: &str) -> Option<String> {
        let value = match self {
            Environment::Process => std::env::var(name).ok(),
            Environment::Fixed(vars) => vars.get(name).cloned(),
        };
        value.filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_lookup() {
        let env = Environment::from_pairs([("PORT", "9090")]);
        assert_eq!(env.lookup("PORT").as_deref(), Some("9090"));
        assert_eq!(env.lookup("HOST"), None);
    }

    #[test]
    fn empty_value_is_unset() {
        let env = Environment::from_pairs([("PORT", "")]);
        assert_eq!(env.lookup("PORT"), None);
    }

    #[test]
    fn names_are_case_sensitive() {
        let env = Environment::from_pairs([("PORT", "1")]);
        assert_eq!(env.lookup("port"), None);
    }

    #[test]
    fn empty_environment() {
        assert_eq!(Environment::empty().lookup("PATH"), None);
    }

    #[test]
    fn process_environment_misses_unset_vars() {
        assert_eq!(Environment::Process.lookup("FLENV_TEST_NEVER_SET_VARIABLE"), None);
    }
}
