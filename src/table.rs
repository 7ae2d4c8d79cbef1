//! Convert dotted-key field values into a nested `toml::Table`.
//!
//! Each `("database.url", Value)` pair is expanded into the nested table
//! structure serde expects for a nested config struct.

use toml::{Table, Value};

use crate::error::FlenvError;

/// `("database.url", Value::String("pg://"))` becomes `{database = {url = "pg://"}}`.
///
/// If multiple entries target the same key, the last one wins.
pub fn entries_to_table(entries: Vec<(String, Value)>) -> Result<Table, FlenvError> {
    let mut table = Table::new();
    for (dotted_key, value) in entries {
        set_nested(&mut table, &dotted_key, value)?;
    }
    Ok(table)
}

fn set_nested(table: &mut Table, dotted_key: &str, value: Value) -> Result<(), FlenvError> {
    let conflict = || FlenvError::Decode {
        reason: format!("'{dotted_key}' is nested under a key that is not a table"),
    };

    let (parents, leaf) = match dotted_key.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, dotted_key),
    };

    let mut current = table;
    for segment in parents.into_iter().flat_map(|p| p.split('.')) {
        current = current
            .entry(segment)
            .or_insert_with(|| Value::Table(Table::new()))
            .as_table_mut()
            .ok_or_else(conflict)?;
    }

    current.insert(leaf.to_string(), value);
    Ok(())
}
