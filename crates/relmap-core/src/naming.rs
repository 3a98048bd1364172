//! Relation and column naming conventions.
//!
//! Pluralization backs the association shorthands (`belongs_to :user` targets
//! `users`); singularization backs the `<singular>_id` foreign-key convention.
//! Uses the `inflector` crate with a table of irregular plurals that appear in
//! database schemas.

use crate::config::NamingConventions;
use inflector::Inflector;

/// Singular and plural forms the inflector gets wrong for relation names.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("half", "halves"),
    ("analysis", "analyses"),
    ("basis", "bases"),
    ("crisis", "crises"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("medium", "media"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
];

/// The irregular `(singular, plural)` pair `word` is either form of.
fn irregular(word: &str) -> Option<(&'static str, &'static str)> {
    let lower = word.to_lowercase();
    IRREGULAR
        .iter()
        .copied()
        .find(|(singular, plural)| lower == *singular || lower == *plural)
}

/// Plural form of a relation or association name.
pub fn pluralize(word: &str) -> String {
    match irregular(word) {
        Some((_, plural)) => plural.to_string(),
        None if word.is_empty() => String::new(),
        None => word.to_plural(),
    }
}

/// Singular form of a relation name.
pub fn singularize(word: &str) -> String {
    match irregular(word) {
        Some((singular, _)) => singular.to_string(),
        None if word.is_empty() => String::new(),
        None => word.to_singular(),
    }
}

/// Conventional foreign-key column pointing at `relation` (`users` -> `user_id`).
pub fn foreign_key_column(relation: &str, naming: &NamingConventions) -> String {
    format!("{}{}", singularize(relation), naming.foreign_key_suffix)
}

/// Deterministic composite index name (`posts`, `[created_at, name]` ->
/// `posts_created_at_name_index`).
pub fn index_name<S: AsRef<str>>(relation: &str, columns: &[S], naming: &NamingConventions) -> String {
    let mut name = String::from(relation);
    for column in columns {
        name.push('_');
        name.push_str(column.as_ref());
    }
    name.push('_');
    name.push_str(&naming.index_suffix);
    name
}
