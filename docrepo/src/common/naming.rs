use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::repository::Entity;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::any::TypeId;
use std::collections::HashSet;

static COLLECTION_NAMES: Lazy<DashMap<TypeId, String>> = Lazy::new(DashMap::new);
static INFLECTOR: Lazy<Inflector> = Lazy::new(Inflector::english);

/// Returns the collection name of entity type `T`.
///
/// The name is `T::collection_override()` when the entity declares one,
/// otherwise the lower-cased English plural of the bare type name
/// (`UserClaim` becomes `userclaims`, `Person` becomes `people`).
/// The result is computed once per type and served from a process-wide
/// cache afterwards.
///
/// # Errors
///
/// `NamingError` when the computed name is empty.
pub fn collection_name<T: Entity>() -> RepoResult<String> {
    let type_id = TypeId::of::<T>();
    if let Some(name) = COLLECTION_NAMES.get(&type_id) {
        return Ok(name.value().clone());
    }

    let name = match T::collection_override() {
        Some(name) => name.trim().to_string(),
        None => pluralize(&bare_type_name(&T::type_name())).to_lowercase(),
    };

    if name.is_empty() {
        log::error!("Could not derive a collection name for {}", std::any::type_name::<T>());
        return Err(RepoError::new(
            &format!("Could not derive a collection name for {}", std::any::type_name::<T>()),
            ErrorKind::NamingError,
        ));
    }

    log::debug!("Collection name for {} resolved to {}", std::any::type_name::<T>(), name);
    // a racing thread computed the same deterministic value
    Ok(COLLECTION_NAMES.entry(type_id).or_insert(name).value().clone())
}

/// Strips the module path and generic arguments from a type name.
pub fn bare_type_name(type_name: &str) -> String {
    let without_generics = match type_name.find('<') {
        Some(pos) => &type_name[..pos],
        None => type_name,
    };
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .trim()
        .to_string()
}

/// Returns the English plural of `word`.
pub fn pluralize(word: &str) -> String {
    INFLECTOR.pluralize(word)
}

struct Inflector {
    uncountables: HashSet<&'static str>,
    rules: Vec<(Regex, String)>,
}

impl Inflector {
    fn english() -> Self {
        let uncountables = [
            "equipment", "information", "rice", "money", "species", "series", "fish",
            "sheep", "deer", "aircraft", "news", "data", "metadata", "feedback", "staff",
        ]
        .into_iter()
        .collect();

        // irregular forms: (singular, plural, match as word ending)
        let irregulars = [
            ("human", "humans", true),
            ("person", "people", true),
            ("man", "men", true),
            ("child", "children", true),
            ("mouse", "mice", true),
            ("louse", "lice", true),
            ("goose", "geese", true),
            ("tooth", "teeth", true),
            ("foot", "feet", true),
            ("criterion", "criteria", true),
            ("ox", "oxen", false),
        ];

        let mut rules: Vec<(String, String)> = irregulars
            .iter()
            .map(|(singular, plural, match_ending)| {
                let anchor = if *match_ending { "" } else { "^" };
                (
                    format!("(?i){}({}){}$", anchor, &singular[..1], &singular[1..]),
                    format!("${{1}}{}", &plural[1..]),
                )
            })
            .collect();

        rules.extend(
            [
                ("(?i)(quiz)$", "${1}zes"),
                ("(?i)(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
                ("(?i)(x|ch|ss|sh|zz)$", "${1}es"),
                ("(?i)([^aeiouy]|qu)y$", "${1}ies"),
                ("(?i)(?:([^f])fe|([lr])f)$", "${1}${2}ves"),
                ("(?i)sis$", "ses"),
                ("(?i)(buffal|tomat|potat|her|ech|volcan)o$", "${1}oes"),
                ("(?i)(us|as)$", "${1}es"),
                ("(?i)s$", "s"),
            ]
            .into_iter()
            .map(|(pattern, replacement)| (pattern.to_string(), replacement.to_string())),
        );

        let rules = rules
            .into_iter()
            .filter_map(|(pattern, replacement)| match Regex::new(&pattern) {
                Ok(regex) => Some((regex, replacement)),
                Err(err) => {
                    log::warn!("Skipping invalid inflection pattern {}: {}", pattern, err);
                    None
                }
            })
            .collect();

        Inflector { uncountables, rules }
    }

    fn pluralize(&self, word: &str) -> String {
        let word = word.trim();
        if word.is_empty() || self.is_uncountable(word) {
            return word.to_string();
        }

        for (regex, replacement) in &self.rules {
            if regex.is_match(word) {
                return regex.replace(word, replacement.as_str()).into_owned();
            }
        }
        format!("{}s", word)
    }

    fn is_uncountable(&self, word: &str) -> bool {
        // only the trailing word of a CamelCase name decides
        let start = word
            .char_indices()
            .filter(|(_, c)| c.is_uppercase())
            .map(|(i, _)| i)
            .last()
            .unwrap_or(0);
        self.uncountables.contains(word[start..].to_lowercase().as_str())
            || self.uncountables.contains(word.to_lowercase().as_str())
    }
}
