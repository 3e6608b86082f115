//! Template parameters of traits and resource types.
//!
//! A fragment body refers to its parameters as `<<name>>` or, with one or
//! more case transforms, `<<name | !singularize | !uppercase>>`. Tokens may
//! appear in mapping keys as well as string values.

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::base::Name;
use crate::syntax::Value;

/// Parameters supplied by the expander rather than the reference site.
pub const RESERVED_PARAMETERS: &[&str] = &["resourcePath", "resourcePathName", "methodName"];

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<<\s*([^<>|\s]+)\s*((?:\|\s*![A-Za-z]+\s*)*)>>").expect("valid token pattern")
});

static TRANSFORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\s*([A-Za-z]+)").expect("valid transform pattern"));

/// Words that read the same in singular and plural.
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "news",
    "data",
    "metadata",
];

/// Irregular `(singular, plural)` pairs.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("ox", "oxen"),
    ("index", "indices"),
    ("status", "statuses"),
];

/// Result of substituting parameters into a fragment.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    pub value: Value,
    /// Parameters referenced but not supplied, in first-use order.
    pub missing: Vec<String>,
    /// Transform names that are not recognised.
    pub unknown_transforms: Vec<String>,
}

/// Names of the parameters a fragment uses, in first-use order.
/// Reserved parameters are left out.
pub fn template_parameters(value: &Value) -> Vec<Name> {
    let mut found = IndexSet::new();
    collect_parameters(value, &mut found);
    found.into_iter().collect()
}

fn collect_parameters(value: &Value, found: &mut IndexSet<Name>) {
    match value {
        Value::String(text) => scan_tokens(text, found),
        Value::Sequence(items) => items.iter().for_each(|item| collect_parameters(item, found)),
        Value::Mapping(map) => {
            for (key, item) in map {
                scan_tokens(key, found);
                collect_parameters(item, found);
            }
        }
        _ => {}
    }
}

fn scan_tokens(text: &str, found: &mut IndexSet<Name>) {
    for caps in TOKEN.captures_iter(text) {
        let name = &caps[1];
        if !RESERVED_PARAMETERS.contains(&name) {
            found.insert(Name::new(name));
        }
    }
}

/// Whether a string still contains a template token.
pub fn has_template(text: &str) -> bool {
    TOKEN.is_match(text)
}

/// Replace every token in `value` using `params`.
///
/// A string that is exactly one untransformed token takes the parameter's
/// value as is, so non-string parameters keep their type. Tokens naming a
/// missing parameter are left in place and reported.
pub fn substitute(value: &Value, params: &IndexMap<String, Value>) -> Substitution {
    let mut out = Substitution::default();
    out.value = substitute_value(value, params, &mut out.missing, &mut out.unknown_transforms);
    out
}

fn substitute_value(
    value: &Value,
    params: &IndexMap<String, Value>,
    missing: &mut Vec<String>,
    unknown: &mut Vec<String>,
) -> Value {
    match value {
        Value::String(text) => {
            if let Some(caps) = TOKEN.captures(text) {
                let whole = caps.get(0).is_some_and(|m| m.as_str() == text.as_str());
                if whole && caps[2].trim().is_empty() {
                    if let Some(param) = params.get(&caps[1]) {
                        return param.clone();
                    }
                }
            }
            Value::String(substitute_str(text, params, missing, unknown))
        }
        Value::Sequence(items) => Value::Sequence(
            items
                .iter()
                .map(|item| substitute_value(item, params, missing, unknown))
                .collect(),
        ),
        Value::Mapping(map) => {
            let mut result = IndexMap::with_capacity(map.len());
            for (key, item) in map {
                let key = substitute_str(key, params, missing, unknown);
                result.insert(key, substitute_value(item, params, missing, unknown));
            }
            Value::Mapping(result)
        }
        other => other.clone(),
    }
}

fn substitute_str(
    text: &str,
    params: &IndexMap<String, Value>,
    missing: &mut Vec<String>,
    unknown: &mut Vec<String>,
) -> String {
    TOKEN
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            let Some(param) = params.get(name) else {
                if !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
                return caps[0].to_string();
            };
            let mut result = param.to_display_string();
            for transform in TRANSFORM.captures_iter(&caps[2]) {
                let transform = &transform[1];
                match apply_transform(transform, &result) {
                    Some(next) => result = next,
                    None => {
                        if !unknown.iter().any(|u| u == transform) {
                            unknown.push(transform.to_string());
                        }
                    }
                }
            }
            result
        })
        .into_owned()
}

/// Apply a named transform; `None` for unknown names.
pub fn apply_transform(name: &str, text: &str) -> Option<String> {
    let words = || split_words(text);
    let result = match name {
        "singularize" => singularize(text),
        "pluralize" => pluralize(text),
        "uppercase" => text.to_uppercase(),
        "lowercase" => text.to_lowercase(),
        "lowercamelcase" => {
            let mut out = String::new();
            for (i, word) in words().iter().enumerate() {
                if i == 0 {
                    out.push_str(&word.to_lowercase());
                } else {
                    out.push_str(&capitalize(word));
                }
            }
            out
        }
        "uppercamelcase" => words().iter().map(|w| capitalize(w)).collect(),
        "lowerunderscorecase" => join_words(&words(), "_").to_lowercase(),
        "upperunderscorecase" => join_words(&words(), "_").to_uppercase(),
        "lowerhyphencase" => join_words(&words(), "-").to_lowercase(),
        "upperhyphencase" => join_words(&words(), "-").to_uppercase(),
        _ => return None,
    };
    Some(result)
}

/// Split on separators and lower-to-upper case boundaries.
fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in text.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn join_words(words: &[String], sep: &str) -> String {
    words.join(sep)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Replace the last `strip` bytes of `word` with `suffix`.
fn replace_suffix(word: &str, strip: usize, suffix: &str) -> String {
    match word.get(..word.len().saturating_sub(strip)) {
        Some(stem) => format!("{stem}{suffix}"),
        None => word.to_string(),
    }
}

/// Keep the first letter's case when swapping in an irregular form.
fn match_case(original: &str, replacement: &str) -> String {
    if original.chars().next().is_some_and(char::is_uppercase) {
        capitalize(replacement)
    } else {
        replacement.to_string()
    }
}

pub fn singularize(word: &str) -> String {
    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, plural)| *plural == lower) {
        return match_case(word, singular);
    }
    if IRREGULAR.iter().any(|(singular, _)| *singular == lower) {
        return word.to_string();
    }
    if lower.ends_with("ies") && lower.len() > 3 {
        replace_suffix(word, 3, "y")
    } else if ["sses", "shes", "ches", "xes", "zes"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        replace_suffix(word, 2, "")
    } else if lower.ends_with('s')
        && !lower.ends_with("ss")
        && !lower.ends_with("us")
        && !lower.ends_with("is")
    {
        replace_suffix(word, 1, "")
    } else {
        word.to_string()
    }
}

pub fn pluralize(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        return match_case(word, plural);
    }
    if IRREGULAR.iter().any(|(_, plural)| *plural == lower) {
        return word.to_string();
    }
    let before_y = lower.chars().rev().nth(1);
    if lower.ends_with('y') && before_y.is_some_and(|c| !"aeiou".contains(c)) {
        replace_suffix(word, 1, "ies")
    } else if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        format!("{word}es")
    } else {
        format!("{word}s")
    }
}
