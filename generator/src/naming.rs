use std::collections::HashSet;

/// Derives an identifier from an XML local name.
///
/// Characters that cannot appear in identifiers become `_`, a leading digit is prefixed with `_`
/// and the first letter is uppercased. Everything else, including the casing of later characters,
/// is kept so the XML name stays recognisable.
pub fn identifier(local_name: &str) -> String {
    let mut result = String::with_capacity(local_name.len() + 1);
    let mut chars = local_name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' });

    match chars.next() {
        None => return "_".into(),
        Some(first) if first.is_ascii_digit() => {
            result.push('_');
            result.push(first);
        }
        Some(first) => result.extend(first.to_uppercase()),
    }
    result.extend(chars);
    result
}

/// Identifiers already taken inside one scope, e.g. the properties of a class.
#[derive(Debug, Default)]
pub struct IdentifierSet {
    taken: HashSet<String>,
}

impl IdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes `identifier`, or the first of `identifier2`, `identifier3`, ... that is still free.
    pub fn claim(&mut self, identifier: &str) -> String {
        if self.taken.insert(identifier.to_string()) {
            return identifier.to_string();
        }
        let mut counter = 2usize;
        loop {
            let candidate = format!("{identifier}{counter}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Like [`claim`](Self::claim), but a taken `identifier` is first retried with `suffix`
    /// appended.
    pub fn claim_with_suffix(&mut self, identifier: &str, suffix: &str) -> String {
        if self.taken.contains(identifier) {
            self.claim(&format!("{identifier}{suffix}"))
        } else {
            self.claim(identifier)
        }
    }
}
