//! Case-insensitive multi-value HTTP header map.
//!
//! Names are matched by ASCII lowercase folding while the casing used at
//! insertion time is preserved for output. A name is never recorded under
//! two casings at once: a replacing insert adopts the casing of that call,
//! an append keeps the casing seen first.


/// One header: lookup key, display name, ordered values.
///
/// Keeping the lowercase key and the display name in the same record is
/// what enforces the single-casing invariant.
#[derive(Clone, PartialEq, Eq)]
struct Field {
    /// ASCII lowercase
    key: String,
    /// casing recorded for output
    name: String,
    values: Vec<String>,
}

/// HTTP headers multimap, insertion ordered.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    fields: Vec<Field>,
}

impl HeaderMap {
    /// Create a new empty [`HeaderMap`].
    ///
    /// This function does not allocate.
    #[inline]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Returns the number of distinct header names.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the map has no header.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `true` if the map contains the given name, matched
    /// case-insensitively.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns all values for the given name in insertion order.
    ///
    /// Absent names yield an empty slice.
    pub fn get(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(at) => &self.fields[at].values,
            None => &[],
        }
    }

    /// Returns all values for the given name joined with `", "`.
    ///
    /// Absent names yield an empty string.
    pub fn get_line(&self, name: &str) -> String {
        self.get(name).join(", ")
    }

    /// Returns the recorded display casing for the given name.
    pub fn display_name(&self, name: &str) -> Option<&str> {
        self.position(name).map(|at| self.fields[at].name.as_str())
    }

    /// Returns an iterator over `(display name, values)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|field| (field.name.as_str(), field.values.as_slice()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        // header counts are small, the scan beats hashing in practice
        self.fields
            .iter()
            .position(|field| field.key.eq_ignore_ascii_case(name))
    }
}

// ===== Mutation =====

impl HeaderMap {
    /// Replace all values under `name`, recording this call's casing.
    ///
    /// A new name is appended at the end, an existing one keeps its
    /// position.
    pub fn set(&mut self, name: &str, values: Vec<String>) {
        match self.position(name) {
            Some(at) => {
                let field = &mut self.fields[at];
                field.name = name.to_owned();
                field.values = values;
            }
            None => self.fields.push(Field {
                key: name.to_ascii_lowercase(),
                name: name.to_owned(),
                values,
            }),
        }
    }

    /// Append values under `name`, keeping the first-seen casing.
    ///
    /// Behaves like [`set`][HeaderMap::set] when the name is absent.
    pub fn append(&mut self, name: &str, values: Vec<String>) {
        match self.position(name) {
            Some(at) => self.fields[at].values.extend(values),
            None => self.set(name, values),
        }
    }

    /// Remove the values and the casing record for `name`.
    ///
    /// Returns `true` if the header was present.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(at) => {
                self.fields.remove(at);
                true
            }
            None => false,
        }
    }

    /// Set the `host` header and move it to the front of iteration order.
    ///
    /// An existing field keeps its display casing, a new one is recorded
    /// as `Host`. Host is conventionally the first header on the wire.
    pub fn set_host_first(&mut self, value: String) {
        let field = match self.position("host") {
            Some(at) => {
                let mut field = self.fields.remove(at);
                field.values = vec![value];
                field
            }
            None => Field {
                key: "host".to_owned(),
                name: "Host".to_owned(),
                values: vec![value],
            },
        };
        self.fields.insert(0, field);
    }
}

impl std::fmt::Debug for HeaderMap {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// ===== Value Conversion =====

/// A type usable as header value input.
#[allow(private_bounds, reason = "sealed")]
pub trait IntoHeaderValues: Sealed { }
trait Sealed: Sized {
    fn into_values(self) -> Vec<String>;
}

impl IntoHeaderValues for &str { }
impl Sealed for &str {
    #[inline]
    fn into_values(self) -> Vec<String> {
        vec![self.to_owned()]
    }
}

impl IntoHeaderValues for String { }
impl Sealed for String {
    #[inline]
    fn into_values(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoHeaderValues for Vec<String> { }
impl Sealed for Vec<String> {
    #[inline]
    fn into_values(self) -> Vec<String> {
        self
    }
}

impl IntoHeaderValues for &[&str] { }
impl Sealed for &[&str] {
    #[inline]
    fn into_values(self) -> Vec<String> {
        self.iter().map(|value| (*value).to_owned()).collect()
    }
}

impl<const N: usize> IntoHeaderValues for [&str; N] { }
impl<const N: usize> Sealed for [&str; N] {
    #[inline]
    fn into_values(self) -> Vec<String> {
        self.iter().map(|value| (*value).to_owned()).collect()
    }
}

pub(crate) fn into_values<V: IntoHeaderValues>(values: V) -> Vec<String> {
    values.into_values()
}
