use std::collections::HashMap;

/// Resolves logical (api) field names to physical column names.
///
/// Implementations must be total and deterministic: the same api name always
/// yields the same physical name, and unknown names still yield something.
pub trait FieldNameMapper: Send + Sync {
    fn apply(&self, api_name: &str) -> String;
}

impl<F> FieldNameMapper for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn apply(&self, api_name: &str) -> String {
        self(api_name)
    }
}

/// Api names are physical names.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFieldNameMapper;

impl FieldNameMapper for IdentityFieldNameMapper {
    fn apply(&self, api_name: &str) -> String {
        api_name.to_string()
    }
}

/// Lookup table; names without an entry pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapFieldNameMapper {
    by_api_name: HashMap<String, String>,
}

impl MapFieldNameMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, api_name: &str, physical_name: &str) {
        self.by_api_name.insert(api_name.to_string(), physical_name.to_string());
    }

    pub fn with(mut self, api_name: &str, physical_name: &str) -> Self {
        self.insert(api_name, physical_name);
        self
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for MapFieldNameMapper {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut mapper = Self::new();
        for (api_name, physical_name) in iter {
            mapper.insert(api_name, physical_name);
        }
        mapper
    }
}

impl FieldNameMapper for MapFieldNameMapper {
    fn apply(&self, api_name: &str) -> String {
        self.by_api_name
            .get(api_name)
            .cloned()
            .unwrap_or_else(|| api_name.to_string())
    }
}
