//! Type instances: structural, type-agnostic value trees.
//!
//! Used for reference parameters (`is: [paged: {size: 10}]`), parametrized
//! fragment bodies, fixed facets and structured examples.

use super::value::Value;

/// A structural view of a value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeInstance {
    value: Value,
}

impl TypeInstance {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Whether the instance is a scalar (including null).
    pub fn is_scalar(&self) -> bool {
        self.value.is_scalar()
    }

    /// Scalar value; `None` for mappings and sequences.
    pub fn value(&self) -> Option<&Value> {
        self.is_scalar().then_some(&self.value)
    }

    /// Mapping entries as properties. Scalars and sequences have none.
    pub fn properties(&self) -> Vec<TypeInstanceProperty> {
        self.value
            .as_mapping()
            .map(|map| {
                map.iter()
                    .map(|(k, v)| TypeInstanceProperty {
                        name: k.clone(),
                        value: v.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Property by name.
    pub fn property(&self, name: &str) -> Option<TypeInstanceProperty> {
        self.value.get(name).map(|v| TypeInstanceProperty {
            name: name.to_string(),
            value: v.clone(),
        })
    }

    /// The underlying value tree, whatever its shape.
    pub fn raw(&self) -> &Value {
        &self.value
    }

    pub fn into_raw(self) -> Value {
        self.value
    }
}

/// One named property of a [`TypeInstance`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInstanceProperty {
    name: String,
    value: Value,
}

impl TypeInstanceProperty {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_array(&self) -> bool {
        matches!(self.value, Value::Sequence(_))
    }

    /// Property value as an instance. For array values this is the whole array.
    pub fn value(&self) -> TypeInstance {
        TypeInstance::new(self.value.clone())
    }

    /// Array elements, or empty if the value is not an array.
    pub fn values(&self) -> Vec<TypeInstance> {
        match &self.value {
            Value::Sequence(items) => items.iter().cloned().map(TypeInstance::new).collect(),
            _ => Vec::new(),
        }
    }
}
