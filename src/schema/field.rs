use serde_json::{Map, Value};

/// Storage type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Timestamp,
}

impl FieldKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldKind::Text => "TEXT",
            FieldKind::Timestamp => "TIMESTAMPTZ",
        }
    }
}

/// Value applied when a record is created without the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// Creation instant
    Now,
}

/// Declaration of one field in a record shape.
///
/// `name` is the key in the readable form, `column` the storage column.
/// `getter` is a pure projection applied only when producing the readable
/// form; stored values are never rewritten by it.
#[derive(Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
    pub default: Option<FieldDefault>,
    pub getter: Option<fn(&str) -> String>,
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("getter", &self.getter.is_some())
            .finish()
    }
}

impl FieldSpec {
    pub const fn text(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            kind: FieldKind::Text,
            default: None,
            getter: None,
        }
    }

    pub const fn timestamp(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            kind: FieldKind::Timestamp,
            default: None,
            getter: None,
        }
    }

    pub const fn with_default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn with_getter(mut self, getter: fn(&str) -> String) -> Self {
        self.getter = Some(getter);
        self
    }

    /// Column definition for `CREATE TABLE`
    pub fn column_ddl(&self) -> String {
        match self.default {
            Some(FieldDefault::Now) => format!(
                "{} {} NOT NULL DEFAULT now()",
                quote_identifier(self.column),
                self.kind.sql_type()
            ),
            None => format!("{} {}", quote_identifier(self.column), self.kind.sql_type()),
        }
    }
}

/// Project a stored document into its readable form by running each field's
/// getter over string values. Unknown keys pass through untouched.
pub fn readable_form(fields: &[FieldSpec], stored: &Map<String, Value>) -> Map<String, Value> {
    let mut readable = stored.clone();

    for spec in fields {
        let Some(getter) = spec.getter else { continue };
        if let Some(Value::String(raw)) = stored.get(spec.name) {
            readable.insert(spec.name.to_string(), Value::String(getter(raw)));
        }
    }

    readable
}

/// Quote SQL identifier to prevent injection
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
