pub mod field;
pub mod registry;
pub mod user;

pub use field::{readable_form, FieldDefault, FieldKind, FieldSpec};
pub use registry::{SchemaDefinition, SchemaRegistry};
pub use user::{normalize_website, NewUser, RecordError, User, USER_FIELDS, USER_SCHEMA, USER_TABLE};
