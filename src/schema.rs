//! Positional schema of the forum node table and the field accessor over it.
//!
//! Raw records are plain sequences of string fields. A [`Schema`] gives those
//! positions names, and decides whether a record is usable at all: it must
//! have exactly as many fields as the schema, and its identifier field must
//! parse as an integer. The second rule is what throws away the dump's header
//! row.
//!
//! ```
//! use forumstats::schema::{NODE_SCHEMA, RawRecord};
//!
//! let mut fields = vec![String::new(); NODE_SCHEMA.len()];
//! fields[0] = "42".into();
//! fields[5] = "question".into();
//! let rec = RawRecord::from(fields);
//!
//! assert!(NODE_SCHEMA.is_valid_record(&rec));
//! assert_eq!(NODE_SCHEMA.get_field(&rec, "node_type"), Some("question"));
//! assert_eq!(NODE_SCHEMA.get_field(&rec, "no_such_field"), None);
//! ```

use crate::validation::{SkipReason, ValidationError};

/// Column layout of `forum_nodes.tsv`.
pub const NODE_FIELDS: [&str; 19] = [
    "id",
    "title",
    "tagnames",
    "author_id",
    "body",
    "node_type",
    "parent_id",
    "abs_parent_id",
    "added_at",
    "score",
    "state_string",
    "last_edited_id",
    "last_activity_by_id",
    "last_activity_at",
    "active_revision_id",
    "extra",
    "extra_ref_id",
    "extra_count",
    "marked",
];

/// The forum node schema, keyed by `id`.
pub static NODE_SCHEMA: Schema = Schema::new(&NODE_FIELDS, "id");

/// One line of raw input, split into fields. Never mutated after reading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord(Vec<String>);

impl RawRecord {
    /// Number of fields in this record.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field at a position, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for RawRecord {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

impl<S: Into<String>> FromIterator<S> for RawRecord {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Ordered field names plus the designated identifier field.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    fields: &'static [&'static str],
    id_field: &'static str,
}

impl Schema {
    /// `id_field` must be one of `fields`.
    pub const fn new(fields: &'static [&'static str], id_field: &'static str) -> Self {
        Self { fields, id_field }
    }

    /// Number of fields a well-formed record carries.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> &'static [&'static str] {
        self.fields
    }

    /// Position of a named field, or `None` if the schema does not have it.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| *f == name)
    }

    /// Value of a named field.
    ///
    /// Absent when the name is unknown or when the record does not have the
    /// schema's shape.
    pub fn get_field<'r>(&self, record: &'r RawRecord, name: &str) -> Option<&'r str> {
        if record.len() != self.len() {
            return None;
        }
        record.get(self.field_index(name)?)
    }

    /// Like [`get_field`](Self::get_field), classifying the failure.
    pub fn require<'r>(&self, record: &'r RawRecord, name: &str) -> Result<&'r str, ValidationError> {
        if record.len() != self.len() {
            return Err(ValidationError::columns(self.len(), record.len()));
        }
        self.field_index(name)
            .and_then(|i| record.get(i))
            .ok_or_else(|| {
                ValidationError::field(SkipReason::FieldMissing, name, "not part of the schema")
            })
    }

    /// Shape check plus "identifier parses as an integer".
    pub fn check(&self, record: &RawRecord) -> Result<(), ValidationError> {
        let id = self.require(record, self.id_field)?;
        if id.trim().parse::<i64>().is_err() {
            return Err(ValidationError::field(
                SkipReason::ParseFailure,
                self.id_field,
                format!("not an integer: {id:?}"),
            ));
        }
        Ok(())
    }

    /// Whether the record can be fed to a mapper.
    pub fn is_valid_record(&self, record: &RawRecord) -> bool {
        self.check(record).is_ok()
    }
}

/// [`Schema::field_index`] on [`NODE_SCHEMA`].
pub fn field_index(name: &str) -> Option<usize> {
    NODE_SCHEMA.field_index(name)
}

/// [`Schema::get_field`] on [`NODE_SCHEMA`].
pub fn get_field<'r>(record: &'r RawRecord, name: &str) -> Option<&'r str> {
    NODE_SCHEMA.get_field(record, name)
}

/// [`Schema::is_valid_record`] on [`NODE_SCHEMA`].
pub fn is_valid_record(record: &RawRecord) -> bool {
    NODE_SCHEMA.is_valid_record(record)
}
