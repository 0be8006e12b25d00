//! Forum records for tests.
//!
//! [`NodeRow`] builds one 19-column node row; [`sample_forum`] is a small
//! dump with two threads, an orphan answer, and a header line.

use crate::schema::{NODE_FIELDS, RawRecord};
use serde::{Deserialize, Serialize};

/// The dump's NULL marker.
pub const NULL: &str = "\\N";

/// One row of the forum node table.
///
/// Only the columns the jobs read are settable; the rest are filled with
/// plausible constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRow {
    pub id: String,
    pub title: String,
    pub tagnames: String,
    pub author_id: String,
    pub body: String,
    pub node_type: String,
    pub parent_id: String,
    pub abs_parent_id: String,
    pub added_at: String,
}

impl NodeRow {
    fn new(id: i64, node_type: &str, parent: Option<i64>, author: &str) -> Self {
        let parent = parent.map_or_else(|| NULL.to_string(), |p| p.to_string());
        Self {
            id: id.to_string(),
            title: String::new(),
            tagnames: String::new(),
            author_id: author.to_string(),
            body: String::new(),
            node_type: node_type.to_string(),
            parent_id: parent.clone(),
            abs_parent_id: parent,
            added_at: "2012-02-25 08:09:06.787181+00".to_string(),
        }
    }

    pub fn question(id: i64, author: &str) -> Self {
        Self::new(id, "question", None, author)
    }

    pub fn answer(id: i64, question: i64, author: &str) -> Self {
        Self::new(id, "answer", Some(question), author)
    }

    pub fn comment(id: i64, question: i64, author: &str) -> Self {
        Self::new(id, "comment", Some(question), author)
    }

    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    #[must_use]
    pub fn tags(mut self, tagnames: &str) -> Self {
        self.tagnames = tagnames.to_string();
        self
    }

    #[must_use]
    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    #[must_use]
    pub fn added_at(mut self, ts: &str) -> Self {
        self.added_at = ts.to_string();
        self
    }

    /// All 19 fields in schema order.
    pub fn fields(&self) -> Vec<String> {
        let fields = vec![
            self.id.clone(),
            self.title.clone(),
            self.tagnames.clone(),
            self.author_id.clone(),
            self.body.clone(),
            self.node_type.clone(),
            self.parent_id.clone(),
            self.abs_parent_id.clone(),
            self.added_at.clone(),
            "0".into(),
            NULL.into(),
            NULL.into(),
            self.author_id.clone(),
            self.added_at.clone(),
            NULL.into(),
            NULL.into(),
            NULL.into(),
            "0".into(),
            "f".into(),
        ];
        debug_assert_eq!(fields.len(), NODE_FIELDS.len());
        fields
    }

    pub fn to_record(&self) -> RawRecord {
        RawRecord::from(self.fields())
    }

    /// One dump line, quoting fields that need it. No trailing newline.
    pub fn to_tsv_line(&self) -> String {
        self.fields()
            .iter()
            .map(|f| quote(f))
            .collect::<Vec<_>>()
            .join("\t")
    }
}

fn quote(field: &str) -> String {
    if field.contains(['\t', '\n', '\r', '"']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// The dump's header line.
pub fn header_row() -> String {
    NODE_FIELDS.join("\t")
}

/// Rows as dump text, one per line, newline terminated.
pub fn to_tsv(rows: &[NodeRow]) -> String {
    rows.iter().map(|r| r.to_tsv_line() + "\n").collect()
}

/// A small forum:
///
/// - question 1 by `100` (tags `rust cli`), answered by `200` and `300`,
///   commented on by `200`
/// - question 2 by `200` (tags `rust`), no answers
/// - answer 7 by `400` to question 99, which is not in the dump
#[must_use]
pub fn sample_forum() -> Vec<NodeRow> {
    vec![
        NodeRow::question(1, "100")
            .title("Borrowing in loops")
            .tags("rust cli")
            .body("How do I borrow\ninside a loop?")
            .added_at("2012-02-25 08:09:06.787181+00"),
        NodeRow::answer(3, 1, "200")
            .body("Use an index.")
            .added_at("2012-02-25 09:15:00.1+00"),
        NodeRow::answer(4, 1, "300")
            .body("Collect first, then mutate the \"vec\".")
            .added_at("2012-02-26 10:40:12.000+00"),
        NodeRow::comment(5, 1, "200")
            .body("Thanks")
            .added_at("2012-02-26 21:00:00.5+00"),
        NodeRow::question(2, "200")
            .title("Tabs\tin titles")
            .tags("rust")
            .body("Short")
            .added_at("2012-03-01 09:05:59.0+00"),
        NodeRow::answer(7, 99, "400")
            .body("Orphaned")
            .added_at("2012-03-02 23:59:59.999+00"),
    ]
}

/// [`sample_forum`] as dump text with a header line in front.
#[must_use]
pub fn sample_forum_tsv() -> String {
    format!("{}\n{}", header_row(), to_tsv(&sample_forum()))
}
