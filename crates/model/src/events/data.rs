use crate::{core::value::Value, pagination::offset::Offset, records::row::Row};
use serde::{Deserialize, Serialize};

/// One element of the ordered write stream handed to a destination session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataEvent {
    /// Rows to land in staging, values ordered like the destination columns.
    Rows { rows: Vec<Row> },

    /// Id column values whose rows must be removed from the destination.
    Delete { keys: Vec<Value> },

    /// Everything received so far must be made durable; the offset is emitted
    /// once the transaction commits.
    Commit { offset: Offset },
}

impl DataEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DataEvent::Rows { .. } => "rows",
            DataEvent::Delete { .. } => "delete",
            DataEvent::Commit { .. } => "commit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::offset::{OffsetKey, PathSegment};

    #[test]
    fn test_event_json_shape() {
        let json = r#"[
            {"kind": "rows", "rows": [[{"Int": 1}, {"String": "a"}]]},
            {"kind": "delete", "keys": [{"Int": 7}]},
            {"kind": "commit", "offset": {"Internal": {"path": [{"Field": "id"}], "key": {"Int": 1}}}}
        ]"#;

        let events: Vec<DataEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            DataEvent::Rows {
                rows: vec![vec![Value::Int(1), Value::String("a".into())]]
            }
        );
        assert_eq!(
            events[2],
            DataEvent::Commit {
                offset: Offset::Internal {
                    path: vec![PathSegment::Field("id".into())],
                    key: OffsetKey::Int(1),
                }
            }
        );
        assert_eq!(events[1].name(), "delete");
    }
}
