use super::*;
use crate::{Record, UpsertResult, sort_inverse_chronological};

#[test]
fn test_inverse_chronological_ordering() {
    let mut records = vec![
        Record::new(ts(1, 0), 1),
        Record::new(ts(3, 0), 3),
        Record::new(ts(2, 0), 2),
    ];
    sort_inverse_chronological(&mut records);
    let values: Vec<i32> = records.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![3, 2, 1]);

    records.sort_by(Record::chronological);
    let values: Vec<i32> = records.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn test_default_upsert_result_is_zero() {
    let result = UpsertResult::default();
    assert_eq!(result.matched, 0);
    assert_eq!(result.modified, 0);
    assert_eq!(result.upserted, 0);
}
