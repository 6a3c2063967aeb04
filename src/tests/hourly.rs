use chrono::Duration;

use super::*;
use crate::{Record, truncate_to_hour};

#[test]
#[ignore = "requires TSMONGO_TEST_URI"]
fn test_same_hour_collapses() {
    let db = TestDb::open();
    let c = db.c_with_schema(Schema::hourly());
    let hour = truncate_to_hour(Utc::now());
    let t1 = hour + Duration::minutes(5);
    let t2 = hour + Duration::minutes(50);

    let res1 = c.upsert(TYPE1, &[Record::new(t1, 1)]).unwrap();
    assert_eq!((res1.matched, res1.modified), (1, 0));
    let res2 = c.upsert(TYPE1, &[Record::new(t2, 2)]).unwrap();
    assert_eq!((res2.matched, res2.modified), (1, 1));

    let raw = db.raw(c.schema(), TYPE1);
    assert_eq!(raw.len(), 1);

    let last: Record<i32> = c.last(TYPE1).unwrap();
    assert_eq!(last, Record::new(hour, 2));
}

#[test]
#[ignore = "requires TSMONGO_TEST_URI"]
fn test_distinct_hours_are_kept() {
    let db = TestDb::open();
    let c = db.c_with_schema(Schema::hourly());
    let hour = truncate_to_hour(Utc::now());

    c.upsert(
        TYPE1,
        &[
            Record::new(hour + Duration::minutes(59), 1),
            Record::new(hour + Duration::minutes(61), 2),
        ],
    )
    .unwrap();
    assert_eq!(db.raw(c.schema(), TYPE1).len(), 2);

    let rec: Vec<Record<i32>> = c
        .interval(TYPE1, hour + Duration::minutes(30), hour + Duration::minutes(90))
        .unwrap();
    assert_eq!(rec, vec![Record::new(hour, 1), Record::new(hour + Duration::hours(1), 2)]);
}

#[test]
#[ignore = "requires TSMONGO_TEST_URI"]
fn test_same_hour_in_one_batch_later_wins() {
    let db = TestDb::open();
    let c = db.c_with_schema(Schema::hourly());
    let hour = truncate_to_hour(Utc::now());

    let res = c
        .upsert(
            TYPE1,
            &[
                Record::new(hour + Duration::minutes(10), 1),
                Record::new(hour + Duration::minutes(40), 2),
            ],
        )
        .unwrap();
    assert_eq!((res.matched, res.modified, res.upserted), (1, 0, 1));

    assert_eq!(db.raw(c.schema(), TYPE1).len(), 1);
    let last: Record<i32> = c.last(TYPE1).unwrap();
    assert_eq!(last, Record::new(hour, 2));
}
