//! Integration tests for the dataset crate.
//!
//! These exercise the full ingest -> trainset -> query path on the small
//! book-rating fixture and on the documented boundary cases.

use dataset::{
    Dataset, DatasetError, EntityId, FieldValue, InfoTable, RawId, RawRating, Table, Trainset,
};
use std::collections::HashSet;

fn books() -> Table {
    Table::from_columns(vec![
        (
            "ISBN",
            vec![
                "0195153448".into(),
                "0002005018".into(),
                "0060973129".into(),
                "0374157065".into(),
                "0393045218".into(),
            ],
        ),
        (
            "Book-title",
            vec![
                "Classical Mythology".into(),
                "Clara Callan".into(),
                "Decision in Normandy".into(),
                "Flu: The Story of the Great Influenza".into(),
                "The Mummies".into(),
            ],
        ),
        (
            "year",
            vec![
                FieldValue::Int(2002),
                FieldValue::Int(2001),
                FieldValue::Int(1991),
                FieldValue::Int(1999),
                FieldValue::Int(1999),
            ],
        ),
    ])
    .unwrap()
}

fn users() -> Table {
    Table::from_columns(vec![
        ("User", (1..=5).map(FieldValue::Int).collect()),
        (
            "Name",
            vec!["Thomas".into(), "Henry".into(), "Joe".into(), "Lili".into(), "Jonas".into()],
        ),
    ])
    .unwrap()
}

/// Ratings keyed (ISBN, User, rating): positional ingestion makes the
/// ISBN column the user column.
fn book_ratings() -> Table {
    let isbns = [
        "0195153448", "0195153448", "0195153448", "0002005018", "0002005018",
        "0060973129", "0374157065", "0374157065", "0393045218",
    ];
    let users = [1, 2, 4, 1, 3, 2, 2, 1, 4];
    let ratings = [3, 4, 3, 5, 5, 3, 2, 1, 3];
    Table::from_columns(vec![
        ("ISBN", isbns.iter().map(|&s| FieldValue::from(s)).collect()),
        ("User", users.iter().map(|&u| FieldValue::Int(u)).collect()),
        ("ratings", ratings.iter().map(|&r| FieldValue::Int(r)).collect()),
    ])
    .unwrap()
}

/// Ratings keyed (User, ISBN, rating), the natural orientation
fn user_book_ratings() -> Trainset {
    let table = book_ratings();
    let swapped: Vec<RawRating> = table
        .rows()
        .iter()
        .map(|row| RawRating {
            user: row[1].to_raw_id().unwrap(),
            item: row[0].to_raw_id().unwrap(),
            rating: row[2].as_f64().unwrap(),
            timestamp: None,
        })
        .collect();
    Dataset::from_ratings(swapped).build_trainset()
}

#[test]
fn test_build_full_trainset() {
    let trainset = Dataset::from_table(&book_ratings()).unwrap().build_trainset();

    assert_eq!(trainset.n_users(), 5);
    assert_eq!(trainset.n_items(), 4);
    assert_eq!(trainset.n_ratings(), 9);
    assert_eq!(trainset.rating_scale(), Some((1.0, 5.0)));
}

#[test]
fn test_iterate_over_trainset() {
    let trainset = Dataset::from_table(&book_ratings()).unwrap().build_trainset();

    let first: Vec<_> = trainset.all_ratings().collect();
    assert_eq!(first.len(), 9);
    assert_eq!(first[0], (0, 0, 3.0));

    // Restartable: a second pass yields the same sequence
    let second: Vec<_> = trainset.all_ratings().collect();
    assert_eq!(first, second);
}

#[test]
fn test_scenario_small_ingest() {
    let trainset = Dataset::from_ratings(vec![
        RawRating::new(1, "a", 3.0),
        RawRating::new(2, "a", 4.0),
    ])
    .build_trainset();

    assert_eq!(trainset.n_users(), 2);
    assert_eq!(trainset.n_items(), 1);
    assert_eq!(trainset.to_inner_uid(&1.into()).unwrap(), 0);
    assert_eq!(trainset.to_inner_uid(&2.into()).unwrap(), 1);
    assert_eq!(trainset.to_inner_iid(&"a".into()).unwrap(), 0);
    assert_eq!(trainset.user_ratings(0).unwrap(), &[(0, 3.0)]);
}

#[test]
fn test_unknown_raw_id() {
    let trainset = user_book_ratings();

    let err = trainset.to_inner_uid(&99.into()).unwrap_err();
    assert!(matches!(err, DatasetError::UnknownEntity { .. }));
    assert_eq!(err.to_string(), "user 99 is not part of the trainset");

    assert!(matches!(
        trainset.to_raw_iid(trainset.n_items()),
        Err(DatasetError::InvalidInnerId { .. })
    ));
}

#[test]
fn test_mappings_ids() {
    // Item ids 1, 2 and user ids mixing integers with a string
    let trainset = Dataset::from_ratings(vec![
        RawRating::new(9, 1, 3.0),
        RawRating::new(32, 1, 2.0),
        RawRating::new(2, 1, 4.0),
        RawRating::new(45, 2, 3.0),
        RawRating::new("10000", 2, 1.0),
    ])
    .build_trainset();

    let uid9 = trainset.to_inner_uid(&9.into()).unwrap();
    let uid2 = trainset.to_inner_uid(&2.into()).unwrap();
    let iid1 = trainset.to_inner_iid(&1.into()).unwrap();
    assert_eq!(trainset.user_ratings(uid9).unwrap(), &[(iid1, 3.0)]);
    assert_eq!(trainset.user_ratings(uid2).unwrap(), &[(iid1, 4.0)]);

    // String and integer forms are different users
    assert!(trainset.to_inner_uid(&"10000".into()).is_ok());
    assert!(trainset.to_inner_uid(&10000.into()).is_err());
}

#[test]
fn test_bijection_and_dense_ids() {
    let trainset = user_book_ratings();

    for uid in trainset.all_users() {
        let raw = trainset.to_raw_uid(uid).unwrap().clone();
        assert_eq!(trainset.to_inner_uid(&raw).unwrap(), uid);
    }
    let raw_items: HashSet<RawId> = trainset
        .all_items()
        .map(|iid| trainset.to_raw_iid(iid).unwrap().clone())
        .collect();
    assert_eq!(raw_items.len(), trainset.n_items());
    for raw in &raw_items {
        let iid = trainset.to_inner_iid(raw).unwrap();
        assert!(iid < trainset.n_items());
    }
}

#[test]
fn test_adjacency_totals() {
    let trainset = user_book_ratings();

    let by_user: usize = trainset
        .all_users()
        .map(|u| trainset.user_ratings(u).unwrap().len())
        .sum();
    let by_item: usize = trainset
        .all_items()
        .map(|i| trainset.item_ratings(i).unwrap().len())
        .sum();
    assert_eq!(by_user, 9);
    assert_eq!(by_item, 9);
    assert_eq!(trainset.all_ratings().count(), trainset.n_ratings());
}

#[test]
fn test_global_mean() {
    let trainset = user_book_ratings();
    let expected = [3.0, 4.0, 3.0, 5.0, 5.0, 3.0, 2.0, 1.0, 3.0].iter().sum::<f64>() / 9.0;

    let mean = trainset.global_mean().unwrap();
    assert!((mean - expected).abs() < 1e-12);
    assert_eq!(trainset.global_mean().unwrap(), mean);
}

#[test]
fn test_empty_trainset_mean() {
    let trainset = Dataset::default().build_trainset();
    assert_eq!(trainset.n_ratings(), 0);
    assert!(matches!(trainset.global_mean(), Err(DatasetError::EmptyTrainset)));
}

#[test]
fn test_info_data() {
    let mut trainset = user_book_ratings();
    trainset.set_item_info(InfoTable::new(&books(), "ISBN").unwrap());
    trainset.set_user_info(InfoTable::new(&users(), "User").unwrap());

    let book = trainset
        .get_itemid_info(&EntityId::Raw("0195153448".into()), None)
        .unwrap();
    assert_eq!(book["Book-title"], FieldValue::from("Classical Mythology"));

    let year = trainset
        .get_itemid_info(&EntityId::Raw("0002005018".into()), Some(&["year"]))
        .unwrap();
    assert_eq!(year["year"], FieldValue::Int(2001));

    let user = trainset.get_userid_info(&EntityId::Raw(1.into()), None).unwrap();
    assert_eq!(user.len(), 1);
    assert_eq!(user["Name"], FieldValue::from("Thomas"));

    // Inner id 0 is the first user ingested (user 1)
    let by_inner = trainset.get_userid_info(&EntityId::Inner(0), None).unwrap();
    assert_eq!(by_inner, user);

    assert!(matches!(
        trainset.get_itemid_info(&EntityId::Raw("Y".into()), None),
        Err(DatasetError::UnknownEntity { .. })
    ));
}

#[test]
fn test_missing_info_table() {
    let trainset = user_book_ratings();
    assert!(matches!(
        trainset.get_userid_info(&EntityId::Raw(1.into()), None),
        Err(DatasetError::MissingInfoTable { .. })
    ));
}

#[test]
fn test_info_table_last_set_wins() {
    let mut trainset = user_book_ratings();
    trainset.set_user_info(InfoTable::new(&users(), "User").unwrap());

    let renamed = Table::from_columns(vec![
        ("User", vec![FieldValue::Int(1)]),
        ("Nick", vec![FieldValue::from("tom")]),
    ])
    .unwrap();
    trainset.set_user_info(InfoTable::new(&renamed, "User").unwrap());

    let user = trainset.get_userid_info(&EntityId::Raw(1.into()), None).unwrap();
    assert!(!user.contains_key("Name"));
    assert_eq!(user["Nick"], FieldValue::from("tom"));
    assert!(trainset.get_userid_info(&EntityId::Raw(2.into()), None).is_err());
}
