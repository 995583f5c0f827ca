//! Integration tests for the recommenders.
//!
//! These verify that every strategy works through the common trait on a
//! realistic small catalogue.

use dataset::{Dataset, DatasetError, FieldValue, InfoTable, RawId, RawRating, Table, Trainset};
use recommenders::{CollaborativeFilter, ContentFilter, Recommender, SvdRecommender};
use std::collections::HashSet;
use std::sync::Arc;

fn create_test_setup() -> Arc<Trainset> {
    let mut ratings = Vec::new();
    // Action fans
    for user in 1..=3 {
        ratings.push(RawRating::new(user, "die-hard", 5.0));
        ratings.push(RawRating::new(user, "heat", 4.0));
    }
    ratings.push(RawRating::new(2, "ronin", 5.0));
    ratings.push(RawRating::new(3, "ronin", 4.0));
    // Musical fans
    for user in 4..=6 {
        ratings.push(RawRating::new(user, "annie", 5.0));
        ratings.push(RawRating::new(user, "grease", 4.0));
    }
    ratings.push(RawRating::new(5, "cats", 5.0));
    ratings.push(RawRating::new(1, "annie", 1.0));

    let mut trainset = Dataset::from_ratings(ratings).build_trainset();

    let ids = ["die-hard", "heat", "ronin", "annie", "grease", "cats"];
    let action = [1, 1, 1, 0, 0, 0];
    let musical = [0, 0, 0, 1, 1, 1];
    let movies = Table::from_columns(vec![
        ("movie_id", ids.iter().map(|&s| FieldValue::from(s)).collect()),
        ("title", ids.iter().map(|&s| FieldValue::from(s.to_uppercase())).collect()),
        ("year", ids.iter().map(|_| FieldValue::Int(1995)).collect()),
        ("Action", action.iter().map(|&v| FieldValue::Int(v)).collect()),
        ("Musical", musical.iter().map(|&v| FieldValue::Int(v)).collect()),
    ])
    .unwrap();
    trainset.set_item_info(InfoTable::new(&movies, "movie_id").unwrap());

    Arc::new(trainset)
}

fn all_strategies(trainset: &Arc<Trainset>) -> Vec<Box<dyn Recommender>> {
    vec![
        Box::new(ContentFilter::new(Arc::clone(trainset))),
        Box::new(SvdRecommender::new(Arc::clone(trainset)).with_components(2)),
        Box::new(CollaborativeFilter::new(Arc::clone(trainset))),
    ]
}

#[test]
fn test_strategies_never_return_rated_items() {
    let trainset = create_test_setup();

    for mut strategy in all_strategies(&trainset) {
        strategy.fit().unwrap();

        for uid in trainset.all_users() {
            let user = trainset.to_raw_uid(uid).unwrap().clone();
            let rated: HashSet<usize> =
                trainset.user_ratings(uid).unwrap().iter().map(|&(i, _)| i).collect();

            let recs = strategy.recommend(&user, 3).unwrap();
            assert!(recs.len() <= 3, "{} returned too many", strategy.name());
            for rec in &recs {
                assert!(!rated.contains(&rec.inner_iid), "{} returned a rated item", strategy.name());
                assert_eq!(trainset.to_inner_iid(&rec.item).unwrap(), rec.inner_iid);
            }
            for pair in recs.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
        }
    }
}

#[test]
fn test_action_fan_gets_action_movie() {
    let trainset = create_test_setup();

    // User 1 rated die-hard, heat (action) and annie; ronin is the unseen action film
    for mut strategy in all_strategies(&trainset) {
        strategy.fit().unwrap();
        let recs = strategy.recommend(&1.into(), 1).unwrap();
        assert_eq!(recs[0].item, RawId::from("ronin"), "{}", strategy.name());
    }
}

#[test]
fn test_unknown_user_is_reported() {
    let trainset = create_test_setup();

    for mut strategy in all_strategies(&trainset) {
        strategy.fit().unwrap();
        let err = strategy.recommend(&"nobody".into(), 3).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatasetError>(),
            Some(DatasetError::UnknownEntity { .. })
        ));
    }
}
