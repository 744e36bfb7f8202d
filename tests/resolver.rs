//! Title Resolver Integration Tests
//!
//! Tests for stage priority, result bounds and the request scenarios.

use moviebot::library::{resolve, CatalogStore};
use tempfile::TempDir;

async fn catalog(entries: &[(&str, &str)]) -> (TempDir, CatalogStore) {
    let temp = TempDir::new().unwrap();
    let mut store = CatalogStore::new(temp.path().join("movies.json"));
    for (key, file_id) in entries {
        store.insert(*key, *file_id).await.unwrap();
    }
    (temp, store)
}

#[tokio::test]
async fn test_partial_title_matches_by_containment() {
    let (_temp, store) = catalog(&[("Inception 2010", "fileA")]).await;

    assert_eq!(resolve(&store, "inception"), vec!["Inception 2010"]);
}

#[tokio::test]
async fn test_typo_falls_back_to_fuzzy() {
    let (_temp, store) = catalog(&[("Interstellar 2014", "fileB")]).await;

    assert_eq!(resolve(&store, "intrsteller"), vec!["Interstellar 2014"]);
}

#[tokio::test]
async fn test_empty_catalog_resolves_to_nothing() {
    let (_temp, store) = catalog(&[]).await;

    assert!(resolve(&store, "anything").is_empty());
}

#[tokio::test]
async fn test_unrelated_query_resolves_to_nothing() {
    let (_temp, store) = catalog(&[("Inception 2010", "fileA")]).await;

    assert!(resolve(&store, "zzzz").is_empty());
}

#[tokio::test]
async fn test_containment_wins_over_closer_fuzzy_match() {
    // "Heat" has the higher similarity ratio to "Great", but containment
    // in "The Great Escape" is found first and stages never merge.
    let (_temp, store) = catalog(&[("Heat", "f1"), ("The Great Escape", "f2")]).await;

    let result = resolve(&store, "Great");
    assert_eq!(result, vec!["The Great Escape"]);
}

#[tokio::test]
async fn test_results_are_bounded_members_of_catalog() {
    let entries: Vec<(String, String)> = (0..10)
        .map(|i| (format!("Star Wars Episode {}", i), format!("f{}", i)))
        .collect();
    let refs: Vec<(&str, &str)> = entries
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let (_temp, store) = catalog(&refs).await;

    for query in ["star", "Star Wars Episod", "Str Wars", "Episode 7", "x", "wars"] {
        let result = resolve(&store, query);
        assert!(result.len() <= 3, "too many results for {:?}", query);
        for key in &result {
            assert!(store.lookup(key).is_some(), "{:?} not in catalog", key);
        }
    }
}

#[tokio::test]
async fn test_typo_drops_keys_below_cutoff() {
    let (_temp, store) = catalog(&[("Memento 2000", "f1"), ("Inception 2010", "f2")]).await;

    assert_eq!(resolve(&store, "myemento 00e"), vec!["Memento 2000"]);
}

#[tokio::test]
async fn test_typo_offers_every_key_at_or_above_cutoff() {
    let (_temp, store) = catalog(&[
        ("Avatar 2009", "f1"),
        ("Gladiator 2000", "f2"),
        ("Parasite 2019", "f3"),
    ])
    .await;

    assert_eq!(
        resolve(&store, "avatar 00m"),
        vec!["Avatar 2009", "Gladiator 2000"]
    );
}

#[tokio::test]
async fn test_typo_with_missing_letter() {
    let (_temp, store) = catalog(&[
        ("The Godfather 1972", "f1"),
        ("The Dark Knight 2008", "f2"),
        ("Goodfellas 1990", "f3"),
    ])
    .await;

    assert_eq!(resolve(&store, "the godfater"), vec!["The Godfather 1972"]);
}

#[tokio::test]
async fn test_equally_close_keys_are_offered_in_descending_order() {
    let entries: Vec<(String, String)> = (0..10)
        .map(|i| (format!("Star Wars Episode {}", i), format!("f{}", i)))
        .collect();
    let refs: Vec<(&str, &str)> = entries
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let (_temp, store) = catalog(&refs).await;

    assert_eq!(
        resolve(&store, "Str Wars"),
        vec![
            "Star Wars Episode 9",
            "Star Wars Episode 8",
            "Star Wars Episode 7"
        ]
    );
}

#[tokio::test]
async fn test_fuzzy_cutoff_is_inclusive() {
    // "ax" against "abc" scores exactly 2*1 / 5
    let (_temp, store) = catalog(&[("abc", "f1")]).await;
    assert_eq!(resolve(&store, "ax"), vec!["abc"]);

    // ...and 2*1 / 6 against "abcd"
    let (_temp, store) = catalog(&[("abcd", "f1")]).await;
    assert!(resolve(&store, "ax").is_empty());
}
