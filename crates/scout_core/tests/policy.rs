use scout_core::{should_emit, EpisodeIdentity, ExistingLibraryState, Language, SyncPolicy};

fn policy(only_latest_episodes: bool) -> SyncPolicy {
    SyncPolicy {
        only_latest_episodes,
        language: Language::English,
        preferred_hoster: "share-online".to_string(),
    }
}

fn ep(season: u32, episode: u32) -> EpisodeIdentity {
    EpisodeIdentity::new("Show", season, episode)
}

fn library(entries: &[(u32, u32)]) -> ExistingLibraryState {
    ExistingLibraryState::new(entries.iter().map(|(s, e)| ep(*s, *e)).collect())
}

#[test]
fn only_latest_emits_strictly_newer_episodes() {
    let existing = library(&[(1, 10), (2, 4), (2, 5)]);
    let only_latest = policy(true);

    assert!(should_emit(&ep(2, 6), &existing, &only_latest));
    assert!(should_emit(&ep(3, 1), &existing, &only_latest));
    assert!(!should_emit(&ep(2, 5), &existing, &only_latest));
    assert!(!should_emit(&ep(1, 10), &existing, &only_latest));
}

#[test]
fn only_latest_ignores_older_gaps() {
    let existing = library(&[(1, 1), (1, 5)]);
    assert!(!should_emit(&ep(1, 3), &existing, &policy(true)));
}

#[test]
fn full_catalog_emits_only_missing_episodes() {
    let existing = library(&[(1, 1), (1, 2)]);
    let full = policy(false);

    let emitted: Vec<EpisodeIdentity> = [ep(1, 1), ep(1, 3)]
        .into_iter()
        .filter(|candidate| should_emit(candidate, &existing, &full))
        .collect();

    assert_eq!(emitted, vec![ep(1, 3)]);
}

#[test]
fn full_catalog_compares_full_identity() {
    let existing = ExistingLibraryState::new(vec![EpisodeIdentity::new("Other", 1, 1)]);
    assert!(should_emit(&ep(1, 1), &existing, &policy(false)));
}

#[test]
fn empty_library_treats_everything_as_new() {
    let empty = ExistingLibraryState::default();
    assert!(should_emit(&ep(1, 1), &empty, &policy(true)));
    assert!(should_emit(&ep(1, 1), &empty, &policy(false)));
}

#[test]
fn decision_is_idempotent() {
    let existing = library(&[(2, 5)]);
    for only_latest in [true, false] {
        let p = policy(only_latest);
        for candidate in [ep(2, 4), ep(2, 5), ep(2, 6)] {
            assert_eq!(
                should_emit(&candidate, &existing, &p),
                should_emit(&candidate, &existing, &p)
            );
        }
    }
}

#[test]
fn language_filter_is_case_insensitive() {
    assert!(Language::German.accepts("Show.S01E01.German.720p"));
    assert!(Language::German.accepts("Show.S01E01.GERMAN.DUBBED.720p"));
    assert!(!Language::German.accepts("Show.S01E01.720p"));
    assert!(Language::English.accepts("anything"));
}
