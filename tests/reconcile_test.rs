use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use futures::{StreamExt, pin_mut};
use playlist2spotify::error::{RemoteError, RunError};
use playlist2spotify::reconcile::{APPEND_BATCH_SIZE, Outcome, Reconciler, RunOptions};
use playlist2spotify::spotify::{Catalog, paging::paginate};
use playlist2spotify::types::{Page, PlaylistHandle, TrackRef};
use reqwest::StatusCode;

const PLAYLIST_TRACKS_PAGE_SIZE: usize = 2;

fn remote_failure() -> RemoteError {
    RemoteError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "boom".to_string(),
    }
}

#[derive(Default)]
struct Calls {
    searches: Vec<String>,
    playlist_pages: usize,
    track_pages: usize,
    created: Vec<(String, String, bool, String)>,
    appended: Vec<Vec<String>>,
}

/// In-memory catalog: search answers keyed by query, playlists split into
/// pages, and one playlist whose content grows with every append.
#[derive(Default)]
struct FakeCatalog {
    search_results: HashMap<String, String>,
    failing_searches: HashSet<String>,
    playlist_pages: Vec<Vec<PlaylistHandle>>,
    playlists_fail: bool,
    create_fails: bool,
    tracks_fail: bool,
    fail_append_call: Option<usize>,
    content: Mutex<Vec<String>>,
    calls: Mutex<Calls>,
}

impl FakeCatalog {
    fn with_playlist(name: &str) -> Self {
        FakeCatalog {
            playlist_pages: vec![vec![playlist("pl-1", name)]],
            ..Default::default()
        }
    }

    fn track(mut self, query: &str, id: &str) -> Self {
        self.search_results.insert(query.to_string(), id.to_string());
        self
    }

    fn containing(self, ids: &[&str]) -> Self {
        *self.content.lock().unwrap() = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    fn content(&self) -> Vec<String> {
        self.content.lock().unwrap().clone()
    }

    fn appended(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().appended.clone()
    }
}

fn playlist(id: &str, name: &str) -> PlaylistHandle {
    PlaylistHandle {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn page_index(cursor: Option<String>) -> usize {
    cursor.map(|c| c.parse().unwrap()).unwrap_or(0)
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn search_track_ids(&self, query: &str, _limit: u32) -> Result<Vec<String>, RemoteError> {
        self.calls.lock().unwrap().searches.push(query.to_string());
        if self.failing_searches.contains(query) {
            return Err(remote_failure());
        }
        Ok(self.search_results.get(query).cloned().into_iter().collect())
    }

    async fn current_user_id(&self) -> Result<String, RemoteError> {
        Ok("user-1".to_string())
    }

    async fn playlists_page(
        &self,
        cursor: Option<String>,
    ) -> Result<Page<PlaylistHandle>, RemoteError> {
        self.calls.lock().unwrap().playlist_pages += 1;
        if self.playlists_fail {
            return Err(remote_failure());
        }

        let idx = page_index(cursor);
        Ok(Page {
            items: self.playlist_pages.get(idx).cloned().unwrap_or_default(),
            next: (idx + 1 < self.playlist_pages.len()).then(|| (idx + 1).to_string()),
        })
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<PlaylistHandle, RemoteError> {
        self.calls.lock().unwrap().created.push((
            user_id.to_string(),
            name.to_string(),
            public,
            description.to_string(),
        ));
        if self.create_fails {
            return Err(remote_failure());
        }
        Ok(playlist("pl-new", name))
    }

    async fn playlist_track_ids_page(
        &self,
        _playlist_id: &str,
        cursor: Option<String>,
    ) -> Result<Page<Option<String>>, RemoteError> {
        self.calls.lock().unwrap().track_pages += 1;
        if self.tracks_fail {
            return Err(remote_failure());
        }

        let idx = page_index(cursor);
        let content = self.content.lock().unwrap();
        let start = idx * PLAYLIST_TRACKS_PAGE_SIZE;
        let end = (start + PLAYLIST_TRACKS_PAGE_SIZE).min(content.len());
        Ok(Page {
            items: content[start.min(end)..end].iter().cloned().map(Some).collect(),
            next: (end < content.len()).then(|| (idx + 1).to_string()),
        })
    }

    async fn append_tracks(&self, _playlist_id: &str, uris: &[String]) -> Result<(), RemoteError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.appended.push(uris.to_vec());
            calls.appended.len()
        };
        if self.fail_append_call == Some(call) {
            return Err(remote_failure());
        }

        let mut content = self.content.lock().unwrap();
        for uri in uris {
            content.push(uri.trim_start_matches("spotify:track:").to_string());
        }
        Ok(())
    }
}

fn options(name: &str) -> RunOptions {
    RunOptions::new(name, "/music/mix.m3u")
}

fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("id{}", i)).collect()
}

#[tokio::test]
async fn test_search_track_constrains_artist_when_known() {
    let catalog = FakeCatalog::default()
        .track("track:One More Time artist:Daft Punk", "t1")
        .track("track:Intro", "t2");
    let reconciler = Reconciler::new(&catalog);

    assert_eq!(
        reconciler.search_track("Daft Punk", "One More Time").await,
        Some("t1".to_string())
    );
    assert_eq!(reconciler.search_track("", "Intro").await, Some("t2".to_string()));
    assert_eq!(reconciler.search_track("", "Unknown").await, None);
}

#[tokio::test]
async fn test_search_track_remote_error_is_no_result() {
    let mut catalog = FakeCatalog::default().track("track:Song", "t1");
    catalog.failing_searches.insert("track:Song".to_string());

    assert_eq!(Reconciler::new(&catalog).search_track("", "Song").await, None);
}

#[tokio::test]
async fn test_find_playlist_ignores_case_and_stops_at_match() {
    let catalog = FakeCatalog {
        playlist_pages: vec![
            vec![playlist("a", "Workout")],
            vec![playlist("b", "Road Trip")],
            vec![playlist("c", "Chill")],
        ],
        ..Default::default()
    };

    let found = Reconciler::new(&catalog).find_playlist("road trip").await;
    assert_eq!(found, Some("b".to_string()));
    assert_eq!(catalog.calls.lock().unwrap().playlist_pages, 2);
}

#[tokio::test]
async fn test_find_playlist_enumerates_all_pages() {
    let catalog = FakeCatalog {
        playlist_pages: vec![vec![playlist("a", "One")], vec![playlist("b", "Two")]],
        ..Default::default()
    };

    assert_eq!(Reconciler::new(&catalog).find_playlist("Three").await, None);
    assert_eq!(catalog.calls.lock().unwrap().playlist_pages, 2);
}

#[tokio::test]
async fn test_find_playlist_remote_error_is_no_result() {
    let catalog = FakeCatalog {
        playlists_fail: true,
        ..FakeCatalog::with_playlist("Mix")
    };

    assert_eq!(Reconciler::new(&catalog).find_playlist("Mix").await, None);
}

#[tokio::test]
async fn test_create_playlist_is_private() {
    let catalog = FakeCatalog::default();
    let id = Reconciler::new(&catalog)
        .create_playlist("Mix", "Imported from mix.m3u")
        .await;

    assert_eq!(id, Some("pl-new".to_string()));
    assert_eq!(
        catalog.calls.lock().unwrap().created,
        vec![(
            "user-1".to_string(),
            "Mix".to_string(),
            false,
            "Imported from mix.m3u".to_string()
        )]
    );
}

#[tokio::test]
async fn test_create_playlist_failure_returns_none() {
    let catalog = FakeCatalog {
        create_fails: true,
        ..Default::default()
    };

    assert_eq!(Reconciler::new(&catalog).create_playlist("Mix", "").await, None);
}

#[tokio::test]
async fn test_add_tracks_splits_into_batches_of_100() {
    let catalog = FakeCatalog::default();
    let all = ids(250);

    assert!(Reconciler::new(&catalog).add_tracks_to_playlist("pl-1", &all).await);

    let batches = catalog.appended();
    let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![APPEND_BATCH_SIZE, APPEND_BATCH_SIZE, 50]);

    let expected: Vec<String> = all.iter().map(|id| format!("spotify:track:{}", id)).collect();
    assert_eq!(batches.concat(), expected);
    assert_eq!(catalog.content(), all);
}

#[tokio::test]
async fn test_add_tracks_exact_multiple_of_batch_size() {
    let catalog = FakeCatalog::default();

    assert!(Reconciler::new(&catalog).add_tracks_to_playlist("pl-1", &ids(200)).await);
    assert_eq!(catalog.appended().len(), 2);
}

#[tokio::test]
async fn test_add_tracks_failure_keeps_earlier_batches() {
    let catalog = FakeCatalog {
        fail_append_call: Some(2),
        ..Default::default()
    };

    let ok = Reconciler::new(&catalog)
        .add_tracks_to_playlist("pl-1", &ids(250))
        .await;

    assert!(!ok);
    assert_eq!(catalog.appended().len(), 2);
    assert_eq!(catalog.content(), ids(100));
}

#[tokio::test]
async fn test_is_track_in_playlist_follows_pages() {
    let catalog = FakeCatalog::default().containing(&["a", "b", "c", "d", "e"]);
    let reconciler = Reconciler::new(&catalog);

    assert!(reconciler.is_track_in_playlist("pl-1", "d").await);
    assert_eq!(catalog.calls.lock().unwrap().track_pages, 2);

    assert!(!reconciler.is_track_in_playlist("pl-1", "z").await);
    assert_eq!(catalog.calls.lock().unwrap().track_pages, 5);
}

#[tokio::test]
async fn test_is_track_in_playlist_remote_error_is_false() {
    let catalog = FakeCatalog {
        tracks_fail: true,
        ..FakeCatalog::default().containing(&["a"])
    };

    assert!(!Reconciler::new(&catalog).is_track_in_playlist("pl-1", "a").await);
}

#[tokio::test]
async fn test_paginate_is_lazy_and_restartable() {
    let catalog = FakeCatalog {
        playlist_pages: vec![vec![playlist("a", "One")], vec![playlist("b", "Two")]],
        ..Default::default()
    };

    let catalog_ref = &catalog;
    let collect = move || async move {
        let pages = paginate(move |cursor| catalog_ref.playlists_page(cursor));
        pin_mut!(pages);
        let mut names = Vec::new();
        while let Some(page) = pages.next().await {
            names.extend(page.unwrap().into_iter().map(|p| p.name));
        }
        names
    };

    let unpolled = paginate(move |cursor| catalog_ref.playlists_page(cursor));
    drop(unpolled);
    assert_eq!(catalog.calls.lock().unwrap().playlist_pages, 0);

    assert_eq!(collect().await, vec!["One", "Two"]);
    assert_eq!(collect().await, vec!["One", "Two"]);
    assert_eq!(catalog.calls.lock().unwrap().playlist_pages, 4);
}

#[tokio::test]
async fn test_run_reports_not_found_and_excludes_them() {
    let catalog = FakeCatalog::with_playlist("Mix")
        .track("track:Yesterday artist:The Beatles", "t1")
        .track("track:Intro", "t3");
    let tracks = vec![
        TrackRef::new("The Beatles", "Yesterday"),
        TrackRef::new("Nobody", "Missing Song"),
        TrackRef::new("", "Intro"),
    ];

    let report = Reconciler::new(&catalog)
        .run(&tracks, &options("Mix"))
        .await
        .unwrap();

    assert_eq!(report.not_found, vec![TrackRef::new("Nobody", "Missing Song")]);
    assert_eq!(report.found_ids(), vec!["t1", "t3"]);
    assert_eq!(report.outcome, Outcome::Appended { added: 2 });
    assert_eq!(
        catalog.appended(),
        vec![vec!["spotify:track:t1".to_string(), "spotify:track:t3".to_string()]]
    );
    assert_eq!(
        catalog.calls.lock().unwrap().searches,
        vec![
            "track:Yesterday artist:The Beatles",
            "track:Missing Song artist:Nobody",
            "track:Intro"
        ]
    );
}

#[tokio::test]
async fn test_run_dry_run_does_not_append() {
    let catalog = FakeCatalog::with_playlist("Mix")
        .track("track:A", "a")
        .track("track:B", "b")
        .track("track:C", "c");
    let tracks = vec![
        TrackRef::new("", "A"),
        TrackRef::new("", "B"),
        TrackRef::new("", "C"),
    ];
    let options = RunOptions {
        dry_run: true,
        ..options("Mix")
    };

    let report = Reconciler::new(&catalog).run(&tracks, &options).await.unwrap();

    assert_eq!(report.outcome, Outcome::DryRun { would_add: 3 });
    assert!(catalog.appended().is_empty());
}

#[tokio::test]
async fn test_run_nothing_found_skips_append() {
    let catalog = FakeCatalog::with_playlist("Mix");
    let tracks = vec![TrackRef::new("", "Nothing")];

    let report = Reconciler::new(&catalog).run(&tracks, &options("Mix")).await.unwrap();

    assert_eq!(report.outcome, Outcome::NothingToAdd);
    assert_eq!(report.not_found.len(), 1);
    assert!(catalog.appended().is_empty());
}

#[tokio::test]
async fn test_run_missing_playlist_without_create_fails() {
    let catalog = FakeCatalog::with_playlist("Other").track("track:A", "a");
    let tracks = vec![TrackRef::new("", "A")];

    let result = Reconciler::new(&catalog).run(&tracks, &options("Mix")).await;

    assert!(matches!(result, Err(RunError::PlaylistNotFound(name)) if name == "Mix"));
    assert!(catalog.calls.lock().unwrap().searches.is_empty());
    assert!(catalog.calls.lock().unwrap().created.is_empty());
}

#[tokio::test]
async fn test_run_creates_missing_playlist() {
    let catalog = FakeCatalog::default().track("track:A", "a");
    let tracks = vec![TrackRef::new("", "A")];
    let options = RunOptions {
        create_playlist: true,
        ..options("Mix")
    };

    let report = Reconciler::new(&catalog).run(&tracks, &options).await.unwrap();

    assert_eq!(report.playlist, Some(playlist("pl-new", "Mix")));
    let created = catalog.calls.lock().unwrap().created.clone();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].3, "Imported from mix.m3u");
}

#[tokio::test]
async fn test_run_create_failure_is_fatal() {
    let catalog = FakeCatalog {
        create_fails: true,
        ..Default::default()
    };
    let options = RunOptions {
        create_playlist: true,
        ..options("Mix")
    };

    let result = Reconciler::new(&catalog)
        .run(&[TrackRef::new("", "A")], &options)
        .await;

    assert!(matches!(result, Err(RunError::PlaylistCreateFailed(_))));
}

#[tokio::test]
async fn test_run_append_failure_is_fatal() {
    let catalog = FakeCatalog {
        fail_append_call: Some(1),
        ..FakeCatalog::with_playlist("Mix").track("track:A", "a")
    };

    let result = Reconciler::new(&catalog)
        .run(&[TrackRef::new("", "A")], &options("Mix"))
        .await;

    assert!(matches!(result, Err(RunError::AppendFailed(name)) if name == "Mix"));
}

#[tokio::test]
async fn test_run_empty_track_list_fails() {
    let catalog = FakeCatalog::with_playlist("Mix");

    let result = Reconciler::new(&catalog).run(&[], &options("Mix")).await;

    assert!(matches!(result, Err(RunError::EmptyPlaylist)));
    assert_eq!(catalog.calls.lock().unwrap().playlist_pages, 0);
}

#[tokio::test]
async fn test_run_skip_duplicates_is_idempotent() {
    let catalog = FakeCatalog::with_playlist("Mix")
        .track("track:A", "a")
        .track("track:B", "b")
        .track("track:C", "c")
        .containing(&["x", "y", "b"]);
    let tracks = vec![
        TrackRef::new("", "A"),
        TrackRef::new("", "B"),
        TrackRef::new("", "C"),
        TrackRef::new("", "A"),
    ];
    let options = RunOptions {
        skip_duplicates: true,
        ..options("Mix")
    };

    let first = Reconciler::new(&catalog).run(&tracks, &options).await.unwrap();
    assert_eq!(first.found_ids(), vec!["a", "c"]);
    assert_eq!(first.skipped.len(), 2);
    assert!(first.not_found.is_empty());

    let second = Reconciler::new(&catalog).run(&tracks, &options).await.unwrap();
    assert_eq!(second.outcome, Outcome::NothingToAdd);
    assert_eq!(second.skipped.len(), 4);

    assert_eq!(catalog.content(), vec!["x", "y", "b", "a", "c"]);
}

#[tokio::test]
async fn test_run_without_skip_duplicates_appends_everything() {
    let catalog = FakeCatalog::with_playlist("Mix")
        .track("track:A", "a")
        .containing(&["a"]);
    let tracks = vec![TrackRef::new("", "A"), TrackRef::new("", "A")];

    let report = Reconciler::new(&catalog).run(&tracks, &options("Mix")).await.unwrap();

    assert_eq!(report.found_ids(), vec!["a", "a"]);
    assert_eq!(catalog.calls.lock().unwrap().track_pages, 0);
}
