use std::path::Path;
use std::sync::{Arc, Mutex};

use gitea_mirror::event::{MirrorEvent, ReportSink};
use gitea_mirror::gitea_provider::GiteaProvider;
use gitea_mirror::{
    CloneError, ExistingPolicy, ListingError, Mirror, MirrorConfig, MirrorError, MirrorOptions,
    RepositoryOutcome, SkipReason, SourceConfig,
};
use serde_json::json;
use wiremock::MockServer;

use crate::mocks::gitea::{list_repos_error_mock, list_repos_mock, repo_json, TOKEN};
use crate::mocks::vcs::RecordingVcs;

fn mirror(
    server: &MockServer,
    target: &Path,
    options: MirrorOptions,
    vcs: Arc<RecordingVcs>,
) -> (Mirror, Arc<Mutex<Vec<MirrorEvent>>>) {
    let source = SourceConfig::new(&server.uri(), "alice", TOKEN, target).unwrap();
    let config = MirrorConfig::new(source, options).unwrap();
    let lister = GiteaProvider::new(&config.source, &config.options).unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    let sink: Arc<dyn ReportSink> =
        Arc::new(move |e: &MirrorEvent| events_clone.lock().unwrap().push(e.clone()));

    (Mirror::new(config, Arc::new(lister), vcs, sink), events)
}

fn single_page() -> MirrorOptions {
    MirrorOptions {
        follow_pagination: false,
        ..MirrorOptions::default()
    }
}

mod fetch {
    use super::*;

    #[tokio::test]
    async fn clones_and_skips_repositories_without_url() {
        let mock_server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("mirror");
        let repo_a_url = format!("{}/alice/repoA.git", mock_server.uri());

        list_repos_mock(
            "alice",
            Some(1),
            json!([repo_json("repoA", Some(&repo_a_url)), repo_json("repoB", None)]),
        )
        .mount(&mock_server)
        .await;

        let vcs = Arc::new(RecordingVcs::default());
        let (mirror, events) = mirror(&mock_server, &target, MirrorOptions::default(), vcs.clone());

        let summary = mirror.run().await.unwrap();

        assert!(target.is_dir());
        assert_eq!(vcs.clones(), vec![(repo_a_url, target.join("repoA"))]);
        assert_eq!(summary.results[0].outcome, RepositoryOutcome::Cloned);
        assert_eq!(summary.results[0].destination, Some(target.join("repoA")));
        assert_eq!(
            summary.results[1].outcome,
            RepositoryOutcome::Skipped(SkipReason::NoCloneUrl)
        );
        assert_eq!(
            (summary.cloned(), summary.skipped(), summary.failed()),
            (1, 1, 0)
        );
        assert!(matches!(
            events.lock().unwrap().last(),
            Some(MirrorEvent::Finished(_))
        ));

        mock_server.verify().await;
    }

    #[tokio::test]
    async fn failing_clone_is_isolated() {
        let mock_server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let urls: Vec<String> = ["first", "second", "third"]
            .iter()
            .map(|name| format!("https://git.example.com/alice/{}.git", name))
            .collect();

        list_repos_mock(
            "alice",
            None,
            json!([
                repo_json("first", Some(&urls[0])),
                repo_json("second", Some(&urls[1])),
                repo_json("third", Some(&urls[2])),
            ]),
        )
        .mount(&mock_server)
        .await;

        let vcs = Arc::new(RecordingVcs::failing(&[&urls[1]]));
        let (mirror, _) = mirror(&mock_server, dir.path(), single_page(), vcs.clone());

        let summary = mirror.run().await.unwrap();

        let attempted: Vec<_> = vcs.clones().into_iter().map(|(url, _)| url).collect();
        assert_eq!(attempted, urls);
        assert_eq!(summary.results[0].outcome, RepositoryOutcome::Cloned);
        assert!(matches!(
            summary.results[1].outcome,
            RepositoryOutcome::Failed(CloneError::Exit { code: Some(128), .. })
        ));
        assert_eq!(summary.results[2].outcome, RepositoryOutcome::Cloned);
        assert_eq!(summary.attempted(), 3);
    }

    #[tokio::test]
    async fn listing_error_attempts_nothing() {
        let mock_server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        list_repos_error_mock("alice", 500)
            .mount(&mock_server)
            .await;

        let vcs = Arc::new(RecordingVcs::default());
        let (mirror, _) = mirror(&mock_server, dir.path(), single_page(), vcs.clone());

        let err = mirror.run().await.unwrap_err();

        assert!(matches!(
            err,
            MirrorError::Listing(ListingError::Status { status: 500, .. })
        ));
        assert!(vcs.clones().is_empty());
    }

    #[tokio::test]
    async fn empty_account_completes_cleanly() {
        let mock_server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        list_repos_mock("alice", None, json!([]))
            .mount(&mock_server)
            .await;

        let vcs = Arc::new(RecordingVcs::default());
        let (mirror, _) = mirror(&mock_server, dir.path(), single_page(), vcs.clone());

        let summary = mirror.run().await.unwrap();

        assert_eq!(summary.total(), 0);
        assert!(vcs.clones().is_empty());
    }
}

mod rerun {
    use super::*;

    async fn serve_one_repo(mock_server: &MockServer) -> String {
        let url = "https://git.example.com/alice/repoA.git".to_string();
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_json(json!([repo_json("repoA", Some(&url))])),
            )
            .mount(mock_server)
            .await;
        url
    }

    #[tokio::test]
    async fn existing_clone_is_skipped_by_default() {
        let mock_server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        serve_one_repo(&mock_server).await;

        let vcs = Arc::new(RecordingVcs::default());
        let (mirror, _) = mirror(&mock_server, dir.path(), single_page(), vcs.clone());

        let first = mirror.run().await.unwrap();
        let second = mirror.run().await.unwrap();

        assert_eq!(first.cloned(), 1);
        assert_eq!(
            second.results[0].outcome,
            RepositoryOutcome::Skipped(SkipReason::AlreadyPresent)
        );
        assert_eq!(vcs.clones().len(), 1);
    }

    #[tokio::test]
    async fn existing_clone_fails_under_fail_policy() {
        let mock_server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("repoA")).unwrap();
        serve_one_repo(&mock_server).await;

        let options = MirrorOptions {
            on_existing: ExistingPolicy::Fail,
            ..single_page()
        };
        let vcs = Arc::new(RecordingVcs::default());
        let (mirror, _) = mirror(&mock_server, dir.path(), options, vcs.clone());

        let summary = mirror.run().await.unwrap();

        assert_eq!(
            summary.results[0].outcome,
            RepositoryOutcome::Failed(CloneError::DestinationExists(dir.path().join("repoA")))
        );
        assert!(vcs.clones().is_empty());
    }

    #[tokio::test]
    async fn existing_clone_is_updated_under_update_policy() {
        let mock_server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("repoA")).unwrap();
        serve_one_repo(&mock_server).await;

        let options = MirrorOptions {
            on_existing: ExistingPolicy::Update,
            ..single_page()
        };
        let vcs = Arc::new(RecordingVcs::default());
        let (mirror, _) = mirror(&mock_server, dir.path(), options, vcs.clone());

        let summary = mirror.run().await.unwrap();

        assert_eq!(summary.updated(), 1);
        assert_eq!(vcs.updates(), vec![dir.path().join("repoA")]);
        assert!(vcs.clones().is_empty());
    }
}
