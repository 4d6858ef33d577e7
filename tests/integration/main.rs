//! Integration tests for precache

mod lifecycle_tests {
    use async_trait::async_trait;
    use precache::http::{Method, Request, Response, BUST_PARAM};
    use precache::net::Network;
    use precache::store::{MemoryStores, StoreRegistry};
    use precache::{OfflineWorker, PrecacheResult, WorkerConfig, WorkerPhase};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::EnvFilter;
    use url::Url;

    /// Honors RUST_LOG so a failing scenario can be rerun with lifecycle
    /// tracing visible; safe to call from every test
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Scripted origin server keyed by URL path, counting every fetch
    ///
    /// Busting only touches the query string, so path-keyed responses answer
    /// busted install fetches the same as plain ones.
    #[derive(Default)]
    struct ScriptedNetwork {
        responses: HashMap<String, Response>,
        calls: AtomicUsize,
        fetched: Mutex<Vec<String>>,
    }

    impl ScriptedNetwork {
        fn with_resource(mut self, path: &str, body: &[u8]) -> Self {
            self.responses
                .insert(path.to_string(), Response::with_body(200, body.to_vec()));
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn fetched_urls(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Network for ScriptedNetwork {
        async fn fetch(&self, request: &Request) -> PrecacheResult<Response> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.fetched.lock().unwrap().push(request.url.to_string());
            match self.responses.get(request.url.path()) {
                Some(response) => Ok(response.clone()),
                None => Ok(Response::with_body(404, b"not found".to_vec())),
            }
        }
    }

    fn config(version: &str, resources: &[&str]) -> WorkerConfig {
        WorkerConfig::new(
            "example.test/app",
            version,
            resources.iter().map(|s| s.to_string()).collect(),
            Url::parse("https://example.test/app/").unwrap(),
        )
        .unwrap()
    }

    fn worker(
        version: &str,
        resources: &[&str],
        stores: &Arc<MemoryStores>,
        network: &Arc<ScriptedNetwork>,
    ) -> OfflineWorker {
        init_tracing();
        OfflineWorker::new(
            config(version, resources),
            Arc::clone(stores) as Arc<dyn StoreRegistry>,
            Arc::clone(network) as Arc<dyn Network>,
        )
    }

    fn get(path: &str) -> Request {
        Request::get(Url::parse(&format!("https://example.test/app{}", path)).unwrap())
    }

    #[tokio::test]
    async fn end_to_end_single_resource() {
        let stores = Arc::new(MemoryStores::new());
        let network =
            Arc::new(ScriptedNetwork::default().with_resource("/app/index.html", b"<html>"));
        let worker = worker("v1", &["./index.html"], &stores, &network);

        // Install: one entry keyed by the absolute resource URL
        let report = worker.install().await.unwrap();
        assert!(report.is_complete());
        assert_eq!(report.store_name, "offline-cache:example.test/app:v1");
        assert_eq!(stores.entry_count(&report.store_name).await, 1);

        // Activate: only the current store remains
        worker.activate().await.unwrap();
        assert_eq!(
            stores.list_names().await.unwrap(),
            vec!["offline-cache:example.test/app:v1"]
        );

        // Cached GET: served with zero network calls
        let calls_before = network.calls();
        let response = worker.serve(&get("/index.html")).await.unwrap();
        assert_eq!(response.body, b"<html>");
        assert_eq!(network.calls(), calls_before);

        // Unlisted GET: exactly one network call, response passed through
        let response = worker.serve(&get("/missing.png")).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(network.calls(), calls_before + 1);
    }

    #[tokio::test]
    async fn phases_follow_the_lifecycle() {
        let stores = Arc::new(MemoryStores::new());
        let network =
            Arc::new(ScriptedNetwork::default().with_resource("/app/index.html", b"x"));
        let worker = worker("v1", &["./index.html"], &stores, &network);

        assert_eq!(worker.phase(), WorkerPhase::Uninstalled);
        worker.install().await.unwrap();
        assert_eq!(worker.phase(), WorkerPhase::InstalledInactive);
        worker.activate().await.unwrap();
        assert_eq!(worker.phase(), WorkerPhase::Active);
    }

    #[tokio::test]
    async fn failed_install_returns_to_uninstalled() {
        use precache::InstallPolicy;

        init_tracing();
        let stores = Arc::new(MemoryStores::new());
        let network = Arc::new(ScriptedNetwork::default());
        let config = config("v1", &["./index.html"]).with_policy(InstallPolicy::RequireAll);
        let worker = OfflineWorker::new(
            config,
            Arc::clone(&stores) as Arc<dyn StoreRegistry>,
            Arc::clone(&network) as Arc<dyn Network>,
        );

        assert!(worker.install().await.is_err());
        assert_eq!(worker.phase(), WorkerPhase::Uninstalled);
    }

    #[tokio::test]
    async fn install_busts_fetches_but_stores_original_keys() {
        let stores = Arc::new(MemoryStores::new());
        let network =
            Arc::new(ScriptedNetwork::default().with_resource("/app/index.html", b"x"));
        let worker = worker("v1", &["./index.html"], &stores, &network);

        worker.install().await.unwrap();

        for url in network.fetched_urls() {
            assert!(url.contains(BUST_PARAM), "install fetch not busted: {}", url);
        }

        // Lookup by the original canonical request succeeds
        let store = stores
            .open("offline-cache:example.test/app:v1")
            .await
            .unwrap();
        assert!(store.lookup(&get("/index.html")).await.unwrap().is_some());

        // Lookup by a busted URL fails: the parameter never leaks into keys
        let busted = Request::get(
            Url::parse("https://example.test/app/index.html?__bust=1234567890").unwrap(),
        );
        assert!(store.lookup(&busted).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn version_isolation_across_installs() {
        let stores = Arc::new(MemoryStores::new());
        let network = Arc::new(
            ScriptedNetwork::default()
                .with_resource("/app/index.html", b"one")
                .with_resource("/app/extra.css", b"two"),
        );

        let v1 = worker("v1", &["./index.html", "./extra.css"], &stores, &network);
        v1.install().await.unwrap();

        let v2 = worker("v2", &["./index.html"], &stores, &network);
        v2.install().await.unwrap();

        // Installing v2 never mutated v1's store
        assert_eq!(
            stores.entry_count("offline-cache:example.test/app:v1").await,
            2
        );
        assert_eq!(
            stores.entry_count("offline-cache:example.test/app:v2").await,
            1
        );
    }

    #[tokio::test]
    async fn activation_retires_all_but_current() {
        let stores = Arc::new(MemoryStores::new());
        let network =
            Arc::new(ScriptedNetwork::default().with_resource("/app/index.html", b"x"));

        // A store owned by some other subsystem must survive activation
        stores.open("other-subsystem:blobs").await.unwrap();

        let v1 = worker("v1", &["./index.html"], &stores, &network);
        v1.install().await.unwrap();
        v1.activate().await.unwrap();

        let v2 = worker("v2", &["./index.html"], &stores, &network);
        v2.install().await.unwrap();
        let removed = v2.activate().await.unwrap();

        assert_eq!(removed, 1);
        let owned: Vec<String> = stores
            .list_names()
            .await
            .unwrap()
            .into_iter()
            .filter(|n| n.starts_with("offline-cache:example.test/app:"))
            .collect();
        assert_eq!(owned, vec!["offline-cache:example.test/app:v2"]);
        assert!(stores
            .list_names()
            .await
            .unwrap()
            .contains(&"other-subsystem:blobs".to_string()));
    }

    #[tokio::test]
    async fn old_version_never_served_after_promotion() {
        let stores = Arc::new(MemoryStores::new());
        let old_origin =
            Arc::new(ScriptedNetwork::default().with_resource("/app/index.html", b"old body"));
        let new_origin =
            Arc::new(ScriptedNetwork::default().with_resource("/app/index.html", b"new body"));

        let v1 = worker("v1", &["./index.html"], &stores, &old_origin);
        v1.install().await.unwrap();
        v1.activate().await.unwrap();

        // New version installs while v1 is still current, then takes over.
        // A fresh worker instance gets a fresh store handle.
        let v2 = worker("v2", &["./index.html"], &stores, &new_origin);
        v2.install().await.unwrap();
        v2.activate().await.unwrap();

        let response = v2.serve(&get("/index.html")).await.unwrap();
        assert_eq!(response.body, b"new body");
    }

    #[tokio::test]
    async fn non_get_passes_through_even_when_cached() {
        let stores = Arc::new(MemoryStores::new());
        let network =
            Arc::new(ScriptedNetwork::default().with_resource("/app/index.html", b"cached"));
        let worker = worker("v1", &["./index.html"], &stores, &network);

        worker.install().await.unwrap();
        worker.activate().await.unwrap();

        let calls_before = network.calls();
        let request = Request::new(
            Method::Post,
            Url::parse("https://example.test/app/index.html").unwrap(),
        );
        worker.serve(&request).await.unwrap();

        assert_eq!(network.calls(), calls_before + 1);
    }

    #[tokio::test]
    async fn serve_works_before_install_completes() {
        let stores = Arc::new(MemoryStores::new());
        let network =
            Arc::new(ScriptedNetwork::default().with_resource("/app/index.html", b"live"));
        let worker = worker("v1", &["./index.html"], &stores, &network);

        // Nothing installed yet: the request misses and goes to the network
        let response = worker.serve(&get("/index.html")).await.unwrap();
        assert_eq!(response.body, b"live");
        assert_eq!(network.calls(), 1);
    }
}
