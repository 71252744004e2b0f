use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use localized_static::{
    FileSystemLocation, HandlerConfig, LocalizedResourceResolver, RequestView, ResolveError,
    ResolverChain, ResourceHandler, ResourceResolver, StaticRequest,
};

/// Records every location set it is handed and answers with the first one.
#[derive(Clone, Default)]
struct RecordingStage {
    calls: Arc<Mutex<Vec<Vec<PathBuf>>>>,
}

impl RecordingStage {
    fn calls(&self) -> Vec<Vec<PathBuf>> {
        self.calls.lock().unwrap().clone()
    }
}

impl ResourceResolver<FileSystemLocation> for RecordingStage {
    fn resolve_resource(
        &self,
        _request: &dyn RequestView,
        _request_path: &str,
        locations: &[FileSystemLocation],
        _chain: ResolverChain<'_, FileSystemLocation>,
    ) -> localized_static::Result<Option<FileSystemLocation>> {
        self.calls
            .lock()
            .unwrap()
            .push(locations.iter().map(|l| l.path().to_path_buf()).collect());
        Ok(locations.first().cloned())
    }

    fn resolve_url_path(
        &self,
        _resource_path: &str,
        _locations: &[FileSystemLocation],
        _chain: ResolverChain<'_, FileSystemLocation>,
    ) -> localized_static::Result<Option<String>> {
        Ok(None)
    }
}

fn make_dirs(root: &Path, dirs: &[&str]) {
    for dir in dirs {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
}

fn chain_with(recorder: &RecordingStage) -> Vec<Box<dyn ResourceResolver<FileSystemLocation>>> {
    vec![
        Box::new(LocalizedResourceResolver::new("en")),
        Box::new(recorder.clone()),
    ]
}

#[test]
fn test_first_location_with_language_wins() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    make_dirs(a.path(), &["fr"]);
    make_dirs(b.path(), &["de"]);

    let recorder = RecordingStage::default();
    let stages = chain_with(&recorder);
    let locations = [
        FileSystemLocation::new(a.path()),
        FileSystemLocation::new(b.path()),
    ];
    let request = StaticRequest::from_query("lang=de");

    let found = ResolverChain::new(&stages)
        .resolve_resource(&request, "index.html", &locations)
        .unwrap()
        .unwrap();

    assert_eq!(found.path(), b.path().join("de"));
    assert_eq!(recorder.calls(), vec![vec![b.path().join("de")]]);
}

#[test]
fn test_earlier_location_preferred_when_both_match() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    make_dirs(a.path(), &["de"]);
    make_dirs(b.path(), &["de"]);

    let recorder = RecordingStage::default();
    let stages = chain_with(&recorder);
    let locations = [
        FileSystemLocation::new(a.path()),
        FileSystemLocation::new(b.path()),
    ];
    let request = StaticRequest::new().with_header("Accept-Language", "de-DE,en;q=0.5");

    ResolverChain::new(&stages)
        .resolve_resource(&request, "index.html", &locations)
        .unwrap();

    assert_eq!(recorder.calls(), vec![vec![a.path().join("de")]]);
}

#[test]
fn test_unsupported_language_never_reaches_chain() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    make_dirs(a.path(), &["en"]);
    make_dirs(b.path(), &["fr"]);

    let recorder = RecordingStage::default();
    let stages = chain_with(&recorder);
    let locations = [
        FileSystemLocation::new(a.path()),
        FileSystemLocation::new(b.path()),
    ];
    let request = StaticRequest::from_query("lang=xx");

    let err = ResolverChain::new(&stages)
        .resolve_resource(&request, "index.html", &locations)
        .unwrap_err();

    assert!(matches!(err, ResolveError::UnsupportedLanguage { ref language } if language == "xx"));
    assert!(recorder.calls().is_empty());
}

#[test]
fn test_fallback_used_without_language_inputs() {
    let a = tempfile::tempdir().unwrap();
    make_dirs(a.path(), &["en"]);

    let recorder = RecordingStage::default();
    let stages = chain_with(&recorder);
    let locations = [FileSystemLocation::new(a.path())];

    ResolverChain::new(&stages)
        .resolve_resource(&StaticRequest::new(), "index.html", &locations)
        .unwrap();

    assert_eq!(recorder.calls(), vec![vec![a.path().join("en")]]);
}

#[test]
fn test_url_path_always_unsupported() {
    let recorder = RecordingStage::default();
    let stages = chain_with(&recorder);

    for path in ["", "index.html", "/de/app.css"] {
        let err = ResolverChain::new(&stages).resolve_url_path(path, &[]).unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedOperation { .. }));
    }
}

#[test]
fn test_handler_serves_localized_file_from_disk() {
    let site = tempfile::tempdir().unwrap();
    make_dirs(site.path(), &["en/css", "fr/css"]);
    fs::write(site.path().join("en/css/app.css"), "en").unwrap();
    fs::write(site.path().join("fr/css/app.css"), "fr").unwrap();

    let handler = ResourceHandler::localized(
        &HandlerConfig::default(),
        vec![FileSystemLocation::new(site.path())],
    );

    let fr = StaticRequest::new().with_header("accept-language", "fr-CA");
    let found = handler.handle(&fr, "/css/app.css").unwrap().unwrap();
    assert_eq!(fs::read_to_string(found.path()).unwrap(), "fr");

    let default = handler
        .handle(&StaticRequest::new(), "/css/app.css")
        .unwrap()
        .unwrap();
    assert_eq!(fs::read_to_string(default.path()).unwrap(), "en");

    assert!(handler.handle(&fr, "/css/missing.css").unwrap().is_none());
    assert!(handler.handle(&fr, "/../en/css/app.css").unwrap().is_none());
}

#[test]
fn test_language_traversal_aborts_resolution() {
    let site = tempfile::tempdir().unwrap();
    make_dirs(site.path(), &["en"]);

    let handler = ResourceHandler::localized(
        &HandlerConfig::default(),
        vec![FileSystemLocation::new(site.path())],
    );
    let request = StaticRequest::from_query("lang=..%2F..");

    let err = handler.handle(&request, "/index.html").unwrap_err();
    assert!(matches!(err, ResolveError::ResourceAccess { .. }));
    assert_eq!(err.status_code(), 500);
}

#[test]
fn test_concurrent_resolution() {
    let site = tempfile::tempdir().unwrap();
    for lang in ["en", "fr", "de"] {
        make_dirs(site.path(), &[lang]);
        fs::write(site.path().join(lang).join("index.html"), lang).unwrap();
    }

    let handler = Arc::new(ResourceHandler::localized(
        &HandlerConfig::default(),
        vec![FileSystemLocation::new(site.path())],
    ));

    let workers: Vec<_> = ["en", "fr", "de", "fr", "en", "de"]
        .into_iter()
        .map(|lang| {
            let handler = Arc::clone(&handler);
            std::thread::spawn(move || {
                let request = StaticRequest::new().with_parameter("lang", lang);
                let found = handler.handle(&request, "/index.html").unwrap().unwrap();
                (lang, fs::read_to_string(found.path()).unwrap())
            })
        })
        .collect();

    for worker in workers {
        let (lang, body) = worker.join().unwrap();
        assert_eq!(lang, body);
    }
}

#[test]
fn test_multi_segment_language_aborts_resolution() {
    let site = tempfile::tempdir().unwrap();
    make_dirs(site.path(), &["de/js", "en"]);
    fs::write(site.path().join("de/js/app.js"), "js").unwrap();

    let handler = ResourceHandler::localized(
        &HandlerConfig::default(),
        vec![FileSystemLocation::new(site.path())],
    );

    for query in ["lang=de%2Fjs", "lang=.", "lang=de%5Cjs"] {
        let err = handler
            .handle(&StaticRequest::from_query(query), "/app.js")
            .unwrap_err();
        assert!(matches!(err, ResolveError::ResourceAccess { .. }), "{query}");
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_location_aborts_resolution() {
    use std::os::unix::fs::PermissionsExt;

    let site = tempfile::tempdir().unwrap();
    let locked = site.path().join("locked");
    make_dirs(&locked, &["de"]);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users bypass the permission check.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let handler = ResourceHandler::localized(
        &HandlerConfig::default(),
        vec![FileSystemLocation::new(&locked)],
    );
    let result = handler.handle(&StaticRequest::from_query("lang=de"), "/index.html");

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let err = result.unwrap_err();
    assert!(matches!(err, ResolveError::ResourceAccess { .. }));
    assert_eq!(err.status_code(), 500);
}
