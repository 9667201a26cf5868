//! End-to-end engine tests: synthetic requests through the router against
//! an in-memory filesystem.

use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};

use webmount_fs::{FileSystem, MemoryFs};
use webmount_server::{Request, Response, Router, ServerConfig};

fn readwrite_router(fs: Arc<MemoryFs>) -> Router {
    let config = ServerConfig {
        readwrite: true,
        ..ServerConfig::default()
    };
    Router::new(config, fs)
}

fn json_body(response: &Response) -> serde_json::Value {
    serde_json::from_slice(&response.body).expect("body should be JSON")
}

#[tokio::test]
async fn put_then_get_returns_written_bytes() {
    let fs = Arc::new(MemoryFs::new());
    let router = readwrite_router(fs);

    let put = Request::put("http://localhost/fs/notes.txt")
        .unwrap()
        .with_bytes(&b"first draft"[..]);
    let response = router.handle(put).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(json_body(&response)["status"], "ok");

    let get = Request::get("http://localhost/fs/notes.txt").unwrap();
    let response = router.handle(get).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.body[..], b"first draft");

    // Overwrite, then observe the new bytes: stats are never cached.
    let put = Request::put("http://localhost/fs/notes.txt")
        .unwrap()
        .with_bytes(&b"second draft"[..]);
    router.handle(put).await.unwrap();

    let get = Request::get("http://localhost/fs/notes.txt").unwrap();
    let response = router.handle(get).await.unwrap();
    assert_eq!(&response.body[..], b"second draft");
}

#[tokio::test]
async fn missing_node_is_404_under_both_formatters() {
    let fs = Arc::new(MemoryFs::new());
    let router = readwrite_router(fs);

    let html = router
        .handle(Request::get("http://localhost/fs/missing.txt").unwrap())
        .await
        .unwrap();
    assert_eq!(html.status, StatusCode::NOT_FOUND);

    let json = router
        .handle(Request::get("http://localhost/fs/missing.txt?json").unwrap())
        .await
        .unwrap();
    assert_eq!(json.status, StatusCode::NOT_FOUND);
    assert!(json_body(&json)["error"].is_string());
}

#[tokio::test]
async fn update_remove_serve_yields_404() {
    let fs = Arc::new(MemoryFs::new());
    let router = readwrite_router(fs);

    let put = Request::put("http://localhost/fs/tmp.txt")
        .unwrap()
        .with_bytes(&b"transient"[..]);
    assert_eq!(router.handle(put).await.unwrap().status, StatusCode::OK);

    let delete = Request::delete("http://localhost/fs/tmp.txt").unwrap();
    assert_eq!(router.handle(delete).await.unwrap().status, StatusCode::OK);

    let get = Request::get("http://localhost/fs/tmp.txt").unwrap();
    assert_eq!(
        router.handle(get).await.unwrap().status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn folder_modifier_creates_a_listable_empty_directory() {
    let fs = Arc::new(MemoryFs::new());
    let router = readwrite_router(fs);

    let put = Request::put("http://localhost/fs/newdir?folder").unwrap();
    assert_eq!(router.handle(put).await.unwrap().status, StatusCode::OK);

    let get = Request::get("http://localhost/fs/newdir?json").unwrap();
    let response = router.handle(get).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
    let listing = json_body(&response);
    assert_eq!(listing["entries"].as_array().unwrap().len(), 0);

    // Isolation headers belong to file responses only, not listings.
    assert!(response
        .headers
        .get("access-control-allow-origin")
        .is_none());
}

#[tokio::test]
async fn json_roundtrip_decodes_to_written_bytes() {
    let fs = Arc::new(MemoryFs::new());
    let router = readwrite_router(fs);

    let original = b"exact bytes, with unicode: \xc3\xa9";
    let put = Request::put("http://localhost/fs/a.txt")
        .unwrap()
        .with_bytes(&original[..]);
    router.handle(put).await.unwrap();

    let get = Request::get("http://localhost/fs/a.txt?json").unwrap();
    let response = router.handle(get).await.unwrap();
    let envelope = json_body(&response);
    assert_eq!(envelope["encoding"], "utf-8");
    assert_eq!(
        envelope["content"].as_str().unwrap().as_bytes(),
        &original[..]
    );
}

#[tokio::test]
async fn bare_mount_redirects_preserving_query() {
    let fs = Arc::new(MemoryFs::new());
    let router = readwrite_router(fs);

    let get = Request::get("http://localhost/fs?json&x=1").unwrap();
    let response = router.handle(get).await.unwrap();
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(
        response.headers.get(http::header::LOCATION).unwrap(),
        "/fs/?json&x=1"
    );

    // PUT and DELETE get the same canonicalization under read-write.
    let put = Request::put("http://localhost/fs").unwrap();
    assert_eq!(router.handle(put).await.unwrap().status, StatusCode::FOUND);
    let delete = Request::delete("http://localhost/fs").unwrap();
    assert_eq!(
        router.handle(delete).await.unwrap().status,
        StatusCode::FOUND
    );
}

#[tokio::test]
async fn mount_with_trailing_slash_resolves_to_root_listing() {
    let fs = Arc::new(MemoryFs::new());
    fs.write_file("/seen.txt", Bytes::from_static(b"x"))
        .await
        .unwrap();
    let router = readwrite_router(fs);

    let get = Request::get("http://localhost/fs/?json").unwrap();
    let response = router.handle(get).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
    let listing = json_body(&response);
    assert_eq!(listing["path"], "/");
    assert_eq!(listing["entries"][0]["name"], "seen.txt");
}

#[tokio::test]
async fn remove_missing_is_500_not_404() {
    let fs = Arc::new(MemoryFs::new());
    let router = readwrite_router(fs);

    let delete = Request::delete("http://localhost/fs/never-there").unwrap();
    let response = router.handle(delete).await.unwrap();
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&response)["error"], "Failed to delete file");
}

#[tokio::test]
async fn read_only_configuration_serves_no_writes() {
    let fs = Arc::new(MemoryFs::new());
    let router = Router::new(ServerConfig::default(), fs);

    assert!(router
        .rules()
        .iter()
        .all(|rule| rule.method != Method::PUT && rule.method != Method::DELETE));

    let put = Request::put("http://localhost/fs/a.txt")
        .unwrap()
        .with_bytes(&b"data"[..]);
    assert!(router.handle(put).await.is_none());

    let delete = Request::delete("http://localhost/fs/a.txt").unwrap();
    assert!(router.handle(delete).await.is_none());

    // Reads still work.
    let get = Request::get("http://localhost/fs/a.txt").unwrap();
    assert_eq!(
        router.handle(get).await.unwrap().status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn disabled_listing_hides_populated_directories() {
    let fs = Arc::new(MemoryFs::new());
    fs.mkdir_recursive("/dir").await.unwrap();
    fs.write_file("/dir/present.txt", Bytes::from_static(b"x"))
        .await
        .unwrap();

    let config = ServerConfig {
        readwrite: true,
        disable_indexes: true,
        ..ServerConfig::default()
    };
    let router = Router::new(config, fs);

    let get = Request::get("http://localhost/fs/dir").unwrap();
    let response = router.handle(get).await.unwrap();
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn directory_index_document_is_served_when_present() {
    let fs = Arc::new(MemoryFs::new());
    fs.mkdir_recursive("/site").await.unwrap();
    fs.write_file("/site/index.html", Bytes::from_static(b"<h1>home</h1>"))
        .await
        .unwrap();

    let config = ServerConfig {
        readwrite: true,
        disable_indexes: true,
        ..ServerConfig::default()
    };
    let router = Router::new(config, fs);

    // Disabled listings only suppress the fallback, never the index file.
    let get = Request::get("http://localhost/fs/site").unwrap();
    let response = router.handle(get).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.body[..], b"<h1>home</h1>");
}

#[tokio::test]
async fn percent_encoded_paths_reach_the_filesystem_decoded() {
    let fs = Arc::new(MemoryFs::new());
    let router = readwrite_router(Arc::clone(&fs));

    let put = Request::put("http://localhost/fs/with%20space.txt")
        .unwrap()
        .with_bytes(&b"spaced"[..]);
    assert_eq!(router.handle(put).await.unwrap().status, StatusCode::OK);

    // The store saw the decoded name.
    assert_eq!(
        &fs.read_file("/with space.txt").await.unwrap()[..],
        b"spaced"
    );

    let get = Request::get("http://localhost/fs/with%20space.txt").unwrap();
    let response = router.handle(get).await.unwrap();
    assert_eq!(&response.body[..], b"spaced");
}

#[tokio::test]
async fn touch_modifier_creates_then_refreshes() {
    let fs = Arc::new(MemoryFs::new());
    let router = readwrite_router(Arc::clone(&fs));

    let put = Request::put("http://localhost/fs/stamp.txt?touch").unwrap();
    assert_eq!(router.handle(put).await.unwrap().status, StatusCode::OK);
    let first = fs.stat("/stamp.txt").await.unwrap();
    assert_eq!(first.size, 0);

    let put = Request::put("http://localhost/fs/stamp.txt?touch").unwrap();
    assert_eq!(router.handle(put).await.unwrap().status, StatusCode::OK);
    let second = fs.stat("/stamp.txt").await.unwrap();
    assert!(second.modified >= first.modified);
}

#[tokio::test]
async fn put_without_body_is_400() {
    let fs = Arc::new(MemoryFs::new());
    let router = readwrite_router(fs);

    let put = Request::put("http://localhost/fs/empty.txt").unwrap();
    let response = router.handle(put).await.unwrap();
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&response)["error"], "No file contents provided");
}
