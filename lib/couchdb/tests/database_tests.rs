//! Document, bulk, security, view and design operations against a mock CouchDB.

use assert2::{check, let_assert};
use couchdb::{
    BulkGet, Client, Context, Database, Design, Error, Members, Options, Security, View,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_string, header, method, path, query_param},
};

const MAP: &str = "function(d) { if (d['created_at']) { emit(d['created_at'], 1); } }";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Character {
    #[serde(rename = "_id")]
    id: String,
    name: String,
}

async fn setup() -> (MockServer, Database) {
    let server = MockServer::start().await;
    let db = Client::from_url(&server.uri()).expect("client").db("db");
    (server, db)
}

fn etag(rev: &str) -> ResponseTemplate {
    ResponseTemplate::new(201).insert_header("ETag", format!("\"{rev}\""))
}

fn design() -> Design {
    Design::new("test").with_view("by_created_at", View::new(MAP).reduce("_sum"))
}

#[tokio::test]
async fn get_with_options() {
    let (server, db) = setup().await;

    Mock::given(method("GET"))
        .and(path("/db/doc"))
        .and(query_param("conflicts", "true"))
        .and(query_param("open_revs", "[\"1-a\",\"2-b\"]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "doc",
            "name": "Barney"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = Options::new()
        .set("conflicts", true)
        .set("open_revs", json!(["1-a", "2-b"]));
    let doc: Character = db
        .get(&Context::background(), "doc", &options)
        .await
        .expect("get");
    check!(doc.name == "Barney");
}

#[tokio::test]
async fn get_missing_document() {
    let (server, db) = setup().await;

    Mock::given(method("GET"))
        .and(path("/db/doc"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "not_found",
            "reason": "missing"
        })))
        .mount(&server)
        .await;

    let result = db
        .get::<Character>(&Context::background(), "doc", &Options::new())
        .await;

    let_assert!(Err(err) = result);
    check!(err.is_not_found());
    check!(!err.is_conflict());
    check!(err.to_string() == format!("GET {}/db/doc: (404) not_found: missing", server.uri()));
}

#[tokio::test]
async fn undecodable_error_body_keeps_status() {
    let (server, db) = setup().await;

    Mock::given(method("GET"))
        .and(path("/db/doc"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = db
        .get::<Character>(&Context::background(), "doc", &Options::new())
        .await;

    let_assert!(Err(err) = result);
    check!(err.has_status(500));
    let_assert!(Some(server_error) = err.server_error());
    let_assert!(Some(code) = server_error.error.as_deref());
    check!(code.starts_with("unknown, couldn't decode CouchDB error: "));
    check!(server_error.reason == server_error.error);
}

#[tokio::test]
async fn invalid_option_sends_nothing() {
    let (server, db) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let options = Options::new().set("limit", Value::Null);
    let result = db
        .get::<Value>(&Context::background(), "doc", &options)
        .await;

    let_assert!(Err(Error::InvalidOption { key, .. }) = result);
    check!(key == "limit");
}

#[tokio::test]
async fn rev_reads_etag() {
    let (server, db) = setup().await;

    Mock::given(method("HEAD"))
        .and(path("/db/doc"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"1-619db7ba8551c0de3f3a178775509611\""),
        )
        .mount(&server)
        .await;

    let rev = db.rev(&Context::background(), "doc").await.expect("rev");
    check!(rev == "1-619db7ba8551c0de3f3a178775509611");
}

#[tokio::test]
async fn rev_without_etag() {
    let (server, db) = setup().await;

    Mock::given(method("HEAD"))
        .and(path("/db/doc"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = db.rev(&Context::background(), "doc").await;
    let_assert!(Err(Error::MissingRevision) = result);
}

#[tokio::test]
async fn rev_of_missing_document() {
    let (server, db) = setup().await;

    Mock::given(method("HEAD"))
        .and(path("/db/doc"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = db.rev(&Context::background(), "doc").await;
    let_assert!(Err(err) = result);
    check!(err.is_not_found());
    let_assert!(Some(server_error) = err.server_error());
    check!(server_error.error.is_none());
    check!(server_error.reason.is_none());
}

#[tokio::test]
async fn post_returns_id_and_rev() {
    let (server, db) = setup().await;

    Mock::given(method("POST"))
        .and(path("/db"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"name": "Barney"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ok": true,
            "id": "8f5e3a1c",
            "rev": "1-619db7ba8551c0de3f3a178775509611"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (id, rev) = db
        .post(&Context::background(), &json!({"name": "Barney"}))
        .await
        .expect("post");
    check!(id == "8f5e3a1c");
    check!(rev == "1-619db7ba8551c0de3f3a178775509611");
}

#[tokio::test]
async fn put_new_document() {
    let (server, db) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/db/doc"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"_id": "doc", "name": "Fred"})))
        .respond_with(etag("1-619db7ba8551c0de3f3a178775509611"))
        .expect(1)
        .mount(&server)
        .await;

    let doc = Character {
        id: "doc".to_string(),
        name: "Fred".to_string(),
    };
    let rev = db
        .put(&Context::background(), "doc", &doc, "")
        .await
        .expect("put");
    check!(rev == "1-619db7ba8551c0de3f3a178775509611");

    let requests = server.received_requests().await.expect("recording");
    check!(requests[0].url.query().is_none());
}

#[tokio::test]
async fn put_with_rev() {
    let (server, db) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/db/doc"))
        .and(query_param("rev", "1-619db7ba8551c0de3f3a178775509611"))
        .respond_with(etag("2-619db7ba8551c0de3f3a178775509611"))
        .expect(1)
        .mount(&server)
        .await;

    let rev = db
        .put(
            &Context::background(),
            "doc",
            &json!({"name": "Fred"}),
            "1-619db7ba8551c0de3f3a178775509611",
        )
        .await
        .expect("put");
    check!(rev == "2-619db7ba8551c0de3f3a178775509611");
}

#[tokio::test]
async fn put_conflict() {
    let (server, db) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/db/doc"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": "conflict",
            "reason": "Document update conflict."
        })))
        .mount(&server)
        .await;

    let result = db
        .put(&Context::background(), "doc", &json!({}), "1-old")
        .await;
    let_assert!(Err(err) = result);
    check!(err.is_conflict());
}

#[tokio::test]
async fn design_and_local_ids_keep_their_slash() {
    let (server, db) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/db/_local/checkpoint"))
        .respond_with(etag("0-1"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/db/a%2Fb"))
        .respond_with(etag("1-a"))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = Context::background();
    db.put(&ctx, "_local/checkpoint", &json!({}), "")
        .await
        .expect("local doc");
    db.put(&ctx, "a/b", &json!({}), "").await.expect("escaped id");
}

#[tokio::test]
async fn delete_returns_new_rev() {
    let (server, db) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/db/doc"))
        .and(query_param("rev", "1-619db7ba8551c0de3f3a178775509611"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"2-619db7ba8551c0de3f3a178775509611\""),
        )
        .expect(1)
        .mount(&server)
        .await;

    let rev = db
        .delete(
            &Context::background(),
            "doc",
            "1-619db7ba8551c0de3f3a178775509611",
        )
        .await
        .expect("delete");
    check!(rev == "2-619db7ba8551c0de3f3a178775509611");
}

#[tokio::test]
async fn bulk_docs_reports_per_document_outcome() {
    let (server, db) = setup().await;

    let docs = vec![
        json!({"_id": "barney", "name": "Barney"}),
        json!({"_id": "fred", "name": "Fred"}),
        json!({"_id": "pebbles", "name": "Pebbles"}),
        json!({"_id": "dino", "name": "Dino"}),
    ];

    // Results deliberately out of request order
    Mock::given(method("POST"))
        .and(path("/db/_bulk_docs"))
        .and(body_json(json!({ "docs": docs })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {"ok": true, "id": "fred", "rev": "1-a"},
            {"id": "dino", "error": "conflict", "reason": "Document update conflict."},
            {"ok": true, "id": "barney", "rev": "1-b"},
            {"ok": true, "id": "pebbles", "rev": "1-c"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let results = db
        .bulk_docs(&Context::background(), &docs)
        .await
        .expect("bulk docs");

    check!(results.len() == 4);
    check!(!results.all_ok());
    let_assert!(Some(barney) = results.get("barney"));
    check!(barney.ok);
    check!(barney.rev.as_deref() == Some("1-b"));

    let failures: Vec<_> = results.failures().collect();
    check!(failures.len() == 1);
    check!(failures[0].id == "dino");
    check!(failures[0].is_conflict());
}

#[tokio::test]
async fn bulk_docs_exchange_failure_is_an_error() {
    let (server, db) = setup().await;

    Mock::given(method("POST"))
        .and(path("/db/_bulk_docs"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "bad_request",
            "reason": "Missing JSON list of 'docs'"
        })))
        .mount(&server)
        .await;

    let result = db
        .bulk_docs(&Context::background(), &[json!({"name": "Barney"})])
        .await;
    let_assert!(Err(err) = result);
    check!(err.has_status(400));
}

#[tokio::test]
async fn bulk_get_splits_found_and_missing() {
    let (server, db) = setup().await;

    Mock::given(method("POST"))
        .and(path("/db/_bulk_get"))
        .and(query_param("revs", "true"))
        .and(body_json(json!({
            "docs": [{"id": "foo"}, {"id": "bar"}, {"id": "baz"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "foo", "docs": [{"ok": {"_id": "foo", "_rev": "1-a", "name": "Foo"}}]},
                {"id": "bar", "docs": [{"ok": {"_id": "bar", "_rev": "1-b", "name": "Bar"}}]},
                {"id": "baz", "docs": [{"error": {
                    "id": "baz",
                    "rev": "undefined",
                    "error": "not_found",
                    "reason": "missing"
                }}]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = Options::new().set("revs", true);
    let found: BulkGet<Character> = db
        .bulk_get(&Context::background(), ["foo", "bar", "baz"], &options)
        .await
        .expect("bulk get");

    check!(found.docs.len() == 2);
    check!(found.docs[0].name == "Foo");
    check!(found.docs[1].name == "Bar");
    check!(found.not_found == vec!["baz".to_string()]);
}

#[tokio::test]
async fn security_roundtrip() {
    let (server, db) = setup().await;

    let security = Security {
        admins: Members {
            names: vec!["admin".to_string()],
            roles: Vec::new(),
        },
        members: Members {
            names: Vec::new(),
            roles: vec!["readers".to_string()],
        },
    };

    Mock::given(method("GET"))
        .and(path("/db/_security"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "admins": {"names": ["admin"]},
            "members": {"roles": ["readers"]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/db/_security"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "admins": {"names": ["admin"]},
            "members": {"roles": ["readers"]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = Context::background();
    let fetched = db.security(&ctx).await.expect("security");
    check!(fetched == security);

    db.put_security(&ctx, &security).await.expect("put security");
}

#[tokio::test]
async fn empty_security_means_defaults() {
    let (server, db) = setup().await;

    Mock::given(method("GET"))
        .and(path("/db/_security"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let security = db.security(&Context::background()).await.expect("security");
    check!(security == Security::default());
}

#[tokio::test]
async fn view_query_encodes_json_keys() {
    let (server, db) = setup().await;

    Mock::given(method("GET"))
        .and(path("/db/_design/test/_view/by_created_at"))
        .and(query_param("startkey", "[\"a\",1]"))
        .and(query_param("limit", "10"))
        .and(query_param("reduce", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_rows": 1,
            "offset": 0,
            "rows": [{"id": "doc", "key": ["a", 1], "value": 1}]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let options = Options::new()
        .set("startkey", json!(["a", 1]))
        .set("limit", 10)
        .set("reduce", false);
    let ctx = Context::background();

    let result: Value = db
        .view(&ctx, "test", "by_created_at", &options)
        .await
        .expect("view");
    check!(result["rows"][0]["id"] == "doc");

    // The design prefix is optional
    let _: Value = db
        .view(&ctx, "_design/test", "by_created_at", &options)
        .await
        .expect("view with prefix");
}

#[tokio::test]
async fn post_view_sends_payload() {
    let (server, db) = setup().await;

    Mock::given(method("POST"))
        .and(path("/db/_design/test/_view/by_created_at"))
        .and(query_param("include_docs", "true"))
        .and(body_json(json!({"keys": ["a", "b"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": []})))
        .expect(1)
        .mount(&server)
        .await;

    let result: Value = db
        .post_view(
            &Context::background(),
            "test",
            "by_created_at",
            &Options::new().set("include_docs", true),
            &json!({"keys": ["a", "b"]}),
        )
        .await
        .expect("post view");
    check!(result == json!({"rows": []}));
}

#[tokio::test]
async fn all_docs_with_keys() {
    let (server, db) = setup().await;

    Mock::given(method("GET"))
        .and(path("/db/_all_docs"))
        .and(query_param("keys", "[\"barney\",\"fred\"]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_rows": 2,
            "rows": [
                {"id": "barney", "key": "barney", "value": {"rev": "1-b"}},
                {"id": "fred", "key": "fred", "value": {"rev": "1-a"}}
            ]
        })))
        .mount(&server)
        .await;

    let result: Value = db
        .all_docs(
            &Context::background(),
            &Options::new().set("keys", json!(["barney", "fred"])),
        )
        .await
        .expect("all docs");
    check!(result["total_rows"] == 2);
}

#[tokio::test]
async fn sync_design_no_change() {
    let (server, db) = setup().await;

    Mock::given(method("GET"))
        .and(path("/db/_design/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "_design/test",
            "_rev": "1-619db7ba8551c0de3f3a178775509611",
            "language": "javascript",
            "views": {
                "by_created_at": {"map": MAP, "reduce": "_sum"}
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(etag("2-unexpected"))
        .expect(0)
        .mount(&server)
        .await;

    let mut design = design();
    db.sync_design(&Context::background(), &mut design)
        .await
        .expect("sync");
    check!(design.rev == "1-619db7ba8551c0de3f3a178775509611");
}

#[tokio::test]
async fn sync_design_create() {
    let (server, db) = setup().await;

    Mock::given(method("GET"))
        .and(path("/db/_design/test"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "not_found",
            "reason": "missing"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/db/_design/test"))
        .and(body_json(json!({
            "_id": "_design/test",
            "language": "javascript",
            "views": {
                "by_created_at": {"map": MAP, "reduce": "_sum"}
            }
        })))
        .respond_with(etag("1-619db7ba8551c0de3f3a178775509611"))
        .expect(1)
        .mount(&server)
        .await;

    let mut design = design();
    db.sync_design(&Context::background(), &mut design)
        .await
        .expect("sync");
    check!(design.rev == "1-619db7ba8551c0de3f3a178775509611");

    let requests = server.received_requests().await.expect("recording");
    let put = requests
        .iter()
        .find(|request| request.method.as_str() == "PUT")
        .expect("a PUT was sent");
    check!(put.url.query().is_none());
}

#[tokio::test]
async fn sync_design_update() {
    let (server, db) = setup().await;

    Mock::given(method("GET"))
        .and(path("/db/_design/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "_design/test",
            "_rev": "1-619db7ba8551c0de3f3a178775509611",
            "language": "javascript",
            "views": {
                "by_created_at": {
                    "map": "function(d) { if (d['created_at']) { emit(d['created_at'], null); } }"
                }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/db/_design/test"))
        .and(query_param("rev", "1-619db7ba8551c0de3f3a178775509611"))
        .respond_with(etag("2-619db7ba8551c0de3f3a178775509611"))
        .expect(1)
        .mount(&server)
        .await;

    let mut design = design();
    db.sync_design(&Context::background(), &mut design)
        .await
        .expect("sync");
    check!(design.rev == "2-619db7ba8551c0de3f3a178775509611");
}

#[tokio::test]
async fn sync_design_stale_local_rev_is_not_sent() {
    let (server, db) = setup().await;

    Mock::given(method("GET"))
        .and(path("/db/_design/test"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "not_found",
            "reason": "missing"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/db/_design/test"))
        .and(body_string(
            serde_json::to_string(&design()).expect("serialize design"),
        ))
        .respond_with(etag("1-new"))
        .expect(1)
        .mount(&server)
        .await;

    // Revision synced against another database
    let mut design = design();
    design.rev = "7-other".to_string();

    db.sync_design(&Context::background(), &mut design)
        .await
        .expect("sync");
    check!(design.rev == "1-new");
}

#[tokio::test]
async fn sync_design_read_failure_leaves_rev() {
    let (server, db) = setup().await;

    Mock::given(method("GET"))
        .and(path("/db/_design/test"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "unauthorized",
            "reason": "You are not authorized to access this db."
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(etag("2-unexpected"))
        .expect(0)
        .mount(&server)
        .await;

    let mut design = design();
    design.rev = "3-local".to_string();

    let result = db.sync_design(&Context::background(), &mut design).await;
    let_assert!(Err(err) = result);
    check!(err.is_unauthorized());
    check!(design.rev == "3-local");
}

#[tokio::test]
async fn sync_design_write_failure_clears_rev() {
    let (server, db) = setup().await;

    Mock::given(method("GET"))
        .and(path("/db/_design/test"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "not_found",
            "reason": "missing"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/db/_design/test"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": "conflict",
            "reason": "Document update conflict."
        })))
        .mount(&server)
        .await;

    let mut design = design();
    design.rev = "3-local".to_string();

    let result = db.sync_design(&Context::background(), &mut design).await;
    let_assert!(Err(err) = result);
    check!(err.is_conflict());
    check!(design.rev.is_empty());
}

#[tokio::test]
async fn sync_design_twice_writes_once() {
    let (server, db) = setup().await;

    Mock::given(method("GET"))
        .and(path("/db/_design/test"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "not_found",
            "reason": "missing"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/db/_design/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "_design/test",
            "_rev": "1-c1a5a7b1",
            "language": "javascript",
            "views": {
                "by_created_at": {"map": MAP, "reduce": "_sum"}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/db/_design/test"))
        .respond_with(etag("1-c1a5a7b1"))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = Context::background();
    let mut design = design();

    db.sync_design(&ctx, &mut design).await.expect("first sync");
    check!(design.rev == "1-c1a5a7b1");

    db.sync_design(&ctx, &mut design).await.expect("second sync");
    check!(design.rev == "1-c1a5a7b1");

    server.verify().await;
}

#[tokio::test]
async fn sync_design_changed_map_writes_with_fetched_rev() {
    let (server, db) = setup().await;

    Mock::given(method("GET"))
        .and(path("/db/_design/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "_design/test",
            "_rev": "4-5d2c",
            "language": "javascript",
            "views": {
                "by_created_at": {"map": MAP, "reduce": "_sum"}
            }
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/db/_design/test"))
        .and(query_param("rev", "4-5d2c"))
        .and(body_json(json!({
            "_id": "_design/test",
            "language": "javascript",
            "views": {
                "by_created_at": {
                    "map": "function(d) { emit(d._id, 1); }",
                    "reduce": "_sum"
                }
            }
        })))
        .respond_with(etag("5-9e1f"))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = Context::background();
    let mut design = design();

    db.sync_design(&ctx, &mut design).await.expect("unchanged sync");
    check!(design.rev == "4-5d2c");

    design.add_view(
        "by_created_at",
        View::new("function(d) { emit(d._id, 1); }").reduce("_sum"),
    );
    db.sync_design(&ctx, &mut design).await.expect("changed sync");
    check!(design.rev == "5-9e1f");

    server.verify().await;
}
