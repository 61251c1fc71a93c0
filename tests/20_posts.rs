mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{data, TestServer};

async fn create_post(server: &TestServer, token: &str, title: &str, category: &str) -> Result<Value> {
    let res = server
        .post(
            "/posts",
            Some(token),
            &json!({ "title": title, "detail": "body", "category": category, "tags": ["tea"] }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    data(res).await
}

#[tokio::test]
async fn any_account_can_write_posts_but_not_anonymously() -> Result<()> {
    let server = TestServer::start().await?;
    let (alice_id, alice) = server.user("alice").await?;

    let post = create_post(&server, &alice, "Morning brew", "notes").await?;
    assert_eq!(post["author"]["id"], alice_id);
    assert_eq!(post["author"]["name"], "alice");
    assert_eq!(post["status"], "draft");
    assert_eq!(post["view_count"], 0);

    let res = server.post("/posts", None, &json!({ "title": "x", "detail": "y" })).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let fetched = data(server.get(&format!("/posts/{}", post["id"]), None).await?).await?;
    assert_eq!(fetched["title"], "Morning brew");
    Ok(())
}

#[tokio::test]
async fn only_the_author_may_modify_a_post() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, alice) = server.user("alice").await?;
    let (_, bob) = server.user("bob").await?;
    let post = create_post(&server, &alice, "Original", "notes").await?;
    let path = format!("/posts/{}", post["id"]);

    let res = server.patch(&path, Some(&bob), &json!({ "title": "Hijacked" })).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(server.delete(&path, Some(&bob)).await?.status(), StatusCode::FORBIDDEN);
    assert_eq!(data(server.get(&path, None).await?).await?["title"], "Original");

    let res = server
        .patch(&path, Some(&alice), &json!({ "title": "Edited", "status": "published", "view_count": 99 }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let edited = data(res).await?;
    assert_eq!(edited["title"], "Edited");
    assert_eq!(edited["status"], "published");
    assert_eq!(edited["view_count"], 0);
    assert_eq!(edited["detail"], "body");
    Ok(())
}

#[tokio::test]
async fn deleted_posts_are_gone_from_reads() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, alice) = server.user("alice").await?;
    let post = create_post(&server, &alice, "Ephemeral", "notes").await?;
    let path = format!("/posts/{}", post["id"]);

    assert_eq!(server.delete(&path, Some(&alice)).await?.status(), StatusCode::NO_CONTENT);
    assert_eq!(server.get(&path, None).await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.delete(&path, Some(&alice)).await?.status(), StatusCode::NOT_FOUND);

    let listed = data(server.get("/posts", None).await?).await?;
    assert_eq!(listed["total"], 0);
    Ok(())
}

#[tokio::test]
async fn listing_filters_and_paginates_newest_first() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, alice) = server.user("alice").await?;
    for i in 1..=5 {
        let category = if i % 2 == 0 { "even" } else { "odd" };
        create_post(&server, &alice, &format!("Green tea {}", i), category).await?;
    }
    create_post(&server, &alice, "Oolong", "odd").await?;

    let page = data(server.get("/posts?page=1&limit=2", None).await?).await?;
    assert_eq!(page["total"], 6);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["items"][0]["title"], "Oolong");
    assert_eq!(page["items"][1]["title"], "Green tea 5");

    let searched = data(server.get("/posts?search=GREEN&category=even", None).await?).await?;
    assert_eq!(searched["total"], 2);

    let past_end = data(server.get("/posts?page=9&limit=2", None).await?).await?;
    assert_eq!(past_end["items"], json!([]));
    assert_eq!(past_end["total"], 6);

    assert_eq!(server.get("/posts?page=0", None).await?.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn oversized_limit_is_clamped() -> Result<()> {
    let server = TestServer::start().await?;
    let max = server.state.config.api.max_page_size;

    let page = data(server.get(&format!("/posts?limit={}", max + 50), None).await?).await?;
    assert_eq!(page["limit"], max);
    Ok(())
}

#[tokio::test]
async fn magazines_require_editor_for_writes() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, user) = server.user("alice").await?;
    let (_, editor) = server.editor("erin").await?;
    let (_, other_editor) = server.editor("evan").await?;
    let body = json!({ "title": "Spring issue", "detail": "Harvest stories" });

    assert_eq!(server.post("/magazines", Some(&user), &body).await?.status(), StatusCode::FORBIDDEN);

    let res = server.post("/magazines", Some(&editor), &body).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let magazine = data(res).await?;
    let path = format!("/magazines/{}", magazine["id"]);

    // public reads
    assert_eq!(server.get(&path, None).await?.status(), StatusCode::OK);

    // ownership still applies between editors
    assert_eq!(
        server.patch(&path, Some(&other_editor), &json!({ "title": "Mine now" })).await?.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(server.delete(&path, Some(&editor)).await?.status(), StatusCode::NO_CONTENT);
    Ok(())
}
