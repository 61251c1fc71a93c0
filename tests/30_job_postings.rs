mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{data, TestServer};

/// Admin-created location and employment type ids
async fn taxonomies(server: &TestServer, admin: &str) -> Result<(i64, i64)> {
    let location = data(server.post("/locations", Some(admin), &json!({ "name": "Jeju" })).await?).await?;
    let employment = data(
        server
            .post("/employment-types", Some(admin), &json!({ "name": "Seasonal" }))
            .await?,
    )
    .await?;
    Ok((
        location["id"].as_i64().context("location id")?,
        employment["id"].as_i64().context("employment type id")?,
    ))
}

fn posting(location_id: i64, employment_type_id: i64, title: &str, salary: &str) -> Value {
    json!({
        "title": title,
        "company_name": "Green Hills Estate",
        "location_id": location_id,
        "detail_location": "Field 3",
        "description": "Hand-pick first flush leaves",
        "recruitment_start_date": "2024-04-01",
        "recruitment_end_date": "2024-05-01",
        "job_title": "Tea picker",
        "employment_type_id": employment_type_id,
        "annual_salary": salary,
        "preferred_skills": ["stamina"],
    })
}

#[tokio::test]
async fn editors_create_postings_in_presentation_shape() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, admin) = server.admin("root").await?;
    let (editor_id, editor) = server.editor("erin").await?;
    let (_, user) = server.user("alice").await?;
    let (location, employment) = taxonomies(&server, &admin).await?;

    let body = posting(location, employment, "Spring picker", "24000.00");
    assert_eq!(server.post("/job-postings", Some(&user), &body).await?.status(), StatusCode::FORBIDDEN);

    let res = server.post("/job-postings", Some(&editor), &body).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = data(res).await?;
    assert_eq!(created["location"], "Jeju");
    assert_eq!(created["employment_type"], "Seasonal");
    assert_eq!(created["recruitment_period"]["start"], "2024-04-01");
    assert_eq!(created["recruitment_period"]["end"], "2024-05-01");
    assert_eq!(created["salary"], "24000.00");
    assert_eq!(created["views"], 0);
    assert_eq!(created["status"], "active");
    assert_eq!(created["author"]["id"], editor_id);
    Ok(())
}

#[tokio::test]
async fn reading_a_posting_counts_views() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, admin) = server.admin("root").await?;
    let (_, editor) = server.editor("erin").await?;
    let (location, employment) = taxonomies(&server, &admin).await?;

    let created = data(
        server
            .post("/job-postings", Some(&editor), &posting(location, employment, "Picker", "24000.00"))
            .await?,
    )
    .await?;
    let path = format!("/job-postings/{}", created["id"]);

    assert_eq!(data(server.get(&path, None).await?).await?["views"], 1);
    assert_eq!(data(server.get(&path, None).await?).await?["views"], 2);
    Ok(())
}

#[tokio::test]
async fn invalid_postings_are_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, admin) = server.admin("root").await?;
    let (_, editor) = server.editor("erin").await?;
    let (location, employment) = taxonomies(&server, &admin).await?;

    let mut inverted = posting(location, employment, "Picker", "24000.00");
    inverted["recruitment_end_date"] = json!("2024-03-01");
    let res = server.post("/job-postings", Some(&editor), &inverted).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["field_errors"]["recruitment_end_date"].is_string());

    let res = server
        .post("/job-postings", Some(&editor), &posting(location, employment + 100, "Picker", "24000.00"))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["field_errors"]["employment_type_id"].is_string());
    Ok(())
}

#[tokio::test]
async fn any_author_may_edit_their_posting_and_hide_it() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, admin) = server.admin("root").await?;
    let (editor_id, editor) = server.editor("erin").await?;
    let (location, employment) = taxonomies(&server, &admin).await?;

    let created = data(
        server
            .post("/job-postings", Some(&editor), &posting(location, employment, "Picker", "24000.00"))
            .await?,
    )
    .await?;
    let path = format!("/job-postings/{}", created["id"]);

    // demoted authors keep control of what they wrote
    server.state.auth.update_role(editor_id, content_platform_api::types::Role::User).await?;

    let res = server
        .patch(&path, Some(&editor), &json!({ "annual_salary": "26000.50", "status": "private" }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = data(res).await?;
    assert_eq!(updated["salary"], "26000.50");
    assert_eq!(updated["status"], "private");

    assert_eq!(server.get(&path, None).await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(data(server.get("/job-postings", None).await?).await?["total"], 0);

    let res = server
        .patch(&path, Some(&editor), &json!({ "recruitment_start_date": "2024-06-01" }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert_eq!(server.delete(&path, Some(&editor)).await?.status(), StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn listing_filters_by_taxonomy_and_salary() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, admin) = server.admin("root").await?;
    let (_, editor) = server.editor("erin").await?;
    let (location, employment) = taxonomies(&server, &admin).await?;
    let other_location = data(server.post("/locations", Some(&admin), &json!({ "name": "Boseong" })).await?)
        .await?["id"]
        .as_i64()
        .context("location id")?;

    for (loc, title, salary) in [
        (location, "Picker", "20000.00"),
        (location, "Roaster", "30000.00"),
        (other_location, "Blender", "40000.00"),
    ] {
        let res = server
            .post("/job-postings", Some(&editor), &posting(loc, employment, title, salary))
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let by_location = data(server.get(&format!("/job-postings?location_id={}", location), None).await?).await?;
    assert_eq!(by_location["total"], 2);

    let by_salary = data(server.get("/job-postings?min_salary=30000&max_salary=40000", None).await?).await?;
    assert_eq!(by_salary["total"], 2);

    let by_company = data(server.get("/job-postings?search=green%20hills", None).await?).await?;
    assert_eq!(by_company["total"], 3);

    let by_title = data(server.get("/job-postings?search=roast", None).await?).await?;
    assert_eq!(by_title["items"][0]["title"], "Roaster");
    Ok(())
}
