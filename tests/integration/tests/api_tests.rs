//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance (`DATABASE_URL`)
//! - Running Redis instance (`REDIS_URL`) for the readiness probe only
//!
//! The chat platform is replaced by an in-process stand-in per server.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_json, assert_status, check_test_env, fixtures::*, mock_platform::MockMember,
    mock_platform::RoleChange, TestServer,
};
use reqwest::StatusCode;
use serde_json::json;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_ready_reports_database() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/ready").await.expect("Request failed");
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["checks"]["database"], true);
}

// ============================================================================
// Session Tests
// ============================================================================

#[tokio::test]
async fn test_me_requires_session() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/api/v1/me").await.unwrap();
    let err: ErrorEnvelope = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(err.error.code, "UNAUTHENTICATED");

    let response = server.get_auth("/api/v1/me", "not-a-token").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_me_via_header_and_cookie() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.staff_token();

    let response = server.get_auth("/api/v1/me", &token).await.unwrap();
    let me: MeResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.discord_id, server.staff_id.to_string());
    assert!(me.in_guild && me.is_staff && me.is_member);

    let response = server.get_with_cookie("/api/v1/me", &token).await.unwrap();
    let me: MeResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(me.is_staff);

    let outsider = unique_id();
    let response = server
        .get_auth("/api/v1/me", &server.token_for(outsider))
        .await
        .unwrap();
    let me: MeResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!me.in_guild);
    assert!(!me.is_staff);
    assert!(me.application.is_none());
}

#[tokio::test]
async fn test_admin_routes_require_staff() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let member_id = unique_id();
    server
        .platform
        .add_member(MockMember::new(member_id, format!("pleb{member_id}")).role(MEMBER_ROLE));

    let response = server
        .get_auth("/api/v1/admin/roster", &server.token_for(member_id))
        .await
        .unwrap();
    let err: ErrorEnvelope = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(err.error.code, "MISSING_STAFF_ROLE");

    let response = server.get("/api/v1/admin/promotions").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Roster Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_update_roster_member() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.staff_token();
    let name = format!("create{}", unique_id());

    let response = server
        .post_auth("/api/v1/admin/roster", &token, &new_member(&name, None, 20, true))
        .await
        .unwrap();
    let created: RosterEnvelope = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert!(created.ok);
    assert_eq!(created.member.time_in_clan_days, 20);
    assert!(created.member.promote_eligible);
    assert_eq!(created.member.rank_next.as_deref(), Some("Corporal"));
    assert!(created.member.needs_resolution);

    // Dropping the tag freezes tenure and clears eligibility
    let response = server
        .patch_auth(
            &format!("/api/v1/admin/roster/{}", created.member.id),
            &token,
            &json!({ "has_420_tag": false }),
        )
        .await
        .unwrap();
    let updated: RosterEnvelope = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!updated.member.has_420_tag);
    assert!(!updated.member.promote_eligible);
    assert_eq!(updated.member.time_in_clan_days, 20);

    let response = server
        .get_auth(&format!("/api/v1/admin/roster?search={name}"), &token)
        .await
        .unwrap();
    let page: RosterPage = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.members[0].discord_name, name);
}

#[tokio::test]
async fn test_roster_member_errors() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.staff_token();

    let response = server
        .patch_auth("/api/v1/admin/roster/12345", &token, &json!({ "status": "inactive" }))
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .patch_auth("/api/v1/admin/roster/not-an-id", &token, &json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .post_auth("/api/v1/admin/roster", &token, &json!({ "discord_name": "x" }))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    // Same UID twice
    let first = new_member(&format!("dup{}", unique_id()), None, 5, false);
    let response = server
        .post_auth("/api/v1/admin/roster", &token, &first)
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();
    let mut second = new_member(&format!("dup{}", unique_id()), None, 5, false);
    second["uid"] = first["uid"].clone();
    let response = server
        .post_auth("/api/v1/admin/roster", &token, &second)
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_import_resolves_names_and_updates_on_reimport() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.staff_token();

    let tagged_id = unique_id();
    let tagged = format!("alpha{tagged_id}");
    server
        .platform
        .add_member(MockMember::new(tagged_id, tagged.clone()).nick(format!("{tagged} [420]")));
    let missing = format!("ghost{}", unique_id());
    let uid_a = format!("UID{}", unique_id());
    let uid_b = format!("UID{}", unique_id());

    let rows = json!({
        "rows": [
            { "Discord Name": tagged, "IGN": "Alpha", "UID": uid_a, "Join Date": days_ago(3), "Role Given": "Private" },
            { "Discord Name": missing, "IGN": "Ghost", "UID": uid_b, "Join Date": days_ago(3) },
            { "Discord Name": "", "IGN": "Broken", "UID": "", "Join Date": "" },
        ]
    });
    let response = server
        .post_auth("/api/v1/admin/roster/import", &token, &rows)
        .await
        .unwrap();
    let result: ImportResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(result.ok);
    assert_eq!(result.imported, 2);
    assert_eq!(result.updated, 0);
    assert_eq!(result.unresolved, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Row 3"));

    let response = server
        .get_auth(&format!("/api/v1/admin/roster?search={uid_a}"), &token)
        .await
        .unwrap();
    let page: RosterPage = assert_json(response, StatusCode::OK).await.unwrap();
    let member = &page.members[0];
    assert_eq!(member.discord_id, Some(tagged_id.to_string()));
    assert!(member.has_420_tag);
    assert_eq!(member.resolution_status, "resolved_auto");
    assert_eq!(member.source, "csv");

    // Re-importing the same UID updates instead of inserting, as CSV this time
    let csv = format!(
        "Discord Name,IGN,UID,Join Date\n{tagged},Alpha Renamed,{uid_a},{}\n",
        days_ago(3)
    );
    // A different staff member, since imports are throttled per actor
    let other_staff = unique_id();
    server.platform.add_member(
        MockMember::new(other_staff, format!("staff{other_staff}")).role(STAFF_ROLE),
    );
    let response = server
        .post_auth(
            "/api/v1/admin/roster/import",
            &server.token_for(other_staff),
            &json!({ "csv": csv }),
        )
        .await
        .unwrap();
    let result: ImportResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(result.imported, 0);
    assert_eq!(result.updated, 1);
}

#[tokio::test]
async fn test_import_cooldown_and_batch_limit() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_with(|roster| roster.import_max_rows = 2)
        .await
        .expect("Failed to start server");
    let token = server.staff_token();

    let response = server
        .post_auth("/api/v1/admin/roster/import", &token, &json!({ "rows": [] }))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let oversized = json!({ "rows": [{ "UID": "a" }, { "UID": "b" }, { "UID": "c" }] });
    let response = server
        .post_auth("/api/v1/admin/roster/import", &token, &oversized)
        .await
        .unwrap();
    let err: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err.error.code, "BATCH_TOO_LARGE");

    let row = json!({ "rows": [{
        "Discord Name": format!("cool{}", unique_id()),
        "IGN": "Cool",
        "UID": format!("UID{}", unique_id()),
        "Join Date": days_ago(1),
    }] });
    let response = server
        .post_auth("/api/v1/admin/roster/import", &token, &row)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .post_auth("/api/v1/admin/roster/import", &token, &row)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .expect("Retry-After header");
    assert!(retry_after > 0 && retry_after <= 60);
}

// ============================================================================
// Resolution Tests
// ============================================================================

#[tokio::test]
async fn test_search_then_resolve_with_token() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.staff_token();

    let target_id = unique_id();
    let handle = format!("bravo{target_id}");
    server
        .platform
        .add_member(MockMember::new(target_id, handle.clone()).nick("Bravo [420]"));

    let response = server
        .post_auth(
            "/api/v1/admin/roster",
            &token,
            &new_member(&format!("sheet-{handle}"), None, 10, true),
        )
        .await
        .unwrap();
    let created: RosterEnvelope = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .get_auth(
            &format!("/api/v1/admin/guild-members/search?q={handle}&limit=5"),
            &token,
        )
        .await
        .unwrap();
    let list: CandidateList = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(list.candidates.len(), 1);
    assert_eq!(list.candidates[0].label, handle);
    assert!(list.candidates[0].sublabel.contains("Bravo [420]"));

    let response = server
        .post_auth(
            &format!("/api/v1/admin/roster/{}/resolve", created.member.id),
            &token,
            &json!({ "resolve_token": list.candidates[0].resolve_token }),
        )
        .await
        .unwrap();
    let resolved: RosterEnvelope = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(resolved.member.discord_id, Some(target_id.to_string()));
    assert_eq!(resolved.member.resolution_status, "resolved_manual");
    assert_eq!(resolved.member.resolved_by, Some(server.staff_id.to_string()));
    assert!(!resolved.member.needs_resolution);

    // An id outside the guild is refused
    let response = server
        .post_auth(
            &format!("/api/v1/admin/roster/{}/resolve", created.member.id),
            &token,
            &json!({ "discord_id": unique_id().to_string() }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_bulk_resolve_links_exact_names() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.staff_token();

    let id = unique_id();
    let name = format!("charlie{id}");
    let response = server
        .post_auth("/api/v1/admin/roster", &token, &new_member(&name, None, 2, false))
        .await
        .unwrap();
    let created: RosterEnvelope = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert!(created.member.needs_resolution);

    // Joins the guild after being added to the sheet
    server.platform.add_member(MockMember::new(id, name.clone()));

    let response = server
        .post_auth("/api/v1/admin/roster/bulk-resolve", &token, &json!({}))
        .await
        .unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    let detail = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["discord_name"] == name.as_str())
        .expect("row reported");
    assert_eq!(detail["result"], "resolved");

    let response = server
        .get_auth(&format!("/api/v1/admin/roster?search={name}"), &token)
        .await
        .unwrap();
    let page: RosterPage = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.members[0].discord_id, Some(id.to_string()));
    assert_eq!(page.members[0].resolution_status, "resolved_auto");
}

// ============================================================================
// Application Tests
// ============================================================================

#[tokio::test]
async fn test_application_submit_and_accept() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let applicant = unique_id();
    server.platform.add_member(
        MockMember::new(applicant, format!("ace{applicant}"))
            .nick("Ace")
            .role(APPLICANT_ROLE),
    );
    let applicant_token = server.token_for(applicant);
    let uid = format!("UID{}", unique_id());

    let response = server
        .post_auth("/api/v1/applications", &applicant_token, &application_form(&uid))
        .await
        .unwrap();
    let application: ApplicationResponse =
        assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(application.status, "pending");
    assert_eq!(application.display_name, "Ace");

    let response = server
        .post_auth("/api/v1/applications", &applicant_token, &application_form(&uid))
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();

    let response = server.get_auth("/api/v1/me", &applicant_token).await.unwrap();
    let me: MeResponse = assert_json(response, StatusCode::OK).await.unwrap();
    let summary = me.application.expect("latest application");
    assert_eq!(summary.id, application.id);
    assert_eq!(summary.status, "pending");

    let token = server.staff_token();
    let response = server
        .get_auth("/api/v1/admin/applications?status=pending", &token)
        .await
        .unwrap();
    let list: ApplicationListResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(list.applications.iter().any(|a| a.id == application.id));

    let response = server
        .post_auth(
            &format!("/api/v1/admin/applications/{}/review", application.id),
            &token,
            &json!({ "action": "accept", "note": "welcome" }),
        )
        .await
        .unwrap();
    let review: ReviewResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(review.ok);
    assert_eq!(review.status, "accepted");
    assert_eq!(review.clan_member_upsert_ok, Some(true));
    assert_eq!(review.role_assigned, Some(true));
    assert_eq!(review.role_removed, Some(true));
    assert!(review.clan_member_id.is_some());

    let roles = server.platform.member_roles(applicant);
    assert!(roles.contains(&MEMBER_ROLE));
    assert!(!roles.contains(&APPLICANT_ROLE));

    let messages = server.platform.messages();
    assert!(messages.iter().any(|(channel, content)| {
        *channel == APP_LOG_CHANNEL
            && content.starts_with(&format!("[Application {}]", application.id))
    }));

    let response = server
        .get_auth(&format!("/api/v1/admin/roster?search={uid}"), &token)
        .await
        .unwrap();
    let page: RosterPage = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.members[0].discord_id, Some(applicant.to_string()));
    assert_eq!(page.members[0].source, "application");

    // A decided application cannot be reviewed again
    let response = server
        .post_auth(
            &format!("/api/v1/admin/applications/{}/review", application.id),
            &token,
            &json!({ "action": "reject" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_application_reject() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let applicant = unique_id();
    server
        .platform
        .add_member(MockMember::new(applicant, format!("dee{applicant}")));

    let response = server
        .post_auth(
            "/api/v1/applications",
            &server.token_for(applicant),
            &json!({ "ign": "Dee" }),
        )
        .await
        .unwrap();
    let application: ApplicationResponse =
        assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_auth(
            &format!("/api/v1/admin/applications/{}/review", application.id),
            &server.staff_token(),
            &json!({ "action": "reject", "reason": "too new" }),
        )
        .await
        .unwrap();
    let review: ReviewResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(review.status, "rejected");
    assert!(server.platform.role_changes().is_empty());

    let messages = server.platform.messages();
    assert!(messages
        .iter()
        .any(|(_, content)| content.contains("Reason: too new")));
}

#[tokio::test]
async fn test_application_requires_guild_membership() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .post_auth(
            "/api/v1/applications",
            &server.token_for(unique_id()),
            &json!({ "ign": "Stranger" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Promotion Queue Tests
// ============================================================================

#[tokio::test]
async fn test_promotion_pipeline() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.staff_token();

    let mut members = Vec::new();
    for days in [20, 35] {
        let platform_id = unique_id();
        let name = format!("delta{platform_id}");
        server
            .platform
            .add_member(MockMember::new(platform_id, name.clone()).nick(format!("{name} 420")));
        let response = server
            .post_auth(
                "/api/v1/admin/roster",
                &token,
                &new_member(&name, Some(platform_id), days, true),
            )
            .await
            .unwrap();
        let created: RosterEnvelope = assert_json(response, StatusCode::CREATED).await.unwrap();
        members.push((created.member.id, platform_id));
    }

    let response = server
        .post_auth("/api/v1/admin/promotions/build", &token, &json!({}))
        .await
        .unwrap();
    let built: BuildResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(built.queued_added_count >= 2);
    assert!(built.total_queued_count >= 2);

    // Building again adds nothing for these members
    let response = server
        .post_auth("/api/v1/admin/promotions/build", &token, &json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .get_auth("/api/v1/admin/promotions", &token)
        .await
        .unwrap();
    let queue: PromotionQueue = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(queue.confirm_threshold, 1);
    let ours: Vec<&PromotionItem> = queue
        .items
        .iter()
        .filter(|i| members.iter().any(|(id, _)| *id == i.clan_member_id))
        .collect();
    assert_eq!(ours.len(), 2);
    let to_ranks: Vec<&str> = ours.iter().map(|i| i.to_rank.as_str()).collect();
    assert!(to_ranks.contains(&"Corporal"));
    assert!(to_ranks.contains(&"Sergeant"));

    let response = server
        .post_auth("/api/v1/admin/promotions/confirm", &token, &json!({}))
        .await
        .unwrap();
    let confirmed: ConfirmResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(confirmed.confirmed_count >= 2);

    let response = server
        .post_auth("/api/v1/admin/promotions/process", &token, &json!({}))
        .await
        .unwrap();
    let processed: ProcessResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(processed.processed_count >= 2);
    assert!(processed.announcement_posted);

    for (_, platform_id) in &members {
        assert!(server
            .platform
            .role_changes()
            .iter()
            .any(|c| matches!(c, RoleChange::Added { user_id, .. } if user_id == platform_id)));
        assert!(server
            .platform
            .messages()
            .iter()
            .any(|(channel, content)| *channel == PROMOTION_CHANNEL
                && content.contains(&format!("<@{platform_id}>"))));
    }

    let response = server
        .get_auth(&format!("/api/v1/admin/roster?search=delta{}", members[0].1), &token)
        .await
        .unwrap();
    let page: RosterPage = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.members[0].rank_current, "Corporal");
    assert!(!page.members[0].promote_eligible);

    // Processed items cannot be removed or retried
    let item_id = &ours[0].id;
    let response = server
        .post_auth(&format!("/api/v1/admin/promotions/{item_id}/remove"), &token, &json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
    let response = server
        .post_auth(&format!("/api/v1/admin/promotions/{item_id}/retry"), &token, &json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_queue_clear_needs_confirmation_and_unknown_item() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.staff_token();

    let response = server
        .post_auth("/api/v1/admin/promotions/clear", &token, &json!({}))
        .await
        .unwrap();
    let err: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err.error.code, "CONFIRMATION_REQUIRED");

    let response = server
        .post_auth("/api/v1/admin/promotions/12345/remove", &token, &json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}
