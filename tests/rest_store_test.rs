use anyhow::Result;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use roomfinder::adapters::{BackendClient, RestListingStore};
use roomfinder::core::ListingStore;
use roomfinder::domain::model::NewListing;
use roomfinder::{
    Account, AccountId, ListingDraft, ListingId, ListingPatch, ListingQuery, PropertyType,
    RoomError, Session, TenantPreference,
};
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

const ANON_KEY: &str = "anon-key";

fn store(server: &MockServer) -> Result<RestListingStore> {
    let client = BackendClient::new(&server.base_url(), ANON_KEY, Duration::from_secs(5))?;
    Ok(RestListingStore::new(client, "rooms"))
}

fn session(owner: AccountId) -> Session {
    Session {
        access_token: "user-jwt".to_string(),
        refresh_token: None,
        expires_at: None,
        account: Account {
            id: owner,
            email: Some("owner@example.com".to_string()),
        },
    }
}

fn row(id: ListingId, owner: AccountId, title: &str, created_at: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "description": "Near the station",
        "location": "Pune",
        "rent": 8000,
        "property_type": "1BHK",
        "tenant_preference": "Working Professional",
        "contact_number": "9876543210",
        "images": ["https://cdn.example.com/a.png"],
        "owner_id": owner,
        "created_at": created_at
    })
}

#[tokio::test]
async fn test_select_sends_filters_and_anon_auth() -> Result<()> {
    let server = MockServer::start_async().await;
    let owner = AccountId(Uuid::new_v4());
    let id = ListingId(Uuid::new_v4());

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/rooms")
                .query_param("select", "*")
                .query_param("order", "created_at.desc")
                .query_param("location", "ilike.*Pune*")
                .query_param("limit", "20")
                .header("apikey", ANON_KEY)
                .header("authorization", format!("Bearer {}", ANON_KEY).as_str());
            then.status(200).json_body(json!([
                row(id, owner, "Sunny Flat", "2024-03-01T10:00:00+00:00")
            ]));
        })
        .await;

    let query = ListingQuery {
        owner_id: None,
        location: Some("Pune".to_string()),
        limit: Some(20),
    };
    let listings = store(&server)?.select(&query, None).await?;

    mock.assert_async().await;
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].id, id);
    assert_eq!(listings[0].rent, 8000.0);
    assert_eq!(
        listings[0].tenant_preference,
        TenantPreference::WorkingProfessional
    );
    Ok(())
}

#[tokio::test]
async fn test_select_by_owner_uses_session_token() -> Result<()> {
    let server = MockServer::start_async().await;
    let owner = AccountId(Uuid::new_v4());

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/rooms")
                .query_param("owner_id", format!("eq.{}", owner).as_str())
                .header("authorization", "Bearer user-jwt");
            then.status(200).json_body(json!([]));
        })
        .await;

    let listings = store(&server)?
        .select(&ListingQuery::owned_by(owner), Some(&session(owner)))
        .await?;

    mock.assert_async().await;
    assert!(listings.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_select_by_id_missing_row_is_none() -> Result<()> {
    let server = MockServer::start_async().await;
    let id = ListingId(Uuid::new_v4());

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/rooms")
                .query_param("id", format!("eq.{}", id).as_str())
                .query_param("limit", "1");
            then.status(200).json_body(json!([]));
        })
        .await;

    assert!(store(&server)?.select_by_id(id, None).await?.is_none());
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_insert_posts_owner_and_returns_row() -> Result<()> {
    let server = MockServer::start_async().await;
    let owner = AccountId(Uuid::new_v4());
    let id = ListingId(Uuid::new_v4());

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/rooms")
                .header("prefer", "return=representation")
                .header("authorization", "Bearer user-jwt")
                .body_contains(format!("\"owner_id\":\"{}\"", owner))
                .body_contains("\"property_type\":\"1BHK\"");
            then.status(201).json_body(json!([
                row(id, owner, "Sunny Flat", "2024-03-01T10:00:00Z")
            ]));
        })
        .await;

    let new_row = NewListing {
        draft: ListingDraft {
            title: "Sunny Flat".to_string(),
            description: "Near the station".to_string(),
            location: "Pune".to_string(),
            rent: 8000.0,
            property_type: PropertyType::OneBhk,
            tenant_preference: TenantPreference::WorkingProfessional,
            contact_number: "9876543210".to_string(),
            images: vec![],
        },
        owner_id: owner,
    };
    let listing = store(&server)?.insert(&new_row, &session(owner)).await?;

    mock.assert_async().await;
    assert_eq!(listing.id, id);
    assert_eq!(listing.owner_id, owner);
    Ok(())
}

#[tokio::test]
async fn test_update_sends_only_patched_fields() -> Result<()> {
    let server = MockServer::start_async().await;
    let owner = AccountId(Uuid::new_v4());
    let id = ListingId(Uuid::new_v4());

    let mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/rest/v1/rooms")
                .query_param("id", format!("eq.{}", id).as_str())
                .json_body(json!({"rent": 7000.0}));
            then.status(200).json_body(json!([
                row(id, owner, "Sunny Flat", "2024-03-01T10:00:00Z")
            ]));
        })
        .await;

    let patch = ListingPatch {
        rent: Some(7000.0),
        ..Default::default()
    };
    let updated = store(&server)?.update(id, &patch, &session(owner)).await?;

    mock.assert_async().await;
    assert!(updated.is_some());
    Ok(())
}

#[tokio::test]
async fn test_delete_reports_whether_a_row_went_away() -> Result<()> {
    let server = MockServer::start_async().await;
    let owner = AccountId(Uuid::new_v4());
    let gone = ListingId(Uuid::new_v4());
    let missing = ListingId(Uuid::new_v4());

    server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/rest/v1/rooms")
                .query_param("id", format!("eq.{}", gone).as_str());
            then.status(200).json_body(json!([
                row(gone, owner, "Old", "2024-01-01T00:00:00Z")
            ]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/rest/v1/rooms")
                .query_param("id", format!("eq.{}", missing).as_str());
            then.status(200).json_body(json!([]));
        })
        .await;

    let store = store(&server)?;
    assert!(store.delete(gone, &session(owner)).await?);
    assert!(!store.delete(missing, &session(owner)).await?);
    Ok(())
}

#[tokio::test]
async fn test_error_statuses_map_to_domain_errors() -> Result<()> {
    let server = MockServer::start_async().await;
    let owner = AccountId(Uuid::new_v4());
    let forbidden = ListingId(Uuid::new_v4());
    let conflict = ListingId(Uuid::new_v4());
    let down = ListingId(Uuid::new_v4());

    server
        .mock_async(|when, then| {
            when.method(DELETE)
                .query_param("id", format!("eq.{}", forbidden).as_str());
            then.status(403).json_body(json!({
                "code": "42501",
                "message": "permission denied for table rooms"
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(DELETE)
                .query_param("id", format!("eq.{}", conflict).as_str());
            then.status(409).json_body(json!({
                "code": "23503",
                "message": "violates foreign key constraint"
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).query_param("id", format!("eq.{}", down).as_str());
            then.status(503).body("maintenance");
        })
        .await;

    let store = store(&server)?;
    let session = session(owner);

    assert!(matches!(
        store.delete(forbidden, &session).await,
        Err(RoomError::Forbidden { .. })
    ));
    match store.delete(conflict, &session).await {
        Err(RoomError::ValidationError { message, .. }) => {
            assert_eq!(message, "violates foreign key constraint")
        }
        other => panic!("expected ValidationError, got {:?}", other),
    }
    match store.delete(down, &session).await {
        Err(e @ RoomError::StorageUnavailable { .. }) => assert!(e.is_retryable()),
        other => panic!("expected StorageUnavailable, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_unreachable_backend_is_storage_unavailable() -> Result<()> {
    let client = BackendClient::new("http://127.0.0.1:9", ANON_KEY, Duration::from_secs(2))?;
    let store = RestListingStore::new(client, "rooms");

    let result = store.select(&ListingQuery::default(), None).await;
    assert!(matches!(result, Err(RoomError::StorageUnavailable { .. })));
    Ok(())
}

#[tokio::test]
async fn test_select_tolerates_null_columns() -> Result<()> {
    let server = MockServer::start_async().await;
    let owner = AccountId(Uuid::new_v4());
    let good = ListingId(Uuid::new_v4());
    let sparse = ListingId(Uuid::new_v4());

    let mut sparse_row = row(sparse, owner, "Bare Room", "2024-02-01T10:00:00Z");
    sparse_row["description"] = serde_json::Value::Null;
    sparse_row["images"] = serde_json::Value::Null;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/rooms");
            then.status(200).json_body(json!([
                row(good, owner, "Sunny Flat", "2024-03-01T10:00:00Z"),
                sparse_row
            ]));
        })
        .await;

    let listings = store(&server)?
        .select(&ListingQuery::default(), None)
        .await?;

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].id, good);
    assert_eq!(listings[1].id, sparse);
    assert_eq!(listings[1].description, "");
    assert!(listings[1].images.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unreadable_body_is_storage_unavailable() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/rooms");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"[{"id": "not-a-uuid"}]"#);
        })
        .await;

    let result = store(&server)?.select(&ListingQuery::default(), None).await;

    match result {
        Err(RoomError::StorageUnavailable { message }) => {
            assert!(message.starts_with("unreadable list response"), "{}", message)
        }
        other => panic!("expected StorageUnavailable, got {:?}", other),
    }
    Ok(())
}
