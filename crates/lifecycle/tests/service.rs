//! End-to-end tests for the lifecycle facade against a real database.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use huduma_core::error::CoreError;
use huduma_lifecycle::inputs::{
    DiscoveryFilter, FilterParams, NewBid, NewLocation, NewRequest, SearchQuery,
};
use huduma_lifecycle::{LifecycleConfig, LifecycleError, LifecycleService};
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const NAIROBI_CBD: (f64, f64) = (-1.2833, 36.8167);
const KILIMANI: (f64, f64) = (-1.3000, 36.8000);

fn service(pool: PgPool) -> LifecycleService {
    LifecycleService::new(pool, LifecycleConfig::default())
}

async fn seed_user(pool: &PgPool, user_id: &str, first: &str, last: &str) {
    sqlx::query("INSERT INTO users (user_id, first_name, last_name) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(first)
        .bind(last)
        .execute(pool)
        .await
        .unwrap();
}

async fn seed_category(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO categories (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn seed_provider(pool: &PgPool, user_id: &str, first: &str, last: &str) {
    seed_user(pool, user_id, first, last).await;
    sqlx::query("INSERT INTO providers (provider_id, user_id) VALUES ($1, $2)")
        .bind(Uuid::new_v4())
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}

fn titled(title: &str) -> NewRequest {
    NewRequest {
        title: title.to_string(),
        ..Default::default()
    }
}

fn at(coords: (f64, f64), address: &str) -> NewLocation {
    NewLocation {
        latitude: Some(coords.0),
        longitude: Some(coords.1),
        address: address.to_string(),
        ..Default::default()
    }
}

fn core(err: LifecycleError) -> CoreError {
    match err {
        LifecycleError::Core(e) => e,
        other => panic!("expected a domain error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bid_accept_complete_scenario(pool: PgPool) {
    seed_user(&pool, "client-1", "Wanjiru", "Kamau").await;
    seed_provider(&pool, "prov-a", "Otieno", "Odhiambo").await;
    seed_provider(&pool, "prov-b", "Achieng", "Njeri").await;
    let svc = service(pool);

    let r1 = svc.create_request("client-1", titled("Fix sink")).await.unwrap();
    let r1_id = r1.request.booking_id.to_string();

    let b1 = svc
        .submit_bid("prov-a", &r1_id, NewBid { amount: 1500 })
        .await
        .unwrap();
    let b2 = svc
        .submit_bid("prov-b", &r1_id, NewBid { amount: 1200 })
        .await
        .unwrap();

    let accepted = svc.accept_bid("client-1", b1.id).await.unwrap();
    assert_eq!(accepted.request.status, "pending");
    assert_eq!(accepted.request.provider_id, Some(b1.provider_id));

    let err = core(svc.accept_bid("client-1", b2.id).await.unwrap_err());
    assert_matches!(err, CoreError::Conflict(msg) if msg.contains("pending"));

    let done = svc.complete_booking("client-1", &r1_id).await.unwrap();
    assert_eq!(done.status, "completed");

    let err = core(svc.cancel_booking("client-1", &r1_id).await.unwrap_err());
    assert_matches!(err, CoreError::Conflict(msg) if msg.contains("completed"));

    let detail = svc.find_request(&r1_id).await.unwrap();
    assert_eq!(detail.request.status, "completed");
    assert_eq!(detail.bids_count, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_accept_reports_one_conflict(pool: PgPool) {
    seed_user(&pool, "client-1", "Wanjiru", "Kamau").await;
    seed_provider(&pool, "prov-a", "Otieno", "Odhiambo").await;
    seed_provider(&pool, "prov-b", "Achieng", "Njeri").await;
    let svc = service(pool);

    let r = svc.create_request("client-1", titled("Wire the shed")).await.unwrap();
    let r_id = r.request.booking_id.to_string();
    let b1 = svc.submit_bid("prov-a", &r_id, NewBid { amount: 10 }).await.unwrap();
    let b2 = svc.submit_bid("prov-b", &r_id, NewBid { amount: 20 }).await.unwrap();

    let (x, y) = tokio::join!(
        svc.accept_bid("client-1", b1.id),
        svc.accept_bid("client-1", b2.id),
    );
    let results = [x, y];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = results.into_iter().find_map(Result::err).unwrap();
    assert_matches!(core(loser), CoreError::Conflict(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bid_rules(pool: PgPool) {
    seed_user(&pool, "client-1", "Wanjiru", "Kamau").await;
    seed_user(&pool, "plain-user", "Baraka", "Mwangi").await;
    seed_provider(&pool, "prov-a", "Otieno", "Odhiambo").await;
    let svc = service(pool);

    let r = svc.create_request("client-1", titled("Fix roof")).await.unwrap();
    let r_id = r.request.booking_id.to_string();

    assert_matches!(
        core(svc.submit_bid("plain-user", &r_id, NewBid { amount: 10 }).await.unwrap_err()),
        CoreError::Forbidden(_)
    );
    assert_matches!(
        core(svc.submit_bid("prov-a", &r_id, NewBid { amount: 0 }).await.unwrap_err()),
        CoreError::Validation(_)
    );
    assert_matches!(
        core(svc.submit_bid("prov-a", "not-a-uuid", NewBid { amount: 10 }).await.unwrap_err()),
        CoreError::Validation(_)
    );
    assert_matches!(
        core(
            svc.submit_bid("prov-a", &Uuid::new_v4().to_string(), NewBid { amount: 10 })
                .await
                .unwrap_err()
        ),
        CoreError::NotFound { entity: "Request", .. }
    );

    svc.submit_bid("prov-a", &r_id, NewBid { amount: 10 }).await.unwrap();
    assert_matches!(
        core(svc.submit_bid("prov-a", &r_id, NewBid { amount: 8 }).await.unwrap_err()),
        CoreError::Conflict(_)
    );

    assert_eq!(svc.list_my_bids("prov-a").await.unwrap().len(), 1);
    assert!(svc.list_my_bids("plain-user").await.unwrap().is_empty());
    assert_eq!(svc.list_bids_for_request(&r_id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_client_may_accept_or_complete(pool: PgPool) {
    seed_user(&pool, "client-1", "Wanjiru", "Kamau").await;
    seed_provider(&pool, "prov-a", "Otieno", "Odhiambo").await;
    let svc = service(pool);

    let r = svc.create_request("client-1", titled("Move sofa")).await.unwrap();
    let r_id = r.request.booking_id.to_string();
    let bid = svc.submit_bid("prov-a", &r_id, NewBid { amount: 40 }).await.unwrap();

    assert_matches!(
        core(svc.accept_bid("prov-a", bid.id).await.unwrap_err()),
        CoreError::Forbidden(_)
    );
    svc.accept_bid("client-1", bid.id).await.unwrap();
    assert_matches!(
        core(svc.complete_booking("prov-a", &r_id).await.unwrap_err()),
        CoreError::Forbidden(_)
    );
    let cancelled = svc.cancel_booking("prov-a", &r_id).await.unwrap();
    assert_eq!(cancelled.status, "cancelled");
}

// ---------------------------------------------------------------------------
// Create request
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_validates_before_writing(pool: PgPool) {
    seed_user(&pool, "client-1", "Wanjiru", "Kamau").await;
    let svc = service(pool.clone());

    assert_matches!(
        core(svc.create_request("client-1", titled("   ")).await.unwrap_err()),
        CoreError::Validation(_)
    );
    let bad_time = NewRequest {
        start_at: Some("next tuesday".into()),
        ..titled("Clean windows")
    };
    assert_matches!(
        core(svc.create_request("client-1", bad_time).await.unwrap_err()),
        CoreError::Validation(_)
    );
    let bad_location = NewRequest {
        location_id: Some("nope".into()),
        ..titled("Clean windows")
    };
    assert_matches!(
        core(svc.create_request("client-1", bad_location).await.unwrap_err()),
        CoreError::Validation(_)
    );

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_urgent_request_gets_default_start(pool: PgPool) {
    seed_user(&pool, "client-1", "Wanjiru", "Kamau").await;
    let svc = service(pool);
    let before = Utc::now();

    let urgent = NewRequest {
        is_urgent: true,
        photos: vec![
            "https://cdn.example.com/b.jpg".into(),
            "https://cdn.example.com/a.jpg".into(),
        ],
        ..titled("Burst pipe")
    };
    let created = svc.create_request("client-1", urgent).await.unwrap();

    let start = created.request.start_at.unwrap();
    assert!(start >= before + Duration::hours(24));
    assert!(start <= Utc::now() + Duration::hours(24));
    assert_eq!(
        created.photos,
        vec!["https://cdn.example.com/b.jpg", "https://cdn.example.com/a.jpg"]
    );

    let detail = svc
        .find_request(&created.request.booking_id.to_string())
        .await
        .unwrap();
    assert_eq!(detail.photos, created.photos);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_request_location_must_belong_to_client(pool: PgPool) {
    seed_user(&pool, "client-1", "Wanjiru", "Kamau").await;
    seed_user(&pool, "client-2", "Baraka", "Mwangi").await;
    let svc = service(pool);

    let theirs = svc.add_location("client-2", at(KILIMANI, "Kilimani")).await.unwrap();
    let input = NewRequest {
        location_id: Some(theirs.location_id.to_string()),
        ..titled("Fix gate")
    };
    assert_matches!(
        core(svc.create_request("client-1", input).await.unwrap_err()),
        CoreError::NotFound { entity: "Location", .. }
    );
}

// ---------------------------------------------------------------------------
// Discovery and search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_discovery_distance_cutoff(pool: PgPool) {
    seed_user(&pool, "client-1", "Wanjiru", "Kamau").await;
    seed_provider(&pool, "prov-a", "Otieno", "Odhiambo").await;
    let svc = service(pool);

    let site = svc.add_location("client-1", at(KILIMANI, "Kilimani")).await.unwrap();
    let located = NewRequest {
        location_id: Some(site.location_id.to_string()),
        ..titled("Fix sink")
    };
    svc.create_request("client-1", located).await.unwrap();
    svc.create_request("client-1", titled("No address given")).await.unwrap();

    let within = |max: f64| DiscoveryFilter {
        latitude: Some(NAIROBI_CBD.0),
        longitude: Some(NAIROBI_CBD.1),
        max_distance_km: Some(max),
        ..Default::default()
    };

    let near = svc.all_requests("prov-a", within(1.0)).await.unwrap();
    let titles: Vec<&str> = near.iter().map(|m| m.item.title.as_str()).collect();
    assert_eq!(titles, vec!["No address given"]);

    let wide = svc.all_requests("prov-a", within(5.0)).await.unwrap();
    assert_eq!(wide.len(), 2);
    let located = wide.iter().find(|m| m.item.title == "Fix sink").unwrap();
    let d = located.distance_km.unwrap();
    assert!(d > 1.0 && d < 5.0, "got {d}");

    // No origin given and no default location: nothing is measured or dropped.
    let unknown = svc
        .all_requests(
            "prov-a",
            DiscoveryFilter {
                max_distance_km: Some(1.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(unknown.len(), 2);
    assert!(unknown.iter().all(|m| m.distance_km.is_none()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_discovery_falls_back_to_default_location(pool: PgPool) {
    seed_user(&pool, "client-1", "Wanjiru", "Kamau").await;
    seed_provider(&pool, "prov-a", "Otieno", "Odhiambo").await;
    let svc = service(pool);

    let site = svc.add_location("client-1", at(KILIMANI, "Kilimani")).await.unwrap();
    svc.create_request(
        "client-1",
        NewRequest {
            location_id: Some(site.location_id.to_string()),
            ..titled("Fix sink")
        },
    )
    .await
    .unwrap();
    svc.add_location("prov-a", at(NAIROBI_CBD, "CBD")).await.unwrap();

    let feed = svc
        .all_requests(
            "prov-a",
            DiscoveryFilter {
                max_distance_km: Some(1.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(feed.is_empty());

    let feed = svc.all_requests("prov-a", DiscoveryFilter::default()).await.unwrap();
    assert_eq!(feed[0].distance.as_deref(), Some("2.6"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_aggregates_categories_and_finds_providers(pool: PgPool) {
    seed_user(&pool, "client-1", "Wanjiru", "Kamau").await;
    seed_provider(&pool, "prov-a", "Paul", "Plumbley").await;
    let plumbing = seed_category(&pool, "Plumbing").await;
    let svc = service(pool);

    for title in ["Leaking tap", "Blocked drain"] {
        svc.create_request(
            "client-1",
            NewRequest {
                category_id: Some(plumbing),
                ..titled(title)
            },
        )
        .await
        .unwrap();
    }
    svc.create_request("client-1", titled("Plumbing advice")).await.unwrap();
    svc.create_request("client-1", titled("Mow lawn")).await.unwrap();

    let query = SearchQuery {
        q: Some("plumb".into()),
        ..Default::default()
    };
    let results = svc.search(&query).await.unwrap();

    assert_eq!(results.providers.len(), 1);
    assert_eq!(results.providers[0].item.user_id, "prov-a");

    let counts: Vec<_> = results
        .categories
        .iter()
        .map(|c| (c.category_name.as_deref(), c.count))
        .collect();
    assert_eq!(counts, vec![(Some("Plumbing"), 2), (None, 1)]);

    let categories = svc.list_request_categories().await.unwrap();
    assert_eq!(categories.len(), 1);

    let bad = SearchQuery {
        latitude: Some(1.0),
        ..Default::default()
    };
    assert_matches!(core(svc.search(&bad).await.unwrap_err()), CoreError::Validation(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_request_search_honours_category_with_or_without_query(pool: PgPool) {
    seed_user(&pool, "client-1", "Wanjiru", "Kamau").await;
    let plumbing = seed_category(&pool, "Plumbing").await;
    let cleaning = seed_category(&pool, "Cleaning").await;
    let svc = service(pool);

    for (title, category) in [("Leaking tap", plumbing), ("Wash carpets", cleaning)] {
        svc.create_request(
            "client-1",
            NewRequest {
                category_id: Some(category),
                ..titled(title)
            },
        )
        .await
        .unwrap();
    }

    let names = |counts: Vec<huduma_core::matching::CategoryCount>| -> Vec<Option<String>> {
        counts.into_iter().map(|c| c.category_name).collect()
    };

    let blank = SearchQuery {
        category_id: Some(plumbing),
        ..Default::default()
    };
    assert_eq!(
        names(svc.instant_search_requests(&blank).await.unwrap()),
        vec![Some("Plumbing".to_string())]
    );

    // "a" matches both titles; the category still narrows it down.
    let with_query = SearchQuery {
        q: Some("a".into()),
        category_id: Some(plumbing),
        ..Default::default()
    };
    assert_eq!(
        names(svc.instant_search_requests(&with_query).await.unwrap()),
        vec![Some("Plumbing".to_string())]
    );
    let combined = svc.search(&with_query).await.unwrap();
    assert_eq!(names(combined.categories), vec![Some("Plumbing".to_string())]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_filter_requests_by_status(pool: PgPool) {
    seed_user(&pool, "client-1", "Wanjiru", "Kamau").await;
    let svc = service(pool);
    let r = svc.create_request("client-1", titled("One")).await.unwrap();
    svc.create_request("client-1", titled("Two")).await.unwrap();
    svc.cancel_booking("client-1", &r.request.booking_id.to_string())
        .await
        .unwrap();

    let cancelled = svc
        .filter_requests(FilterParams {
            client_id: Some("client-1".into()),
            status: Some("cancelled".into()),
        })
        .await
        .unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].title, "One");

    assert_matches!(
        core(
            svc.filter_requests(FilterParams {
                client_id: None,
                status: Some("archived".into()),
            })
            .await
            .unwrap_err()
        ),
        CoreError::Validation(_)
    );
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_location_bookkeeping(pool: PgPool) {
    seed_user(&pool, "client-1", "Wanjiru", "Kamau").await;
    let svc = service(pool);

    let home = svc.add_location("client-1", at(KILIMANI, "Home")).await.unwrap();
    assert!(home.is_default);
    let office = svc
        .add_location(
            "client-1",
            NewLocation {
                address: "Office, no pin".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!office.is_default);
    assert!(office.position().is_none());

    let switched = svc
        .set_default_location("client-1", &office.location_id.to_string())
        .await
        .unwrap();
    assert!(switched.is_default);
    let listed = svc.list_locations("client-1").await.unwrap();
    assert_eq!(listed[0].location_id, office.location_id);
    assert_eq!(listed.iter().filter(|l| l.is_default).count(), 1);

    assert_matches!(
        core(
            svc.set_default_location("client-1", &Uuid::new_v4().to_string())
                .await
                .unwrap_err()
        ),
        CoreError::NotFound { entity: "Location", .. }
    );
    assert_matches!(
        core(
            svc.add_location(
                "client-1",
                NewLocation {
                    latitude: Some(91.0),
                    longitude: Some(0.0),
                    address: "Off the map".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err()
        ),
        CoreError::Validation(_)
    );
    assert_matches!(
        core(svc.add_location("ghost", at(KILIMANI, "Somewhere")).await.unwrap_err()),
        CoreError::NotFound { entity: "User", .. }
    );
}
