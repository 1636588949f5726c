//! End-to-end scenarios for the paid contact flow, driven through the public
//! facade and the merged HTTP router.

mod common {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use house_haunt::auth::{Principal, ACCOUNT_ID_HEADER, ACCOUNT_ROLE_HEADER};
    use house_haunt::config::MarketplaceConfig;
    use house_haunt::marketplace::listings::{ListingDraft, ListingStatus};
    use house_haunt::marketplace::{marketplace_router, Marketplace};
    use serde_json::Value;
    use tower::ServiceExt;

    pub const AGENT: Principal = Principal::agent(100);
    pub const HAUNTER: Principal = Principal::haunter(200);
    pub const OUTSIDER: Principal = Principal::haunter(300);
    pub const ADMIN: Principal = Principal::admin(1);

    pub struct Harness {
        pub marketplace: Marketplace,
        pub router: Router,
    }

    impl Harness {
        pub fn new() -> Self {
            let marketplace = Marketplace::in_memory(&MarketplaceConfig::default());
            let router = marketplace_router(&marketplace);
            Self {
                marketplace,
                router,
            }
        }

        pub fn approved_listing(&self) -> u64 {
            let draft = ListingDraft {
                title: Some("Old Mill House".to_string()),
                description: Some("Creaky floors, great light".to_string()),
                location: Some("Ibadan".to_string()),
                price: Some(1200),
                images: vec!["https://cdn.example.com/mill/front.png".to_string()],
            };
            let listing = self
                .marketplace
                .listings
                .create(&AGENT, draft)
                .expect("listing created");
            self.marketplace
                .listings
                .update_status(&ADMIN, listing.id, ListingStatus::Approved, None)
                .expect("listing approved");
            listing.id.0
        }

        pub fn fund(&self, who: &Principal, amount: i64) {
            self.marketplace
                .wallet
                .top_up(who, amount)
                .expect("top up");
        }

        pub fn balance(&self, who: &Principal) -> u64 {
            self.marketplace
                .wallet
                .balance(who.account_id)
                .expect("balance")
        }

        pub async fn send(
            &self,
            method: Method,
            uri: &str,
            principal: &Principal,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let builder = Request::builder()
                .method(method)
                .uri(uri)
                .header(ACCOUNT_ID_HEADER, principal.account_id.to_string())
                .header(ACCOUNT_ROLE_HEADER, principal.role.label());
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string())),
                None => builder.body(Body::empty()),
            }
            .expect("request builds");

            let response = self
                .router
                .clone()
                .oneshot(request)
                .await
                .expect("router responds");
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
                .await
                .expect("read body");
            let payload = serde_json::from_slice(&bytes).expect("json payload");
            (status, payload)
        }
    }
}

use axum::http::{Method, StatusCode};
use common::*;
use house_haunt::marketplace::contact::ContactStatus;
use house_haunt::marketplace::ids::ContactRequestId;
use serde_json::json;

#[tokio::test]
async fn paid_contact_unlocks_a_single_chat_room() {
    let harness = Harness::new();
    let listing_id = harness.approved_listing();
    harness.fund(&HAUNTER, 2);

    let (status, receipt) = harness
        .send(
            Method::POST,
            &format!("/api/v1/listings/{listing_id}/contact"),
            &HAUNTER,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["remaining_balance"], 0);
    assert_eq!(harness.balance(&HAUNTER), 0);
    let request_id = receipt["request"]["id"].as_u64().expect("request id");

    let haunter_inbox = harness
        .marketplace
        .notifications
        .inbox(&HAUNTER)
        .expect("inbox");
    let agent_inbox = harness
        .marketplace
        .notifications
        .inbox(&AGENT)
        .expect("inbox");
    assert!(haunter_inbox
        .notifications
        .iter()
        .any(|n| n.message.contains("credits deducted")));
    assert!(agent_inbox
        .notifications
        .iter()
        .any(|n| n.message.contains("requested contact")));

    let (status, body) = harness
        .send(
            Method::POST,
            &format!("/api/v1/listings/{listing_id}/contact"),
            &HAUNTER,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
    assert_eq!(harness.balance(&HAUNTER), 0);

    let (status, outcome) = harness
        .send(
            Method::POST,
            &format!("/api/v1/contact-requests/{request_id}/decision"),
            &AGENT,
            Some(json!({ "decision": "accepted" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["request"]["status"], "accepted");
    let room_id = outcome["room"]["id"].as_u64().expect("room id");

    let stored = harness
        .marketplace
        .contact
        .outgoing(&HAUNTER)
        .expect("outgoing");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, ContactRequestId(request_id));
    assert_eq!(stored[0].status, ContactStatus::Accepted);

    let (status, _) = harness
        .send(
            Method::POST,
            &format!("/api/v1/contact-requests/{request_id}/decision"),
            &AGENT,
            Some(json!({ "decision": "accepted" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, rooms) = harness
        .send(Method::GET, "/api/v1/chats", &HAUNTER, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rooms["total"], 1);
    assert_eq!(rooms["chats"][0]["room_id"], room_id);
    assert_eq!(rooms["chats"][0]["counterpart_id"], AGENT.account_id.0);

    let (status, _) = harness
        .send(
            Method::POST,
            &format!("/api/v1/chats/{room_id}/messages"),
            &HAUNTER,
            Some(json!({ "content": "hello" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, history) = harness
        .send(
            Method::GET,
            &format!("/api/v1/chats/{room_id}/messages"),
            &AGENT,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["messages"][0]["content"], "hello");

    let (status, body) = harness
        .send(
            Method::GET,
            &format!("/api/v1/chats/{room_id}/messages"),
            &OUTSIDER,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn underfunded_haunter_is_refused_without_side_effects() {
    let harness = Harness::new();
    let listing_id = harness.approved_listing();
    harness.fund(&HAUNTER, 1);

    let (status, body) = harness
        .send(
            Method::POST,
            &format!("/api/v1/listings/{listing_id}/contact"),
            &HAUNTER,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"], "insufficient_funds");
    assert_eq!(harness.balance(&HAUNTER), 1);

    let (status, outgoing) = harness
        .send(
            Method::GET,
            "/api/v1/contact-requests/outgoing",
            &HAUNTER,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outgoing["total_requests"], 0);

    let (status, ledger) = harness
        .send(Method::GET, "/api/v1/wallet/ledger", &HAUNTER, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ledger["total"], 1);
    assert_eq!(ledger["credits_spent"], 0);
}

#[tokio::test]
async fn rejected_requests_keep_the_charge_and_open_nothing() {
    let harness = Harness::new();
    let listing_id = harness.approved_listing();
    harness.fund(&HAUNTER, 4);

    let (_, receipt) = harness
        .send(
            Method::POST,
            &format!("/api/v1/listings/{listing_id}/contact"),
            &HAUNTER,
            None,
        )
        .await;
    let request_id = receipt["request"]["id"].as_u64().expect("request id");

    let (status, outcome) = harness
        .send(
            Method::POST,
            &format!("/api/v1/contact-requests/{request_id}/decision"),
            &AGENT,
            Some(json!({ "decision": "rejected" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["request"]["status"], "rejected");
    assert!(outcome.get("room").is_none());
    assert_eq!(harness.balance(&HAUNTER), 2);

    let (_, rooms) = harness
        .send(Method::GET, "/api/v1/chats", &HAUNTER, None)
        .await;
    assert_eq!(rooms["total"], 0);

    let (status, _) = harness
        .send(
            Method::POST,
            "/api/v1/reviews",
            &HAUNTER,
            Some(json!({ "agent_id": AGENT.account_id, "rating": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn accepted_contact_allows_one_review() {
    let harness = Harness::new();
    let listing_id = harness.approved_listing();
    harness.fund(&HAUNTER, 2);
    let (_, receipt) = harness
        .send(
            Method::POST,
            &format!("/api/v1/listings/{listing_id}/contact"),
            &HAUNTER,
            None,
        )
        .await;
    let request_id = receipt["request"]["id"].as_u64().expect("request id");
    harness
        .send(
            Method::POST,
            &format!("/api/v1/contact-requests/{request_id}/decision"),
            &AGENT,
            Some(json!({ "decision": "accepted" })),
        )
        .await;

    let review = json!({ "agent_id": AGENT.account_id, "rating": 5, "comment": "Very responsive" });
    let (status, posted) = harness
        .send(Method::POST, "/api/v1/reviews", &HAUNTER, Some(review.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(posted["rating"], 5);

    let (status, _) = harness
        .send(Method::POST, "/api/v1/reviews", &HAUNTER, Some(review))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, summary) = harness
        .send(
            Method::GET,
            &format!("/api/v1/agents/{}/reviews", AGENT.account_id),
            &OUTSIDER,
            None,
        )
        .await;
    assert_eq!(summary["total_reviews"], 1);
    assert_eq!(summary["average_rating"], 5.0);
}
