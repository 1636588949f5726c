use super::common::*;
use crate::auth::Principal;
use crate::marketplace::contact::ContactDecision;
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::ids::ReviewId;
use crate::marketplace::Marketplace;

fn accepted_contact(marketplace: &Marketplace, haunter: &Principal, title: &str) {
    let listing = approved_listing(marketplace, title);
    fund(marketplace, haunter, 2);
    let receipt = contact(marketplace, haunter, listing.id);
    marketplace
        .contact
        .decide(&AGENT, receipt.request.id, ContactDecision::Accepted)
        .expect("accept");
}

#[test]
fn reviews_require_an_accepted_contact() {
    let (marketplace, _) = build_marketplace();
    assert!(matches!(
        marketplace
            .reviews
            .post(&HAUNTER, AGENT.account_id, 5, None),
        Err(MarketplaceError::Forbidden(_))
    ));

    let listing = approved_listing(&marketplace, "Lake house");
    fund(&marketplace, &HAUNTER, 2);
    let receipt = contact(&marketplace, &HAUNTER, listing.id);
    assert!(matches!(
        marketplace
            .reviews
            .post(&HAUNTER, AGENT.account_id, 5, None),
        Err(MarketplaceError::Forbidden(_))
    ));

    marketplace
        .contact
        .decide(&AGENT, receipt.request.id, ContactDecision::Accepted)
        .expect("accept");
    let review = marketplace
        .reviews
        .post(&HAUNTER, AGENT.account_id, 4, Some(" Helpful ".to_string()))
        .expect("review");
    assert_eq!(review.rating, 4);
    assert_eq!(review.comment.as_deref(), Some("Helpful"));
    assert!(!review.is_flagged);

    let messages = notification_messages(&marketplace, &AGENT);
    assert_eq!(messages[0], "You received a new 4-star review.");
}

#[test]
fn one_review_per_haunter_and_agent() {
    let (marketplace, _) = build_marketplace();
    accepted_contact(&marketplace, &HAUNTER, "Lake house");
    marketplace
        .reviews
        .post(&HAUNTER, AGENT.account_id, 5, None)
        .expect("first");
    assert!(matches!(
        marketplace
            .reviews
            .post(&HAUNTER, AGENT.account_id, 1, None),
        Err(MarketplaceError::Conflict(_))
    ));
}

#[test]
fn ratings_outside_one_to_five_are_rejected() {
    let (marketplace, _) = build_marketplace();
    accepted_contact(&marketplace, &HAUNTER, "Lake house");
    for rating in [0, 6, -1, 300] {
        assert!(matches!(
            marketplace
                .reviews
                .post(&HAUNTER, AGENT.account_id, rating, None),
            Err(MarketplaceError::Validation(_))
        ));
    }
}

#[test]
fn only_haunters_post_reviews() {
    let (marketplace, _) = build_marketplace();
    assert!(matches!(
        marketplace
            .reviews
            .post(&Principal::agent(3), AGENT.account_id, 5, None),
        Err(MarketplaceError::Forbidden(_))
    ));
}

#[test]
fn agent_reviews_carry_a_rounded_average() {
    let (marketplace, _) = build_marketplace();
    let third = Principal::haunter(22);
    accepted_contact(&marketplace, &HAUNTER, "One");
    accepted_contact(&marketplace, &OTHER_HAUNTER, "Two");
    accepted_contact(&marketplace, &third, "Three");

    marketplace
        .reviews
        .post(&HAUNTER, AGENT.account_id, 5, None)
        .expect("review");
    marketplace
        .reviews
        .post(&OTHER_HAUNTER, AGENT.account_id, 4, None)
        .expect("review");
    let latest = marketplace
        .reviews
        .post(&third, AGENT.account_id, 4, None)
        .expect("review");

    let summary = marketplace
        .reviews
        .list_for_agent(AGENT.account_id)
        .expect("reviews");
    assert_eq!(summary.total_reviews, 3);
    assert_eq!(summary.average_rating, 4.33);
    assert_eq!(summary.reviews[0].id, latest.id);

    let empty = marketplace
        .reviews
        .list_for_agent(Principal::agent(500).account_id)
        .expect("reviews");
    assert_eq!(empty.total_reviews, 0);
    assert_eq!(empty.average_rating, 0.0);
}

#[test]
fn flag_toggles_and_is_admin_only() {
    let (marketplace, _) = build_marketplace();
    accepted_contact(&marketplace, &HAUNTER, "Lake house");
    let review = marketplace
        .reviews
        .post(&HAUNTER, AGENT.account_id, 2, None)
        .expect("review");

    assert!(matches!(
        marketplace.reviews.flag(&AGENT, review.id),
        Err(MarketplaceError::Forbidden(_))
    ));
    assert!(marketplace.reviews.flag(&ADMIN, review.id).expect("flag").is_flagged);
    assert!(!marketplace.reviews.flag(&ADMIN, review.id).expect("unflag").is_flagged);
    assert_eq!(
        marketplace
            .reviews
            .flag(&ADMIN, ReviewId(77_777))
            .map(|review| review.id),
        Err(MarketplaceError::NotFound("review"))
    );
}
