use super::common::*;
use crate::auth::Principal;
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::ids::ListingId;
use crate::marketplace::listings::{Listing, ListingDraft, ListingStatus};
use crate::marketplace::Marketplace;

fn listed(marketplace: &Marketplace, title: &str, location: &str, price: i64) -> Listing {
    let draft = ListingDraft {
        location: Some(location.to_string()),
        price: Some(price),
        ..draft(title)
    };
    let listing = marketplace
        .listings
        .create(&AGENT, draft)
        .expect("listing created");
    marketplace
        .listings
        .update_status(&ADMIN, listing.id, ListingStatus::Approved, None)
        .expect("listing approved")
}

fn ids(listings: &[Listing]) -> Vec<ListingId> {
    listings.iter().map(|listing| listing.id).collect()
}

#[test]
fn haunters_without_activity_get_an_explanation() {
    let (marketplace, _) = build_marketplace();
    listed(&marketplace, "Lake house", "Lekki, Lagos", 1000);

    let result = marketplace
        .discovery
        .recommendations(&HAUNTER)
        .expect("recommendations");
    assert_eq!(result.total_recommendations, 0);
    assert!(result.message.expect("message").starts_with("No activity yet"));
}

#[test]
fn recommendations_match_area_and_price_of_past_interest() {
    let (marketplace, _) = build_marketplace();
    let favorite = listed(&marketplace, "Reference", "Lekki, Lagos", 1000);
    let close = listed(&marketplace, "Close", "Phase 1, LEKKI, Lagos", 1150);
    let too_expensive = listed(&marketplace, "Pricey", "Lekki, Lagos", 1250);
    let elsewhere = listed(&marketplace, "Far", "Ikeja, Lagos", 1000);
    let contacted = listed(&marketplace, "Contacted", "Lekki, Lagos", 950);
    let pending = marketplace
        .listings
        .create(&AGENT, draft("Unmoderated"))
        .expect("pending listing");
    let edge = listed(&marketplace, "Edge", "Lekki, Lagos", 1200);

    marketplace
        .favorites
        .toggle(&HAUNTER, favorite.id)
        .expect("favorite");
    fund(&marketplace, &HAUNTER, 2);
    contact(&marketplace, &HAUNTER, contacted.id);

    let result = marketplace
        .discovery
        .recommendations(&HAUNTER)
        .expect("recommendations");
    assert_eq!(ids(&result.recommendations), vec![edge.id, close.id]);
    assert_eq!(result.total_recommendations, 2);
    assert!(result.message.is_none());
    for excluded in [too_expensive.id, elsewhere.id, pending.id, favorite.id, contacted.id] {
        assert!(!ids(&result.recommendations).contains(&excluded));
    }
}

#[test]
fn recommendations_are_newest_first_and_capped() {
    let (marketplace, _) = build_marketplace();
    let favorite = listed(&marketplace, "Reference", "Lekki, Lagos", 1000);
    let similar: Vec<Listing> = (0..12)
        .map(|n| listed(&marketplace, &format!("Similar {n}"), "Lekki, Lagos", 1000))
        .collect();
    marketplace
        .favorites
        .toggle(&HAUNTER, favorite.id)
        .expect("favorite");

    let result = marketplace
        .discovery
        .recommendations(&HAUNTER)
        .expect("recommendations");
    assert_eq!(result.total_recommendations, 10);
    assert_eq!(result.recommendations[0].id, similar[11].id);
    assert!(!ids(&result.recommendations).contains(&similar[0].id));
}

#[test]
fn nothing_similar_is_explained() {
    let (marketplace, _) = build_marketplace();
    let favorite = listed(&marketplace, "Reference", "Lekki, Lagos", 1000);
    listed(&marketplace, "Far", "Abuja", 1000);
    marketplace
        .favorites
        .toggle(&HAUNTER, favorite.id)
        .expect("favorite");

    let result = marketplace
        .discovery
        .recommendations(&HAUNTER)
        .expect("recommendations");
    assert!(result.recommendations.is_empty());
    assert_eq!(result.message, Some("No similar houses found at the moment."));
}

#[test]
fn trending_ranks_by_favorites_plus_contact_requests() {
    let (marketplace, _) = build_marketplace();
    let popular = listed(&marketplace, "Popular", "Lekki, Lagos", 1000);
    let liked = listed(&marketplace, "Liked", "Yaba, Lagos", 800);
    let quiet = listed(&marketplace, "Quiet", "Ikoyi, Lagos", 3000);
    let hidden = marketplace
        .listings
        .create(&AGENT, draft("Unmoderated"))
        .expect("pending listing");

    for haunter in [&HAUNTER, &OTHER_HAUNTER] {
        marketplace
            .favorites
            .toggle(haunter, popular.id)
            .expect("favorite");
    }
    fund(&marketplace, &HAUNTER, 2);
    contact(&marketplace, &HAUNTER, popular.id);
    marketplace
        .favorites
        .toggle(&OTHER_HAUNTER, liked.id)
        .expect("favorite");

    let trending = marketplace.discovery.trending(&HAUNTER).expect("trending");
    let ranking: Vec<(ListingId, u64)> = trending
        .listings
        .iter()
        .map(|entry| (entry.listing.id, entry.popularity_score))
        .collect();
    assert_eq!(ranking, vec![(popular.id, 3), (liked.id, 1), (quiet.id, 0)]);
    assert_eq!(trending.total_trending, 3);
    assert!(ranking.iter().all(|(id, _)| *id != hidden.id));
}

#[test]
fn discovery_is_for_haunters() {
    let (marketplace, _) = build_marketplace();
    for caller in [AGENT, ADMIN, Principal::agent(99)] {
        assert!(matches!(
            marketplace.discovery.recommendations(&caller),
            Err(MarketplaceError::Forbidden(_))
        ));
        assert!(matches!(
            marketplace.discovery.trending(&caller),
            Err(MarketplaceError::Forbidden(_))
        ));
    }
}
