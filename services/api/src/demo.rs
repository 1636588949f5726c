use clap::Args;
use house_haunt::auth::Principal;
use house_haunt::config::MarketplaceConfig;
use house_haunt::error::AppError;
use house_haunt::marketplace::contact::ContactDecision;
use house_haunt::marketplace::listings::{ListingDraft, ListingStatus};
use house_haunt::marketplace::Marketplace;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Credits loaded into the demo haunter's wallet before contacting the agent.
    #[arg(long, default_value_t = 2)]
    pub(crate) starting_balance: u64,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            starting_balance: 2,
        }
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = MarketplaceConfig::default();
    let marketplace = Marketplace::in_memory(&config);
    let admin = Principal::admin(1);
    let agent = Principal::agent(2);
    let haunter = Principal::haunter(3);
    let outsider = Principal::haunter(4);

    println!("House Haunt contact flow demo");
    println!("Contact cost: {} credits", config.contact_cost);

    let draft = ListingDraft {
        title: Some("Willow Creek Farmhouse".to_string()),
        description: Some("Four bedrooms, wraparound porch, one resident ghost".to_string()),
        location: Some("Enugu".to_string()),
        price: Some(2400),
        images: vec!["https://cdn.example.com/willow/porch.jpg".to_string()],
    };
    let listing = match marketplace.listings.create(&agent, draft) {
        Ok(listing) => listing,
        Err(err) => {
            println!("  Listing rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "\n1. Agent {} listed '{}' (status: {})",
        agent.account_id,
        listing.title,
        listing.status.label()
    );

    match marketplace
        .listings
        .update_status(&admin, listing.id, ListingStatus::Approved, None)
    {
        Ok(listing) => println!("2. Admin moderated it: {}", listing.status.label()),
        Err(err) => {
            println!("2. Moderation failed: {err}");
            return Ok(());
        }
    }

    if args.starting_balance > 0 {
        let amount = i64::try_from(args.starting_balance).unwrap_or(i64::MAX);
        match marketplace.wallet.top_up(&haunter, amount) {
            Ok(balance) => println!("3. Haunter {} topped up, balance {balance}", haunter.account_id),
            Err(err) => println!("3. Top-up failed: {err}"),
        }
    } else {
        println!("3. Haunter {} starts with an empty wallet", haunter.account_id);
    }

    let receipt = match marketplace.contact.request_contact(&haunter, listing.id) {
        Ok(receipt) => {
            println!(
                "4. Contact requested (request {}, remaining balance {})",
                receipt.request.id, receipt.remaining_balance
            );
            receipt
        }
        Err(err) => {
            println!("4. Contact refused [{}]: {err}", err.kind());
            print_balance(&marketplace, &haunter);
            return Ok(());
        }
    };

    match marketplace.contact.request_contact(&haunter, listing.id) {
        Ok(_) => println!("5. Unexpected second request accepted"),
        Err(err) => println!("5. Repeat request refused [{}]: {err}", err.kind()),
    }
    print_balance(&marketplace, &haunter);

    let room = match marketplace
        .contact
        .decide(&agent, receipt.request.id, ContactDecision::Accepted)
    {
        Ok(outcome) => match outcome.room {
            Some(room) => {
                println!(
                    "6. Agent accepted; chat room {} opened between agent {} and haunter {}",
                    room.id, room.agent_id, room.haunter_id
                );
                room
            }
            None => {
                println!("6. Agent accepted but no room was opened");
                return Ok(());
            }
        },
        Err(err) => {
            println!("6. Decision failed: {err}");
            return Ok(());
        }
    };

    let mut feed = match marketplace.chat.subscribe(&agent, room.id) {
        Ok(feed) => Some(feed),
        Err(err) => {
            println!("   Agent could not subscribe: {err}");
            None
        }
    };
    match marketplace.chat.post_message(&haunter, room.id, "hello") {
        Ok(message) => println!("7. Haunter said '{}'", message.content),
        Err(err) => println!("7. Message failed: {err}"),
    }
    if let Some(message) = feed.as_mut().and_then(|feed| feed.try_next()) {
        println!("   Agent's live feed received '{}'", message.content);
    }

    match marketplace.chat.list_messages(&outsider, room.id) {
        Ok(_) => println!("8. Outsider read the room (unexpected)"),
        Err(err) => println!("8. Outsider refused [{}]: {err}", err.kind()),
    }

    for (label, who) in [("Haunter", &haunter), ("Agent", &agent)] {
        if let Ok(inbox) = marketplace.notifications.inbox(who) {
            println!("\n{label} inbox ({} unread)", inbox.unread);
            for notification in inbox.notifications {
                println!("  - {}", notification.message);
            }
        }
    }

    Ok(())
}

fn print_balance(marketplace: &Marketplace, haunter: &Principal) {
    match marketplace.wallet.balance(haunter.account_id) {
        Ok(balance) => println!("   Haunter balance: {balance}"),
        Err(err) => println!("   Balance unavailable: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_with_default_balance() {
        assert!(run_demo(DemoArgs::default()).is_ok());
    }

    #[test]
    fn demo_handles_an_underfunded_haunter() {
        assert!(run_demo(DemoArgs {
            starting_balance: 1
        })
        .is_ok());
    }
}
