//! Navigation and menu handlers

use anyhow::Result;
use colored::*;
use ferry_core::events::Event;
use ferry_core::menu::{Menu, MenuEntry, MenuSubItem};
use ferry_core::routes::guard::Navigation;
use ferry_core::state::is_authenticated;
use tracing::debug;

use crate::session::Session;

/// Resolve a console path and report where navigation lands
pub fn navigate(path: &str, session: &mut Session) -> Result<()> {
    let navigation = session.navigate(path)?;
    let destination = navigation.destination();

    match &navigation {
        Navigation::Proceed(route) => {
            println!("{} {}", "→".green(), route.path.bold());
            if let Some(from) = &route.redirected_from {
                println!("  {}: {}", "redirected from".dimmed(), from);
            }
        }
        Navigation::LoginRequired { requested, .. } => {
            println!("{} {}", "→".yellow(), destination.path.bold());
            println!("  {}: {} requires login", "guard".dimmed(), requested.path);
        }
    }

    if let Some(name) = destination.name {
        println!("  {}: {}", "route".dimmed(), name);
    }
    for (param, value) in &destination.params {
        println!("  {}: {}", param.dimmed(), value);
    }

    session.publish(Event::PageLoaded);
    Ok(())
}

/// Print the navigation menu, with buckets under Storage when reachable
pub async fn menu(session: &mut Session) -> Result<()> {
    let mut menu = Menu::default();

    if is_authenticated(session.store.as_ref()) {
        if let Some(items) = bucket_items(session).await {
            menu.set_sub_items("Storage", items);
        }
    }

    print_menu(&menu);
    Ok(())
}

async fn bucket_items(session: &mut Session) -> Option<Vec<MenuSubItem>> {
    let client = session.client().ok()?;
    match client.list_buckets().await {
        Ok(buckets) => {
            session.publish(Event::StorageBucketsCount(buckets.len()));
            Some(
                buckets
                    .into_iter()
                    .map(|b| {
                        let href = format!("/buckets/{}", b.name);
                        MenuSubItem::new(b.name.clone(), b.name).with_href(href)
                    })
                    .collect(),
            )
        }
        Err(err) => {
            debug!("Buckets unavailable for the menu: {}", err);
            None
        }
    }
}

fn print_menu(menu: &Menu) {
    for entry in menu.entries() {
        match entry {
            MenuEntry::Header { header } => println!("{}", header.bold()),
            MenuEntry::Item(item) => {
                println!("  {} ({})", item.title, item.name.dimmed());
                for sub in item.items.iter().flatten() {
                    let href = sub.href.as_deref().unwrap_or("");
                    println!("    {} {}", sub.title, href.dimmed());
                }
            }
        }
    }
}
