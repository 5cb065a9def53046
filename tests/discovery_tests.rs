use serde_json::json;
use travel_finder::catalog::{CatalogSnapshot, LoadState};
use travel_finder::catalog_types::{Destination, DestinationMap, Package};
use travel_finder::discovery::DiscoverySession;
use travel_finder::filter_state::{DestinationScope, FilterEdit, SortKey};
use travel_finder::pipeline::PipelineSettings;
use travel_finder::view::ViewMode;

fn catalog() -> CatalogSnapshot {
    let mut packages: Vec<Package> = (1..=12)
        .map(|i| {
            Package::from_json(&json!({
                "_id": format!("goa-{}", i),
                "title": format!("Goa Stay {}", i),
                "destination": "goa",
                "price": 1000 * i,
                "rating": 4,
                "duration": 3,
                "status": "active",
                "tags": "beach"
            }))
        })
        .collect();
    packages.push(Package::from_json(&json!({
        "_id": "paris",
        "title": "Paris Lights",
        "destination": "paris",
        "price": 50000,
        "rating": 5,
        "duration": 6,
        "status": "active",
        "category": ["city", "romance"]
    })));
    packages.push(Package::from_json(&json!({
        "_id": "draft",
        "title": "Unpublished",
        "destination": "goa",
        "price": 10,
        "status": "draft"
    })));

    let destinations: DestinationMap = [
        json!({"_id": "goa", "place": "Goa", "country": "India"}),
        json!({"_id": "paris", "place": "Paris", "country": "France"}),
    ]
    .iter()
    .map(Destination::from_json)
    .map(|d| (d.id.clone(), d))
    .collect();

    CatalogSnapshot::loaded(packages, destinations)
}

#[test]
fn test_shared_url_renders_filtered_on_first_render() {
    let mut session = DiscoverySession::mount("?scope=international");
    let view = session.render(&catalog(), &PipelineSettings::default());

    assert_eq!(view.filtered_count, 1);
    assert_eq!(view.items[0].title, "Paris Lights");
    assert_eq!(view.items[0].destination_name, "Paris, France");
    assert_eq!(view.replace_url, None);
}

#[test]
fn test_filter_edit_returns_to_first_page() {
    let mut session = DiscoverySession::mount("page=2");
    let view = session.render(&catalog(), &PipelineSettings::default());
    assert_eq!(view.pagination.page, 2);
    assert_eq!(view.items.len(), 5);

    session.apply(FilterEdit::ToggleCategory("beach".to_string()));
    let view = session.render(&catalog(), &PipelineSettings::default());
    assert_eq!(view.pagination.page, 1);
    assert_eq!(view.filtered_count, 12);
    assert_eq!(view.replace_url.as_deref(), Some("?cats=beach"));
}

#[test]
fn test_shrinking_result_clamps_stored_page() {
    let mut session = DiscoverySession::mount("");
    session.apply(FilterEdit::Page(2));
    let view = session.render(&catalog(), &PipelineSettings::default());
    assert_eq!(view.query, "page=2");

    // Page edits do not reset, so the clamp has to catch this one.
    session.apply(FilterEdit::Page(7));
    let view = session.render(&catalog(), &PipelineSettings::default());
    assert_eq!(view.pagination.page, 2);
    assert!(!view.pagination.has_next);
    assert_eq!(session.state().page, 2);
    assert_eq!(view.replace_url, None);
}

#[test]
fn test_sort_change_resets_page_and_orders_items() {
    let mut session = DiscoverySession::mount("page=2");
    session.apply(FilterEdit::SortKey(SortKey::PriceHigh));
    let view = session.render(&catalog(), &PipelineSettings::default());

    assert_eq!(view.pagination.page, 1);
    assert_eq!(view.items[0].title, "Paris Lights");
    assert_eq!(view.query, "sort=price_high");
}

#[test]
fn test_empty_state_after_narrowing() {
    let mut session = DiscoverySession::mount("");
    session.apply_all(vec![
        FilterEdit::DestinationScope(DestinationScope::Domestic),
        FilterEdit::MinRating(4.5),
    ]);
    let view = session.render(&catalog(), &PipelineSettings::default());

    assert!(view.empty);
    assert_eq!(view.filtered_count, 0);
    assert_eq!(view.pagination.total_pages, 1);
    assert_eq!(view.pagination.page, 1);
}

#[test]
fn test_view_mode_and_categories() {
    let mut session = DiscoverySession::mount("");
    session.set_view_mode(ViewMode::List);
    let view = session.render(&catalog(), &PipelineSettings::default());

    assert_eq!(view.view_mode, ViewMode::List);
    assert_eq!(view.available_categories, vec!["beach", "city", "romance"]);
    assert_eq!(view.status, LoadState::Loaded);
}

#[test]
fn test_degraded_destinations_show_raw_ids() {
    let loaded = catalog();
    let degraded = CatalogSnapshot {
        destinations: Default::default(),
        ..loaded
    };

    let mut session = DiscoverySession::mount("q=paris");
    let view = session.render(&degraded, &PipelineSettings::default());
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].destination_name, "paris");

    let mut session = DiscoverySession::mount("q=paris&scope=domestic");
    let view = session.render(&degraded, &PipelineSettings::default());
    assert!(view.items.is_empty());
}

#[test]
fn test_shared_page_kept_while_catalog_loads() {
    let mut session = DiscoverySession::mount("?q=goa&page=3");
    let view = session.render(&CatalogSnapshot::loading(), &PipelineSettings::default());

    assert_eq!(view.status, LoadState::Loading);
    assert!(!view.empty);
    assert_eq!(session.state().page, 3);
    assert_eq!(view.replace_url, None);

    // Once the packages arrive the page is clamped to what exists.
    let view = session.render(&catalog(), &PipelineSettings::default());
    assert_eq!(view.pagination.page, 2);
    assert_eq!(view.replace_url.as_deref(), Some("?q=goa&page=2"));
}
