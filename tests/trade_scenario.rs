use trade_value_scanner::domain::{
    find_similar, group, Basis, Catalog, CatalogItem, Demand, ItemIdentity, SearchOptions,
    SimilaritySort, TradeSide, TradeState,
};

fn catalog() -> Catalog {
    Catalog::new(vec![
        CatalogItem::new(ItemIdentity::base(1), "Arachnid", "Vehicle")
            .with_cash_value("1,000,000")
            .with_duped_value("600k")
            .with_demand("Medium"),
        CatalogItem::new(ItemIdentity::base(2), "Beignet", "Vehicle")
            .with_cash_value("1.05m")
            .with_demand("High"),
        CatalogItem::new(ItemIdentity::base(3), "Celsior", "Vehicle")
            .with_cash_value("3m")
            .with_duped_value("2m")
            .with_demand("Very High"),
        CatalogItem::new(ItemIdentity::with_variant(3, "Gold"), "Celsior", "Vehicle")
            .with_cash_value("4.2m")
            .with_duped_value("N/A")
            .with_demand("Extremely High"),
        CatalogItem::new(ItemIdentity::base(4), "Dune Rim", "Rim")
            .with_cash_value("950k")
            .with_demand("Low"),
        CatalogItem::new(ItemIdentity::base(5), "Ember", "Texture")
            .with_cash_value("N/A")
            .with_demand("Unknown"),
    ])
}

fn pick(catalog: &Catalog, identity: ItemIdentity) -> CatalogItem {
    catalog.get(&identity).cloned().unwrap()
}

#[test]
fn proximity_scenario_from_one_million() {
    let catalog = catalog();
    let options = SearchOptions {
        range: 100_000.0,
        type_filter: Some("VEHICLE".to_string()),
        ..SearchOptions::default()
    };

    let found = find_similar(1_000_000.0, catalog.items(), &options);
    let names: Vec<_> = found.iter().map(|c| c.item.name.as_str()).collect();
    assert_eq!(names, vec!["Arachnid", "Beignet"]);
}

#[test]
fn two_sided_trade_end_to_end() {
    let catalog = catalog();
    let mut state = TradeState::default();

    let first = state.add(TradeSide::Offer, pick(&catalog, ItemIdentity::base(3)), Some(300));
    state.add(TradeSide::Offer, pick(&catalog, ItemIdentity::base(3)), Some(100));
    state.add(
        TradeSide::Offer,
        pick(&catalog, ItemIdentity::with_variant(3, "Gold")),
        None,
    );
    state.add(TradeSide::Request, pick(&catalog, ItemIdentity::base(1)), None);
    state.add(TradeSide::Request, pick(&catalog, ItemIdentity::base(2)), None);

    assert!(state.set_basis(TradeSide::Offer, &first, Basis::Duped));
    // The gold variant has no duped value, so this stays clean when valued.
    let gold_key = state.offer[2].key.clone();
    assert!(state.set_basis(TradeSide::Offer, &gold_key, Basis::Duped));

    let offer = state.totals(TradeSide::Offer);
    assert_eq!(offer.total, 2_000_000.0 + 3_000_000.0 + 4_200_000.0);
    assert_eq!(offer.breakdown.duped.count, 1);
    assert_eq!(offer.breakdown.clean.count, 2);

    let groups = group(&state.offer);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].count, 2);

    let request = state.totals(TradeSide::Request);
    assert_eq!(request.total, 2_050_000.0);
    assert_eq!(state.difference(), offer.total - request.total);

    let options = SearchOptions {
        range: 1_500_000.0,
        sort: SimilaritySort::DemandDesc,
        ..SearchOptions::default()
    };
    let found = state.suggest(TradeSide::Request, catalog.items(), options);
    let ids: Vec<_> = found.iter().map(|c| c.item.identity.clone()).collect();
    assert_eq!(ids, vec![ItemIdentity::base(3), ItemIdentity::base(4)]);
    // Request side averages Medium and High to Decent.
    assert_eq!(state.baseline_demand(TradeSide::Request), Some(Demand::Decent));
    assert_eq!(found[0].demand_delta, Some(2));
    assert_eq!(found[1].demand_delta, Some(-2));
}

#[test]
fn duped_search_never_returns_items_without_duped_values() {
    let catalog = catalog();
    let options = SearchOptions {
        basis: Basis::Duped,
        range: 10_000_000.0,
        ..SearchOptions::default()
    };

    let found = find_similar(1_000_000.0, catalog.items(), &options);
    assert!(!found.is_empty());
    assert!(found.iter().all(|c| c
        .item
        .duped_value
        .as_deref()
        .is_some_and(|v| !v.eq_ignore_ascii_case("n/a"))));
}
