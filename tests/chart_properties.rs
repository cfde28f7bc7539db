//! Filter and chart properties checked on fixed scenarios and on seeded
//! random launch tables.

use launchdash::charts::{compute_pie_chart, compute_scatter_chart, ChartSpec, PieSlice};
use launchdash::data::{Dataset, LaunchRecord, OutcomeClass};
use launchdash::filter::{filter_by_payload_range, filter_by_site, PayloadRange, SiteSelector};
use rand::{rngs::StdRng, Rng, SeedableRng};

const SITES: [&str; 4] = ["CCAFS LC-40", "VAFB SLC-4E", "KSC LC-39A", "CCAFS SLC-40"];
const BOOSTERS: [&str; 5] = ["F9 v1.0", "F9 v1.1", "F9 FT", "F9 B4", "F9 B5"];

fn rec(site: &str, payload: f64, outcome: OutcomeClass) -> LaunchRecord {
    LaunchRecord {
        launch_site: site.to_string(),
        payload_mass_kg: payload,
        booster_version: "F9 FT".to_string(),
        outcome,
    }
}

fn random_dataset(rng: &mut StdRng) -> Dataset {
    let n = rng.gen_range(0..60);
    let records = (0..n)
        .map(|_| LaunchRecord {
            launch_site: SITES[rng.gen_range(0..SITES.len())].to_string(),
            // Whole hundreds so range endpoints land exactly on rows.
            payload_mass_kg: (rng.gen_range(0..100) * 100) as f64,
            booster_version: BOOSTERS[rng.gen_range(0..BOOSTERS.len())].to_string(),
            outcome: if rng.gen_bool(0.6) {
                OutcomeClass::Success
            } else {
                OutcomeClass::Failure
            },
        })
        .collect();
    Dataset::from_records("random", records)
}

fn random_range(rng: &mut StdRng) -> PayloadRange {
    let a = (rng.gen_range(0..100) * 100) as f64;
    let b = (rng.gen_range(0..100) * 100) as f64;
    PayloadRange::new(a.min(b), a.max(b)).unwrap()
}

fn pie(spec: ChartSpec) -> Vec<PieSlice> {
    match spec {
        ChartSpec::Pie(p) => p.slices,
        other => panic!("expected pie, got {:?}", other),
    }
}

fn two_site_dataset() -> Dataset {
    Dataset::from_records(
        "scenario",
        vec![
            rec("A", 1000.0, OutcomeClass::Success),
            rec("A", 2000.0, OutcomeClass::Success),
            rec("B", 3000.0, OutcomeClass::Success),
            rec("A", 4000.0, OutcomeClass::Success),
            rec("B", 5000.0, OutcomeClass::Failure),
            rec("A", 6000.0, OutcomeClass::Failure),
        ],
    )
}

#[test]
fn scenario_all_sites_pie() {
    let ds = two_site_dataset();
    let spec = compute_pie_chart(&ds, &SiteSelector::AllSites);
    assert_eq!(spec.title(), "Total Success Launches By all sites");
    assert_eq!(
        pie(spec),
        vec![
            PieSlice { label: "A".into(), count: 3 },
            PieSlice { label: "B".into(), count: 1 },
        ]
    );
}

#[test]
fn scenario_single_site_pie_is_one_success_slice() {
    let ds = two_site_dataset();
    let spec = compute_pie_chart(&ds, &SiteSelector::Site("A".into()));
    assert_eq!(spec.title(), "Total Success Launches for site A");
    assert_eq!(pie(spec), vec![PieSlice { label: "1".into(), count: 3 }]);
}

#[test]
fn scenario_empty_payload_window() {
    let ds = two_site_dataset();
    let range = PayloadRange::new(0.0, 0.0).unwrap();
    let spec = compute_scatter_chart(&ds, &SiteSelector::AllSites, &range);
    assert!(spec.is_empty());
    assert_eq!(spec.title(), "Payload and Outcome for all Sites");
}

#[test]
fn scenario_unknown_site_renders_empty() {
    let ds = two_site_dataset();
    let sel = SiteSelector::Site("Boca Chica".into());
    let range = PayloadRange::new(0.0, 10000.0).unwrap();
    assert!(compute_pie_chart(&ds, &sel).is_empty());
    let scatter = compute_scatter_chart(&ds, &sel, &range);
    assert!(scatter.is_empty());
    assert_eq!(scatter.title(), "Payload and Outcome for Boca Chica");
}

#[test]
fn range_endpoints_are_inclusive() {
    let ds = two_site_dataset();
    let range = PayloadRange::new(2000.0, 4000.0).unwrap();
    let spec = compute_scatter_chart(&ds, &SiteSelector::AllSites, &range);
    let ChartSpec::Scatter(sc) = spec else {
        panic!("expected scatter");
    };
    let xs: Vec<f64> = sc.points.iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![2000.0, 3000.0, 4000.0]);
}

#[test]
fn site_filter_properties_hold_on_random_tables() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let ds = random_dataset(&mut rng);
        let rows = ds.rows();

        assert_eq!(filter_by_site(&rows, &SiteSelector::AllSites), rows);

        for r in &rows {
            let sel = SiteSelector::Site(r.launch_site.clone());
            assert!(filter_by_site(&rows, &sel).contains(r));
        }
        for site in SITES {
            let sel = SiteSelector::Site(site.to_string());
            assert!(filter_by_site(&rows, &sel).iter().all(|r| r.launch_site == site));
        }
    }
}

#[test]
fn payload_filter_stays_inside_range() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let ds = random_dataset(&mut rng);
        let rows = ds.rows();
        let range = random_range(&mut rng);
        let kept = filter_by_payload_range(&rows, &range);
        assert!(kept
            .iter()
            .all(|r| range.low() <= r.payload_mass_kg && r.payload_mass_kg <= range.high()));
        let expected = rows.iter().filter(|r| range.contains(r.payload_mass_kg)).count();
        assert_eq!(kept.len(), expected);
    }
}

#[test]
fn all_sites_pie_sums_to_success_count() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..200 {
        let ds = random_dataset(&mut rng);
        let successes = ds.records().iter().filter(|r| r.is_success()).count() as u64;
        let total: u64 = pie(compute_pie_chart(&ds, &SiteSelector::AllSites))
            .iter()
            .map(|s| s.count)
            .sum();
        assert_eq!(total, successes);
    }
}

#[test]
fn chart_builders_are_repeatable() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..100 {
        let ds = random_dataset(&mut rng);
        let sel = if rng.gen_bool(0.5) {
            SiteSelector::AllSites
        } else {
            SiteSelector::Site(SITES[rng.gen_range(0..SITES.len())].to_string())
        };
        let range = random_range(&mut rng);
        assert_eq!(compute_pie_chart(&ds, &sel), compute_pie_chart(&ds, &sel));
        assert_eq!(
            compute_scatter_chart(&ds, &sel, &range),
            compute_scatter_chart(&ds, &sel, &range)
        );
    }
}
