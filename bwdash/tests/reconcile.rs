//! View reconciliation: minimal mutation, idempotence, zero suppression,
//! percentage scaling and color banding.

use bwdash::reconcile::{
    band_for, fill_percentage, rows_for_source, ColorBand, Mutation, RowValues, ViewReconciler,
};
use bwdash::stream::Direction;
use bwdash::types::StatusDoc;

fn row(entity: &str, in_value: f64, out_value: f64) -> RowValues {
    RowValues {
        entity: entity.into(),
        label: entity.into(),
        in_text: format!("{in_value} Mb/s"),
        out_text: format!("{out_value} Mb/s"),
        in_value,
        out_value,
        in_max: 100.0,
        out_max: 100.0,
    }
}

#[test]
fn percentage_is_bounded_and_zero_floored() {
    assert_eq!(fill_percentage(50.0, 100.0), 50.0);
    assert_eq!(fill_percentage(250.0, 100.0), 100.0);
    assert_eq!(fill_percentage(0.004, 0.001), 0.0); // below epsilon, any max
    assert_eq!(fill_percentage(10.0, 0.0), 0.0); // degenerate ceiling
    assert_eq!(band_for(fill_percentage(0.004, 100.0)), ColorBand::Inactive);
}

#[test]
fn color_bands_are_a_step_function() {
    assert_eq!(band_for(0.0), ColorBand::Inactive);
    assert_eq!(band_for(50.0), ColorBand::Nominal);
    assert_eq!(band_for(50.1), ColorBand::Elevated);
    assert_eq!(band_for(70.0), ColorBand::Elevated);
    assert_eq!(band_for(80.0), ColorBand::High);
    assert_eq!(band_for(90.0), ColorBand::VeryHigh);
    assert_eq!(band_for(90.1), ColorBand::Critical);
    assert_eq!(band_for(100.0), ColorBand::Critical);
}

#[test]
fn second_identical_pass_emits_nothing() {
    let mut rec = ViewReconciler::new();
    let rows = vec![row("WAN", 40.0, 5.0), row("LAN", 0.0, 0.0)];
    let first = rec.reconcile(&rows);
    assert!(!first.is_empty());
    let second = rec.reconcile(&rows);
    assert!(second.is_empty(), "expected idempotence, got {second:?}");
}

#[test]
fn only_changed_attributes_mutate() {
    let mut rec = ViewReconciler::new();
    rec.reconcile(&[row("WAN", 40.0, 5.0)]);

    // Same band (40% -> 45% both nominal), so the band must not re-emit
    let muts = rec.reconcile(&[row("WAN", 45.0, 5.0)]);
    assert!(muts.iter().any(
        |m| matches!(m, Mutation::SetBar { direction: Direction::In, .. })
    ));
    assert!(!muts.iter().any(
        |m| matches!(m, Mutation::SetBand { direction: Direction::In, .. })
    ));
    assert!(!muts.iter().any(
        |m| matches!(m, Mutation::SetBar { direction: Direction::Out, .. })
    ));
}

#[test]
fn transient_zero_keeps_the_bar_but_updates_text() {
    let mut rec = ViewReconciler::new();
    rec.reconcile(&[row("WAN", 40.0, 20.0)]);

    let muts = rec.reconcile(&[row("WAN", 0.0, 20.0)]);
    // Bar and band suppressed for the inbound direction only
    assert!(!muts.iter().any(
        |m| matches!(m, Mutation::SetBar { direction: Direction::In, .. })
    ));
    assert!(!muts.iter().any(
        |m| matches!(m, Mutation::SetBand { direction: Direction::In, .. })
    ));
    assert!(muts.iter().any(
        |m| matches!(m, Mutation::SetText { direction: Direction::In, .. })
    ));
    // Applied view still shows the prior fill
    let view = rec.view("WAN").unwrap();
    assert_eq!(view.inbound.pct, 40.0);
}

#[test]
fn zero_suppression_is_per_direction() {
    let mut rec = ViewReconciler::new();
    rec.reconcile(&[row("WAN", 40.0, 20.0)]);
    rec.reconcile(&[row("WAN", 0.0, 0.0)]);
    let view = rec.view("WAN").unwrap();
    assert_eq!(view.inbound.pct, 40.0);
    assert_eq!(view.outbound.pct, 20.0);
}

#[test]
fn a_genuinely_idle_entity_shows_zero() {
    let mut rec = ViewReconciler::new();
    rec.reconcile(&[row("LAN", 0.0, 0.0)]);
    let view = rec.view("LAN").unwrap();
    assert_eq!(view.inbound.pct, 0.0);
    assert_eq!(view.inbound.band, ColorBand::Inactive);
}

#[test]
fn non_ok_interfaces_degrade_to_status_labels() {
    let status: StatusDoc = serde_json::from_value(serde_json::json!({
        "timestamp": 1000,
        "bandwidth_data": {
            "fwA": {
                "wan": { "status": "ok", "display_name": "WAN", "in": 12.0, "out": 3.0 },
                "opt1": { "status": "missing_values", "display_name": "DMZ" },
                "lan": { "status": "ok", "display_name": "LAN", "in": null, "out": 1.0 },
                "opt2": { "status": "ok", "in": 0.5, "out": 0.5 }
            }
        },
        "interface_names": { "opt2": "Backup" }
    }))
    .unwrap();

    let rows = rows_for_source(&status, "fwA", |_, _| 100.0);
    assert_eq!(rows.len(), 4);

    assert_eq!(rows[0].label, "WAN");
    assert_eq!(rows[0].in_value, 12.0);

    // A broken entry shows its status label with an empty bar, both ways
    assert_eq!(rows[1].label, "DMZ");
    assert_eq!(rows[1].in_text, "missing");
    assert_eq!(rows[1].out_text, "missing");
    assert_eq!(rows[1].in_value, 0.0);
    assert_eq!(rows[1].out_value, 0.0);
    assert_eq!(
        band_for(fill_percentage(rows[1].in_value, rows[1].in_max)),
        ColorBand::Inactive
    );

    // An ok entry missing one rate degrades only that cell
    assert_eq!(rows[2].in_text, "waiting");
    assert_eq!(rows[2].in_value, 0.0);
    assert_eq!(rows[2].out_value, 1.0);

    // Display name falls back to the shared name map, then the raw id
    assert_eq!(rows[3].label, "Backup");
}

#[test]
fn rows_for_an_unknown_source_are_empty() {
    let status: StatusDoc = serde_json::from_value(serde_json::json!({
        "timestamp": 1000,
        "bandwidth_data": {}
    }))
    .unwrap();
    assert!(rows_for_source(&status, "fwA", |_, _| 100.0).is_empty());
}

#[test]
fn recovery_from_suppressed_zero_applies_the_new_value() {
    let mut rec = ViewReconciler::new();
    rec.reconcile(&[row("WAN", 40.0, 0.0)]);
    rec.reconcile(&[row("WAN", 0.0, 0.0)]);
    let muts = rec.reconcile(&[row("WAN", 60.0, 0.0)]);
    assert!(muts
        .iter()
        .any(|m| matches!(m, Mutation::SetBar { pct, .. } if *pct == 60.0)));
    assert_eq!(rec.view("WAN").unwrap().inbound.pct, 60.0);
}
