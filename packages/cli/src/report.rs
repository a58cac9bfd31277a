//! Terminal rendering of zone tables and dispatch reports.

use sos_map_alert::{DispatchReport, DispatchStatus};
use sos_map_zone::{CrimeZone, classify, visible_zones};

/// Prints one row per visible zone with its count and tier.
pub fn print_zone_table(zones: &[CrimeZone], danger_only: bool) {
    let visible = visible_zones(zones, danger_only);

    println!();
    println!("{:<32} {:>8}  TIER", "ZONE", "CRIMES");
    println!("{}", "-".repeat(50));

    for zone in &visible {
        println!(
            "{:<32} {:>8}  {}",
            zone.name,
            zone.total_crime_count,
            classify(zone)
        );
    }

    println!("\n{} of {} zone(s)", visible.len(), zones.len());
}

/// Prints every per-contact outcome followed by a one-line summary.
pub fn print_dispatch_report(report: &DispatchReport) {
    println!();
    println!("Location: {}", report.payload.map_url);
    println!("Time:     {}", report.payload.timestamp);
    println!();

    for outcome in &report.outcomes {
        if outcome.succeeded {
            println!("  sent    {}", outcome.email);
        } else {
            println!(
                "  FAILED  {}: {}",
                outcome.email,
                outcome.error_detail.as_deref().unwrap_or("unknown error")
            );
        }
    }

    let total = report.outcomes.len();
    match report.status() {
        DispatchStatus::NoRecipients => println!("No emergency contacts to alert."),
        DispatchStatus::AllSucceeded => {
            println!("\nSOS alert sent to all {total} contact(s).");
        }
        DispatchStatus::PartialFailure => println!(
            "\nSOS alert sent to {} of {total} contact(s).",
            report.succeeded_count()
        ),
        DispatchStatus::TotalFailure => {
            println!("\nFailed to send the SOS alert to any contact.");
        }
    }
}
