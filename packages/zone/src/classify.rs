//! Danger-tier classification and marker rendering.

use sos_map_zone_models::{CrimeZone, DangerTier, MarkerSpec, MarkerStyle};

/// Screen radius of a zone circle, in pixels.
pub const ZONE_RADIUS: u32 = 12;

/// Fill opacity of a zone circle.
pub const ZONE_FILL_OPACITY: f64 = 0.7;

/// Returns the danger tier of `zone`.
#[must_use]
pub const fn classify(zone: &CrimeZone) -> DangerTier {
    DangerTier::for_count(zone.total_crime_count)
}

/// Returns the zones to display, in dataset order.
///
/// With `danger_only`, only [`DangerTier::High`] zones are kept.
#[must_use]
pub fn visible_zones(all: &[CrimeZone], danger_only: bool) -> Vec<&CrimeZone> {
    all.iter()
        .filter(|zone| !danger_only || classify(zone) == DangerTier::High)
        .collect()
}

/// Builds the marker for `zone` drawn at `tier`.
#[must_use]
pub fn render(zone: &CrimeZone, tier: DangerTier) -> MarkerSpec {
    MarkerSpec {
        position: zone.coordinates(),
        style: MarkerStyle::Circle {
            color: tier.color(),
            radius: ZONE_RADIUS,
            fill_opacity: ZONE_FILL_OPACITY,
        },
        popup_text: Some(popup_text(zone)),
    }
}

/// Popup HTML for a zone marker.
#[must_use]
pub fn popup_text(zone: &CrimeZone) -> String {
    format!(
        "<b>{}</b><br/>Total Crimes: {}",
        zone.name, zone.total_crime_count
    )
}

#[cfg(test)]
mod tests {
    use sos_map_zone_models::MarkerColor;

    use super::*;

    fn zone(name: &str, count: u64) -> CrimeZone {
        CrimeZone {
            name: name.to_string(),
            lat: 28.6,
            lng: 77.2,
            total_crime_count: count,
        }
    }

    #[test]
    fn classify_boundaries() {
        assert_eq!(classify(&zone("a", 200)), DangerTier::Low);
        assert_eq!(classify(&zone("b", 201)), DangerTier::Medium);
        assert_eq!(classify(&zone("c", 500)), DangerTier::Medium);
        assert_eq!(classify(&zone("d", 501)), DangerTier::High);
    }

    #[test]
    fn danger_only_keeps_high_in_order() {
        let all = vec![
            zone("high-1", 900),
            zone("low", 10),
            zone("medium", 300),
            zone("high-2", 501),
            zone("edge", 500),
        ];

        let names: Vec<&str> = visible_zones(&all, true)
            .into_iter()
            .map(|z| z.name.as_str())
            .collect();
        assert_eq!(names, vec!["high-1", "high-2"]);
    }

    #[test]
    fn unfiltered_returns_everything_unchanged() {
        let all = vec![zone("x", 1), zone("y", 700), zone("z", 250)];
        let visible = visible_zones(&all, false);

        assert_eq!(visible.len(), all.len());
        for (shown, original) in visible.iter().zip(&all) {
            assert_eq!(*shown, original);
        }
    }

    #[test]
    fn render_uses_tier_color_and_popup() {
        let z = zone("HAUZ KHAS", 612);
        let marker = render(&z, classify(&z));

        assert_eq!(
            marker.style,
            MarkerStyle::Circle {
                color: MarkerColor::Red,
                radius: ZONE_RADIUS,
                fill_opacity: ZONE_FILL_OPACITY,
            }
        );
        assert_eq!(marker.position, z.coordinates());
        assert_eq!(
            marker.popup_text.as_deref(),
            Some("<b>HAUZ KHAS</b><br/>Total Crimes: 612")
        );
    }

    #[test]
    fn render_color_follows_given_tier() {
        let z = zone("x", 10);
        let MarkerStyle::Circle { color, .. } = render(&z, DangerTier::Medium).style else {
            panic!("zone markers are circles");
        };
        assert_eq!(color, MarkerColor::Orange);
    }
}
