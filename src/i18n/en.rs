//! English translations

use std::collections::HashMap;

pub fn get_translations() -> HashMap<String, String> {
    let mut t = HashMap::new();

    // Quote summary
    t.insert("quote.title".into(), "Stump Quote".into());
    t.insert("quote.client".into(), "Client".into());
    t.insert("quote.address".into(), "Address".into());
    t.insert("quote.stumps".into(), "Stumps".into());
    t.insert("quote.subtotal".into(), "Subtotal".into());
    t.insert("quote.tax".into(), "HST".into());
    t.insert("quote.total".into(), "Total".into());
    t.insert("quote.chips".into(), "Est. chips".into());
    t.insert("quote.minimum_call_out".into(), "Minimum call-out".into());
    t.insert("quote.volume_discount".into(), "Volume discount applied automatically (20% off after first).".into());
    t.insert("quote.access_threshold".into(), "Access warning applies to gates under".into());

    // Stump flags
    t.insert("stump.haul_away".into(), "haul-away".into());
    t.insert("stump.deep_grind".into(), "deep".into());
    t.insert("stump.roots".into(), "roots".into());
    t.insert("stump.narrow_access".into(), "narrow access".into());

    // Job status
    t.insert("status.draft".into(), "Draft".into());
    t.insert("status.sent".into(), "Sent".into());
    t.insert("status.completed".into(), "Completed".into());
    t.insert("status.archived".into(), "Archived".into());

    // Units
    t.insert("unit.kilograms".into(), "kg".into());
    t.insert("unit.feet".into(), "ft".into());

    // Email
    t.insert("email.subject".into(), "Your stump grinding quote".into());
    t.insert("email.sent".into(), "Quote sent".into());

    t
}
