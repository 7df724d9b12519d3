//! French translations

use std::collections::HashMap;

pub fn get_translations() -> HashMap<String, String> {
    let mut t = HashMap::new();

    // Quote summary
    t.insert("quote.title".into(), "Devis de dessouchage".into());
    t.insert("quote.client".into(), "Client".into());
    t.insert("quote.address".into(), "Adresse".into());
    t.insert("quote.stumps".into(), "Souches".into());
    t.insert("quote.subtotal".into(), "Sous-total".into());
    t.insert("quote.tax".into(), "TVH".into());
    t.insert("quote.total".into(), "Total".into());
    t.insert("quote.chips".into(), "Copeaux estim\u{00E9}s".into());
    t.insert("quote.minimum_call_out".into(), "D\u{00E9}placement minimum".into());
    t.insert("quote.volume_discount".into(), "Rabais de volume appliqu\u{00E9} automatiquement (20 % apr\u{00E8}s la premi\u{00E8}re).".into());
    t.insert("quote.access_threshold".into(), "Avertissement d'acc\u{00E8}s pour les barri\u{00E8}res de moins de".into());

    // Stump flags
    t.insert("stump.haul_away".into(), "enl\u{00E8}vement".into());
    t.insert("stump.deep_grind".into(), "profond".into());
    t.insert("stump.roots".into(), "racines".into());
    t.insert("stump.narrow_access".into(), "acc\u{00E8}s \u{00E9}troit".into());

    // Job status
    t.insert("status.draft".into(), "Brouillon".into());
    t.insert("status.sent".into(), "Envoy\u{00E9}".into());
    t.insert("status.completed".into(), "Termin\u{00E9}".into());
    t.insert("status.archived".into(), "Archiv\u{00E9}".into());

    // Units
    t.insert("unit.kilograms".into(), "kg".into());
    t.insert("unit.feet".into(), "pi".into());

    // Email
    t.insert("email.subject".into(), "Votre devis de dessouchage".into());
    t.insert("email.sent".into(), "Devis envoy\u{00E9}".into());

    t
}
