//! Fixed value remaps between form wording and downstream label sets.

/// Form business-stage options to the labels the hosted form expects.
pub const BUSINESS_STAGE: &[(&str, &str)] = &[
    ("Seed/Idea Phase", "Seed/Idea Phase"),
    ("Start up Phase", "Start-up Phase"),
    ("Growth Phase", "Growth Phase"),
    ("Expansion Phase", "Expansion Phase"),
    ("Maturity/Exit Phase", "Maturity / Exit Phase"),
];

/// Business presence to CRM industry category.
pub const PRESENCE_INDUSTRY: &[(&str, &str)] = &[
    ("Home based", "Service"),
    ("Brick and Mortar", "Retail"),
    ("Brick & Mortar", "Retail"),
    ("E-commerce", "Technology"),
];

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(from, _)| *from == key).map(|(_, to)| *to)
}

/// Canonical business-stage label; unmapped values pass through unchanged.
pub fn business_stage_label(stage: &str) -> String {
    lookup(BUSINESS_STAGE, stage)
        .map(str::to_string)
        .unwrap_or_else(|| stage.to_string())
}

/// CRM industry for a business presence, `Other` when unmapped.
pub fn industry_for_presence(presence: &str) -> &'static str {
    lookup(PRESENCE_INDUSTRY, presence).unwrap_or("Other")
}
