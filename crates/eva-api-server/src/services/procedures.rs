//! Fixed EVA procedure documents and the keyword matcher that selects them.
//!
//! Matching is plain substring search over the lowercased query. Rules are
//! checked in order and the first hit wins.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcedureDoc {
    pub id: &'static str,
    pub title: &'static str,
    pub section: &'static str,
    #[serde(skip_serializing_if = "no_steps")]
    pub steps: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<&'static str>,
}

fn no_steps(steps: &&'static [&'static str]) -> bool {
    steps.is_empty()
}

pub static EGRESS: ProcedureDoc = ProcedureDoc {
    id: "egress",
    title: "EVA Egress Procedure",
    section: "EVA-2.1",
    steps: &[
        "Verify suit pressure is stable at 4.3 psi",
        "Confirm primary and secondary O2 above 2900 psi",
        "Complete comm check with IV crew and mission control",
        "Depressurize airlock and confirm 0 psi",
        "Open outer hatch and attach safety tether",
        "Egress and report position to IV crew",
    ],
    guidance: None,
};

pub static EMERGENCY: ProcedureDoc = ProcedureDoc {
    id: "emergency",
    title: "EVA Emergency Return",
    section: "EVA-9.0",
    steps: &[
        "Stop current task and secure tools",
        "Report the emergency to IV crew and mission control",
        "Switch to secondary O2 if primary is below limits",
        "Translate directly to the airlock or nearest LTV",
        "Ingress and begin repressurization",
    ],
    guidance: None,
};

pub static NAVIGATION: ProcedureDoc = ProcedureDoc {
    id: "navigation",
    title: "EVA Navigation",
    section: "EVA-4.3",
    steps: &[],
    guidance: Some(
        "Use the LTV distance and bearing in telemetry to orient toward the rover. \
         Keep the planned traverse within walk-back range of consumables, avoid \
         shadowed terrain, and report position at each waypoint.",
    ),
};

static RULES: [(&[&str], &ProcedureDoc); 3] = [
    (&["egress", "exit"], &EGRESS),
    (&["emergency", "abort"], &EMERGENCY),
    (&["navigation", "route"], &NAVIGATION),
];

pub fn match_procedure(query: &str) -> Option<&'static ProcedureDoc> {
    let lowered = query.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(_, doc)| *doc)
}
