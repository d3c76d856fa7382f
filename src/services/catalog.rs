use crate::models::{ServiceId, ServiceOption};

static CATALOG: [ServiceOption; 5] = [
    ServiceOption {
        id: ServiceId::Handyman,
        label: "Handyman",
        description_template: "I need a handyman for repairs around my home (plumbing, electrical, carpentry or similar).",
    },
    ServiceOption {
        id: ServiceId::MoveIn,
        label: "Move-In",
        description_template: "I'm moving into a new home and need it cleaned, fixed up and ready before I arrive.",
    },
    ServiceOption {
        id: ServiceId::Renovation,
        label: "Renovate",
        description_template: "I'm planning a renovation and would like a site visit and a quote.",
    },
    ServiceOption {
        id: ServiceId::Emergency,
        label: "Emergency",
        description_template: "I have an urgent problem at home that needs someone out as soon as possible.",
    },
    ServiceOption {
        id: ServiceId::NotSure,
        label: "Not Sure",
        description_template: "",
    },
];

pub fn catalog() -> &'static [ServiceOption] {
    &CATALOG
}

pub fn lookup(id: ServiceId) -> &'static ServiceOption {
    // every ServiceId has exactly one entry
    match CATALOG.iter().find(|option| option.id == id) {
        Some(option) => option,
        None => unreachable!("service {id} missing from catalog"),
    }
}

pub fn template_for(id: ServiceId) -> &'static str {
    lookup(id).description_template
}
