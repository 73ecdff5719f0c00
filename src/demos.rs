//! Built-in scripted sequences against the OpenFDA drug-information tools.

use crate::runner::DemoStep;
use serde_json::json;

/// The drug-information walkthrough: label search, adverse reactions,
/// warnings, a RAG safety analysis, then indications for three common
/// painkillers.
pub fn drug_walkthrough() -> Vec<DemoStep> {
    let mut steps = vec![
        DemoStep::named(
            "Search drug labels for ibuprofen",
            "search_drug_labels",
            json!({ "search": "ibuprofen", "limit": 1 }),
        ),
        DemoStep::named(
            "Adverse reactions for aspirin",
            "get_drug_adverse_reactions",
            json!({ "drug_name": "aspirin", "limit": 1 }),
        ),
        DemoStep::named(
            "Warnings for acetaminophen",
            "get_drug_warnings",
            json!({ "drug_name": "acetaminophen", "limit": 1 }),
        ),
        DemoStep::named(
            "RAG analysis: cardiovascular side effects of ibuprofen",
            "ae_pipeline_rag",
            json!({
                "query": "cardiovascular side effects",
                "drug": "ibuprofen",
                "top_k": 3,
            }),
        ),
    ];

    for drug in ["aspirin", "ibuprofen", "naproxen"] {
        steps.push(DemoStep::named(
            &format!("Indications for {}", drug),
            "get_drug_indications",
            json!({ "drug_name": drug, "limit": 1 }),
        ));
    }

    steps
}

/// Catalog probe: call whatever tool the server lists first, with arguments
/// derived from its schema.
pub fn catalog_probe() -> Vec<DemoStep> {
    vec![DemoStep::first_listed(
        "Probe the first advertised tool with derived arguments",
    )]
}
