//! Extraction rule evaluation

use crate::backend::{MatchedElement, PageBackend};
use crate::protocol::{ExtractRules, ExtractedData, ExtractedNode};
use crate::Result;

/// Evaluate extraction rules against the current page.
///
/// Runs once per call, after any actions. Each rule key maps to the
/// elements its selector matched, in page order; a selector matching
/// nothing yields an empty list, which callers inspect to detect
/// extraction misses.
pub async fn apply(backend: &dyn PageBackend, rules: &ExtractRules) -> Result<ExtractedData> {
    let mut data = ExtractedData::new();

    for (key, selector) in rules {
        let nodes = backend.query(selector).await?;
        data.insert(key.clone(), nodes.into_iter().map(to_node).collect());
    }

    Ok(data)
}

fn to_node(element: MatchedElement) -> ExtractedNode {
    ExtractedNode {
        text: element.text,
        value: element.value,
    }
}
