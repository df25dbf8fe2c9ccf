//! Prompt surfaces handed to the host.
//!
//! Three artifacts cross this boundary: the `<intent_context>` XML block
//! returned by a successful handshake, the canned system-prompt fragment
//! listing available intents, and the JSON schema of the one tool Gatehouse
//! adds to the model's toolset.

use crate::core::intent::Intent;
use crate::core::tools::SELECT_ACTIVE_INTENT;

fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Render the handshake context block for a bound intent.
pub fn intent_context_xml(intent: &Intent) -> String {
    let mut xml = String::new();
    xml.push_str("<intent_context>\n");
    xml.push_str(&format!("  <id>{}</id>\n", xml_escape(&intent.id)));
    xml.push_str(&format!("  <name>{}</name>\n", xml_escape(&intent.name)));
    xml.push_str(&format!(
        "  <status>{}</status>\n",
        xml_escape(&intent.status.to_string())
    ));
    xml.push_str("  <owned_scope>\n");
    for pattern in &intent.owned_scope {
        xml.push_str(&format!(
            "    <pattern>{}</pattern>\n",
            xml_escape(pattern)
        ));
    }
    xml.push_str("  </owned_scope>\n");
    xml.push_str("  <constraints>\n");
    for item in &intent.constraints {
        xml.push_str(&format!("    <item>{}</item>\n", xml_escape(item)));
    }
    xml.push_str("  </constraints>\n");
    xml.push_str("  <acceptance_criteria>\n");
    for item in &intent.acceptance_criteria {
        xml.push_str(&format!("    <item>{}</item>\n", xml_escape(item)));
    }
    xml.push_str("  </acceptance_criteria>\n");
    xml.push_str("</intent_context>");
    xml
}

/// Canned fragment the host prepends to its system prompt.
pub fn prompt_fragment(intent_ids: &[String]) -> String {
    let mut out = String::new();
    out.push_str("INTENT GOVERNANCE\n\n");
    out.push_str(
        "File-mutating tools are gated behind a declared intent. Your first tool \
         call must be `select_active_intent` with one of the intent ids below; \
         mutations outside the bound intent's owned scope will be blocked.\n\n",
    );
    if intent_ids.is_empty() {
        out.push_str("Declared intents: (none — ask a human to declare one before mutating files)\n");
    } else {
        out.push_str("Declared intents:\n");
        for id in intent_ids {
            out.push_str(&format!("- {id}\n"));
        }
    }
    out
}

/// JSON schema for the handshake tool the host exposes to the model.
pub fn select_intent_tool_schema() -> serde_json::Value {
    serde_json::json!({
        "name": SELECT_ACTIVE_INTENT,
        "description": "Bind the current turn to a declared intent. Must be called before any file-mutating tool.",
        "input_schema": {
            "type": "object",
            "properties": {
                "intent_id": {
                    "type": "string",
                    "description": "Id of a declared intent from the workspace registry (e.g. INT-001)"
                }
            },
            "required": ["intent_id"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::intent::IntentStatus;

    fn sample_intent() -> Intent {
        Intent {
            id: "INT-001".to_string(),
            name: "Weather endpoint".to_string(),
            status: IntentStatus::InProgress,
            owned_scope: vec!["src/api/**".to_string()],
            constraints: vec!["Do not touch auth & session code".to_string()],
            acceptance_criteria: vec!["GET /weather returns 200".to_string()],
        }
    }

    #[test]
    fn context_block_carries_all_sections() {
        let xml = intent_context_xml(&sample_intent());
        assert!(xml.starts_with("<intent_context>"));
        assert!(xml.ends_with("</intent_context>"));
        assert!(xml.contains("<id>INT-001</id>"));
        assert!(xml.contains("<status>IN_PROGRESS</status>"));
        assert!(xml.contains("<pattern>src/api/**</pattern>"));
        assert!(xml.contains("<item>GET /weather returns 200</item>"));
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let xml = intent_context_xml(&sample_intent());
        assert!(xml.contains("auth &amp; session"));

        let mut intent = sample_intent();
        intent.name = "<script>".to_string();
        assert!(intent_context_xml(&intent).contains("<name>&lt;script&gt;</name>"));
    }

    #[test]
    fn fragment_lists_ids_and_the_handshake_rule() {
        let fragment = prompt_fragment(&["INT-001".to_string(), "INT-002".to_string()]);
        assert!(fragment.contains("select_active_intent"));
        assert!(fragment.contains("- INT-001"));
        assert!(fragment.contains("- INT-002"));

        let empty = prompt_fragment(&[]);
        assert!(empty.contains("none"));
    }

    #[test]
    fn tool_schema_is_well_formed() {
        let schema = select_intent_tool_schema();
        assert_eq!(schema["name"], "select_active_intent");
        assert_eq!(schema["input_schema"]["required"][0], "intent_id");
    }
}
