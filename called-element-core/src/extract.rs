//! Process id recovery from raw process markup.
//!
//! A tolerant pattern match rather than an XML parse: assets in the
//! repository may be partial or malformed, and only the id of the first
//! `<…process … id="…">` opening tag is needed.

use regex::Regex;
use std::sync::LazyLock;

/// Opening tag whose element name ends in `process` (any prefix, e.g.
/// `bpmn2:`), followed within the same tag by an `id="…"` attribute.
static PROCESS_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<[^\s<>]*process(?:\s[^>]*?)??\sid="([^"]+)""#).unwrap()
});

/// Return the id declared by the first process element in `content`, or
/// `None` when no such element exists.
pub fn extract_process_id(content: &str) -> Option<&str> {
    PROCESS_ID_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaced_process_element() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn2:definitions xmlns:bpmn2="http://www.omg.org/spec/BPMN/20100524/MODEL" id="Definitions_1">
  <bpmn2:process id="orders.ship-order" drools:packageName="orders" name="Ship" isExecutable="true">
    <bpmn2:startEvent id="start"/>
  </bpmn2:process>
</bpmn2:definitions>"#;
        assert_eq!(extract_process_id(xml), Some("orders.ship-order"));
    }

    #[test]
    fn unprefixed_element() {
        assert_eq!(
            extract_process_id(r#"<process id="plain" name="p">"#),
            Some("plain")
        );
    }

    #[test]
    fn id_after_other_attributes_and_line_breaks() {
        let xml = "<bpmn:process\n    name=\"Cancel\"\n    isExecutable=\"true\"\n    id=\"cancel-order\">";
        assert_eq!(extract_process_id(xml), Some("cancel-order"));
    }

    #[test]
    fn first_process_wins() {
        let xml = r#"<bpmn2:process id="first"></bpmn2:process><bpmn2:process id="second">"#;
        assert_eq!(extract_process_id(xml), Some("first"));
    }

    #[test]
    fn definitions_and_subprocess_ids_ignored() {
        let xml = r#"<bpmn2:definitions id="defs">
  <bpmn2:subProcess id="nested"/>
  <bpmn2:process name="no id here">
  </bpmn2:process>
</bpmn2:definitions>"#;
        assert_eq!(extract_process_id(xml), None);
    }

    #[test]
    fn id_attribute_is_case_sensitive() {
        assert_eq!(extract_process_id(r#"<bpmn2:process ID="upper">"#), None);
    }

    #[test]
    fn id_must_belong_to_the_process_tag() {
        let xml = r#"<bpmn2:process name="x"><bpmn2:task id="task_1"/>"#;
        assert_eq!(extract_process_id(xml), None);
    }

    #[test]
    fn empty_and_garbage_input() {
        assert_eq!(extract_process_id(""), None);
        assert_eq!(extract_process_id("not markup at all"), None);
        assert_eq!(extract_process_id(r#"<bpmn2:process id=""#), None);
        assert_eq!(extract_process_id("<<<process>>> id=\"x\""), None);
    }
}
