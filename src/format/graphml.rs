// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

use crate::model::{DesignModel, LevelCount};

/// Exports a design as a GraphML document with `d0`/`d1` node attributes
/// (level count, category) and a `d2` edge attribute (relationship kind).
pub fn to_graphml(model: &DesignModel) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\"");
    out.push_str(" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"");
    out.push_str(
        " xsi:schemaLocation=\"http://graphml.graphdrawing.org/xmlns \
         http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd\">\n",
    );
    out.push_str("  <key id=\"d0\" for=\"node\" attr.name=\"factor_n\" attr.type=\"string\"/>\n");
    out.push_str("  <key id=\"d1\" for=\"node\" attr.name=\"factor_type\" attr.type=\"string\"/>\n");
    out.push_str("  <key id=\"d2\" for=\"edge\" attr.name=\"rel_type\" attr.type=\"string\"/>\n");
    out.push_str("  <graph id=\"G\" edgedefault=\"directed\">\n");

    for factor in model.factors() {
        out.push_str(&format!("    <node id=\"{}\">\n", escape(factor.name())));
        out.push_str(&format!(
            "      <data key=\"d0\">{}</data>\n",
            escape(&level_text(factor.levels()))
        ));
        out.push_str(&format!(
            "      <data key=\"d1\">{}</data>\n",
            factor.category().as_str()
        ));
        out.push_str("    </node>\n");
    }

    for (i, rel) in model.relationships().iter().enumerate() {
        out.push_str(&format!(
            "    <edge id=\"e{}\" source=\"{}\" target=\"{}\">\n",
            i,
            escape(rel.source()),
            escape(rel.target())
        ));
        out.push_str(&format!("      <data key=\"d2\">{}</data>\n", rel.kind().as_str()));
        out.push_str("    </edge>\n");
    }

    out.push_str("  </graph>\n");
    out.push_str("</graphml>\n");
    out
}

fn level_text(levels: &LevelCount) -> String {
    match levels {
        LevelCount::Fixed(n) => n.to_string(),
        LevelCount::Approximate(n) => format!("~{n}"),
        LevelCount::Unbalanced(counts) => {
            let parts: Vec<String> = counts.iter().map(|count| count.to_string()).collect();
            format!("[{}]", parts.join(","))
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
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

#[cfg(test)]
mod tests {
    use super::{escape, to_graphml};
    use crate::grammar::parse_design;

    #[test]
    fn document_declares_keys_and_a_directed_graph() {
        let model = parse_design("Site(3) > Patient(20)").expect("parse");
        let xml = to_graphml(&model);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.contains("<key id=\"d0\" for=\"node\" attr.name=\"factor_n\" attr.type=\"string\"/>"));
        assert!(xml.contains("<graph id=\"G\" edgedefault=\"directed\">"));
    }

    #[test]
    fn every_factor_and_relationship_appears() {
        let model = parse_design("Site(3) > Patient(20) × Treatment(2)").expect("parse");
        let xml = to_graphml(&model);
        assert!(xml.contains("<node id=\"Site\">"));
        assert!(xml.contains("<node id=\"Treatment\">"));
        assert!(xml.contains("<edge id=\"e0\" source=\"Site\" target=\"Patient\">"));
        assert!(xml.contains("<data key=\"d2\">nests</data>"));
        assert!(xml.contains("<data key=\"d2\">crosses</data>"));
    }

    #[test]
    fn level_counts_use_the_wire_spellings() {
        let model = parse_design("A(~5000) > B[30|25]").expect("parse");
        let xml = to_graphml(&model);
        assert!(xml.contains("<data key=\"d0\">~5000</data>"));
        assert!(xml.contains("<data key=\"d0\">[30,25]</data>"));
    }

    #[test]
    fn xml_metacharacters_are_escaped() {
        assert_eq!(escape("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&apos;");
    }
}
