pub fn user_html_report(payload_json: &str) -> String {
    format!(r#"Lay out the following analysis report as a complete, standalone HTML document.

Structure:
- A title block with the report title and the generation time.
- One block per section, in the given order, keeping the section titles.
- A highlighted summary of the top keywords.
- A table of the sample records (No., title, source).

CONSTRAINTS:
- Start with <!DOCTYPE html> and end with </html>.
- Inline all CSS; no external scripts, fonts or images.
- Keep every number and keyword exactly as given; do not invent data.
- Preserve the language of the data (Chinese text stays Chinese).

REPORT JSON:
<{json}>"#, json = payload_json)
}
