// Shared prompt fragments and the template filler used by every use case.
// Each use-case module keeps its own templates in a prompts.rs alongside it.

/// Closing instruction for prompts that list free-named categories.
pub const JSON_CATEGORIES_INSTRUCTION: &str = "Format the response as a JSON object with these categories.";

/// Substitutes `{name}` placeholders in a single pass.
///
/// Values are inserted verbatim and never re-scanned, so input text that
/// happens to contain `{resume_text}` or similar stays as written.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(
        template.len() + vars.iter().map(|(_, v)| v.len()).sum::<usize>(),
    );
    let mut rest = template;

    loop {
        let next = vars
            .iter()
            .filter_map(|(name, value)| {
                let placeholder = format!("{{{name}}}");
                rest.find(&placeholder)
                    .map(|idx| (idx, placeholder.len(), *value))
            })
            .min_by_key(|(idx, _, _)| *idx);

        match next {
            Some((idx, len, value)) => {
                out.push_str(&rest[..idx]);
                out.push_str(value);
                rest = &rest[idx + len..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}
