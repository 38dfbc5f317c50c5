//! Prompt normalization.

/// Normalize message content into the prompt handed to reply handlers.
///
/// Removes mention markup addressed to the bot (`<at id="SELF"/>`, with or
/// without extra attributes) and trims the result. Mentions of anyone else are
/// left in place.
pub fn normalize_prompt(content: &str, self_id: &str) -> String {
    let needle = format!("id=\"{self_id}\"");
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("<at ") {
        let Some(len) = rest[start..].find('>') else {
            break;
        };

        let end = start + len + 1;
        let tag = &rest[start..end];

        out.push_str(&rest[..start]);
        rest = &rest[end..];

        if tag.contains(&needle) {
            // A paired tag also drops its inner text.
            if !tag.ends_with("/>") {
                rest = rest.find("</at>").map_or(rest, |close| &rest[close + "</at>".len()..]);
            }
        } else {
            out.push_str(tag);
        }
    }

    out.push_str(rest);

    out.trim().to_string()
}
