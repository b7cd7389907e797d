/// Cosmetic sentence rewrites used to dodge n-gram collisions.

/// Upper bound on the number of entries `variants` returns.
pub const MAX_VARIANTS: usize = 4;

/// The original sentence followed by its surface rewrites, in a fixed order:
///
/// 1. the first standalone word `and` replaced with `&`
/// 2. the first `,` replaced with an em-dash
/// 3. the trailing period removed (only offered when there is one)
///
/// A rewrite whose trigger is absent is still listed and equals the input,
/// so each rewrite keeps its position in the list.
pub fn variants(sentence: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(MAX_VARIANTS);
    out.push(sentence.to_string());
    out.push(replace_first_word(sentence, "and", "&"));
    out.push(sentence.replacen(',', "—", 1));
    if let Some(stripped) = sentence.strip_suffix('.') {
        out.push(stripped.to_string());
    }
    out
}

/// Replace the first occurrence of `word` that is not part of a longer word.
fn replace_first_word(text: &str, word: &str, replacement: &str) -> String {
    let mut from = 0;
    while let Some(offset) = text[from..].find(word) {
        let start = from + offset;
        let end = start + word.len();
        let clear_before = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let clear_after = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if clear_before && clear_after {
            let mut out = String::with_capacity(text.len());
            out.push_str(&text[..start]);
            out.push_str(replacement);
            out.push_str(&text[end..]);
            return out;
        }
        from = end;
    }
    text.to_string()
}
