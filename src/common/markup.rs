/// Converts the constrained markdown dialect the generator emits into Slack
/// mrkdwn. Runs after every generation call, before the result is persisted.
///
/// The three passes are order-sensitive: headings are stripped first so that
/// bold spans inside heading lines survive the later bold conversion.
pub fn to_chat_markup(markdown: &str) -> String {
    let stripped = strip_headings(markdown);
    let bulleted = stripped.replace("\n* ", "\n- ");
    bulleted.replace("**", "*")
}

fn strip_headings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(strip_heading_marker(line));
    }
    out
}

/// Removes a leading run of `#` characters followed by a single space.
/// Lines that merely start with `#` but lack the space are left alone.
fn strip_heading_marker(line: &str) -> &str {
    let hashes = line.len() - line.trim_start_matches('#').len();
    if hashes > 0 {
        if let Some(rest) = line[hashes..].strip_prefix(' ') {
            return rest;
        }
    }
    line
}
