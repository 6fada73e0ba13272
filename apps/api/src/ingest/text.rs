//! HTML stripping for job descriptions, which arrive as markup from both
//! job boards. Tags are dropped, a handful of common entities are decoded,
//! and the result is trimmed.

pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '<' => {
                // Skip to the closing '>', tolerating unterminated tags.
                for t in chars.by_ref() {
                    if t == '>' {
                        break;
                    }
                }
            }
            '&' => {
                let mut entity = String::new();
                let mut terminated = false;
                while let Some(&next) = chars.peek() {
                    if next == ';' {
                        chars.next();
                        terminated = true;
                        break;
                    }
                    if next == '&' || next == '<' || entity.len() >= 8 {
                        break;
                    }
                    entity.push(next);
                    chars.next();
                }
                match entity.as_str() {
                    "amp" => out.push('&'),
                    "lt" => out.push('<'),
                    "gt" => out.push('>'),
                    "quot" => out.push('"'),
                    "apos" | "#39" => out.push('\''),
                    "nbsp" => out.push(' '),
                    _ => {
                        // Unknown entity: keep it verbatim.
                        out.push('&');
                        out.push_str(&entity);
                        if terminated {
                            out.push(';');
                        }
                    }
                }
            }
            _ => out.push(c),
        }
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags() {
        assert_eq!(
            strip_html("<p>Build <b>fast</b> services</p>"),
            "Build fast services"
        );
    }

    #[test]
    fn test_decodes_common_entities() {
        assert_eq!(strip_html("R&amp;D &lt;team&gt;"), "R&D <team>");
        assert_eq!(strip_html("It&#39;s&nbsp;here"), "It's here");
    }

    #[test]
    fn test_unknown_entity_kept_verbatim() {
        assert_eq!(strip_html("caf&eacute;"), "caf&eacute;");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(strip_html("  no markup here  "), "no markup here");
    }

    #[test]
    fn test_unterminated_tag_is_dropped() {
        assert_eq!(strip_html("before <broken"), "before");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(strip_html(""), "");
    }
}
