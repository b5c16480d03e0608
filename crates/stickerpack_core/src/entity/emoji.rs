//! Splitting typed text into individual emojis.

const ZERO_WIDTH_JOINER: char = '\u{200D}';
const KEYCAP: char = '\u{20E3}';

fn is_variation_selector(c: char) -> bool {
    matches!(c, '\u{FE0E}' | '\u{FE0F}')
}

fn is_skin_tone(c: char) -> bool {
    ('\u{1F3FB}'..='\u{1F3FF}').contains(&c)
}

fn is_tag(c: char) -> bool {
    ('\u{E0020}'..='\u{E007F}').contains(&c)
}

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

fn is_keycap_base(c: char) -> bool {
    c.is_ascii_digit() || c == '#' || c == '*'
}

/// Pictographic blocks plus the handful of older symbols that render as
/// emoji with a variation selector.
fn is_pictographic(c: char) -> bool {
    matches!(c,
        '\u{1F000}'..='\u{1FAFF}'
        | '\u{2190}'..='\u{21FF}'
        | '\u{2300}'..='\u{23FF}'
        | '\u{25A0}'..='\u{27BF}'
        | '\u{2900}'..='\u{297F}'
        | '\u{2B00}'..='\u{2BFF}'
        | '\u{00A9}' | '\u{00AE}' | '\u{203C}' | '\u{2049}' | '\u{2122}'
        | '\u{2139}' | '\u{24C2}' | '\u{3030}' | '\u{303D}' | '\u{3297}'
        | '\u{3299}'
    )
}

fn is_emoji(cluster: &str) -> bool {
    match cluster.chars().next() {
        Some(base) if is_keycap_base(base) => cluster.contains(KEYCAP),
        Some(base) => is_pictographic(base),
        None => false,
    }
}

/// Splits `text` into one string per emoji.
///
/// Modifiers (variation selectors, skin tones, keycaps, tag sequences) and
/// zero-width-joiner sequences stay attached to their base character, and
/// regional indicators pair up into flags. Whitespace and anything that is
/// not an emoji, such as letters or bare digits, are dropped.
///
/// ```rust
/// use stickerpack_core::parse_emojis;
///
/// assert_eq!(parse_emojis("😀 👍🏽"), vec!["😀", "👍🏽"]);
/// assert!(parse_emojis("abc").is_empty());
/// ```
#[must_use]
pub fn parse_emojis(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut join_next = false;
    let mut open_flag = false;

    for c in text.chars() {
        if c.is_whitespace() {
            join_next = false;
            open_flag = false;
            continue;
        }

        let attach = match out.last_mut() {
            Some(_) if join_next => true,
            Some(_) if c == ZERO_WIDTH_JOINER => true,
            Some(_) => {
                is_variation_selector(c)
                    || is_skin_tone(c)
                    || c == KEYCAP
                    || is_tag(c)
                    || (open_flag && is_regional_indicator(c))
            }
            None => false,
        };

        if attach {
            if let Some(last) = out.last_mut() {
                last.push(c);
            }
            if open_flag && is_regional_indicator(c) {
                open_flag = false;
            }
        } else {
            out.push(c.to_string());
            open_flag = is_regional_indicator(c);
        }

        join_next = c == ZERO_WIDTH_JOINER;
    }

    out.retain(|cluster| is_emoji(cluster));
    out
}
