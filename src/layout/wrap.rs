use super::font::TextMeasure;

/// Greedy wrap by character count. A word longer than `max_chars` first
/// fills what is left of the current line, then continues in
/// `max_chars`-sized chunks, without a hyphen.
pub(super) fn wrap_by_estimate(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    if max_chars == 0 {
        return lines;
    }

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
            continue;
        }
        if word_len <= max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
            current_len = word_len;
            continue;
        }

        let chars: Vec<char> = word.chars().collect();
        let mut rest = &chars[..];
        if current_len > 0 {
            let space_left = max_chars.saturating_sub(current_len + 1);
            if space_left > 0 {
                current.push(' ');
                current.extend(&rest[..space_left]);
                rest = &rest[space_left..];
            }
            lines.push(std::mem::take(&mut current));
        }
        let mut chunks = rest.chunks(max_chars).peekable();
        while let Some(chunk) = chunks.next() {
            let piece: String = chunk.iter().collect();
            if chunks.peek().is_some() {
                lines.push(piece);
            } else {
                current_len = chunk.len();
                current = piece;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Greedy wrap on measured widths, hyphenating words that cannot fit on a
/// line of their own.
pub(super) fn wrap_with_hyphenation<M: TextMeasure + ?Sized>(
    text: &str,
    font_size: f32,
    max_width: f32,
    metrics: &M,
) -> Vec<String> {
    let fits = |piece: &str| metrics.text_width(piece, font_size) <= max_width;
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if fits(&candidate) {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if fits(word) {
            current = word.to_string();
        } else {
            hyphenate(word, &fits, &mut lines);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Emits the longest fitting prefix (plus `-` unless it ends the word) line
/// by line. When not even one character fits, one character is emitted
/// anyway so the loop always advances.
fn hyphenate<F: Fn(&str) -> bool>(word: &str, fits: &F, lines: &mut Vec<String>) {
    let chars: Vec<char> = word.chars().collect();
    let mut start = 0;
    while start < chars.len() {
        let remaining = chars.len() - start;
        let mut emitted = false;
        for take in (1..=remaining).rev() {
            let mut piece: String = chars[start..start + take].iter().collect();
            if take < remaining {
                piece.push('-');
            }
            if fits(&piece) {
                lines.push(piece);
                start += take;
                emitted = true;
                break;
            }
        }
        if !emitted {
            lines.push(chars[start].to_string());
            start += 1;
        }
    }
}
