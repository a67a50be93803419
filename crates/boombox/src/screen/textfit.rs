//! Text fitting for the character display: best-effort ASCII folding
//! of accented Latin characters, width clipping, and the horizontal
//! scroll window for labels wider than the display.

use unicode_width::UnicodeWidthChar;

/// Horizontal pan increment for Left/Right in list states.
pub const SCROLL_STEP: usize = 10;
/// A scrolled label always keeps at least this many characters
/// visible, so the offset never runs past `len - MIN_VISIBLE`.
pub const MIN_VISIBLE: usize = 5;

/// Folds a string to the display character set: accented Latin
/// letters map to their base letter, anything else outside printable
/// ASCII becomes `?`.
pub fn fold(text: &str) -> String {
    text.chars().filter_map(fold_char).collect()
}

fn fold_char(c: char) -> Option<char> {
    Some(match c {
        'à' | 'â' | 'ä' | 'á' | 'ã' | 'å' => 'a',
        'À' | 'Â' | 'Ä' | 'Á' | 'Ã' | 'Å' => 'A',
        'ç' => 'c',
        'Ç' => 'C',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'î' | 'ï' | 'í' | 'ì' => 'i',
        'Î' | 'Ï' | 'Í' | 'Ì' => 'I',
        'ô' | 'ö' | 'ó' | 'ò' | 'õ' => 'o',
        'Ô' | 'Ö' | 'Ó' | 'Ò' | 'Õ' => 'O',
        'ù' | 'û' | 'ü' | 'ú' => 'u',
        'Ù' | 'Û' | 'Ü' | 'Ú' => 'U',
        'ÿ' => 'y',
        'ñ' => 'n',
        'Ñ' => 'N',
        c if c.is_ascii_graphic() || c == ' ' => c,
        // combining marks occupy no cell; anything else non-ASCII
        // renders as one '?' cell
        c => match c.width() {
            Some(0) => return None,
            _ => '?',
        },
    })
}

/// Clips to `width` display cells (folded text is one cell per char).
pub fn clip(text: &str, width: usize) -> String {
    fold(text).chars().take(width).collect()
}

fn max_offset(label_len: usize) -> usize {
    label_len.saturating_sub(MIN_VISIBLE)
}

/// Next pan offset to the right: advances by `SCROLL_STEP`, wrapping
/// to the start once the step would run past `len - MIN_VISIBLE`.
pub fn scroll_right(offset: usize, label_len: usize) -> usize {
    let max = max_offset(label_len);
    if max == 0 {
        return 0;
    }
    let next = offset + SCROLL_STEP;
    if next > max {
        0
    } else {
        next
    }
}

/// Next pan offset to the left, wrapping from the start to the last
/// offset `scroll_right` visits before its own wrap.
pub fn scroll_left(offset: usize, label_len: usize) -> usize {
    let max = max_offset(label_len);
    if max == 0 {
        return 0;
    }
    if offset == 0 {
        (max / SCROLL_STEP) * SCROLL_STEP
    } else {
        offset.saturating_sub(SCROLL_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_accents_and_replaces_exotics() {
        assert_eq!(fold("Émission préférée"), "Emission preferee");
        assert_eq!(fold("Señor Üter"), "Senor Uter");
        assert_eq!(fold("日本 mix"), "?? mix");
    }

    #[test]
    fn clip_is_in_display_cells() {
        assert_eq!(clip("élégance totale", 6), "elegan");
        assert_eq!(clip("ok", 6), "ok");
    }

    #[test]
    fn scroll_cycles_without_passing_min_visible() {
        // label of length 25 on a 16-column display
        let len = 25;
        let mut offset = 0;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(offset);
            offset = scroll_right(offset, len);
        }
        assert_eq!(seen, vec![0, 10, 20, 0]);
        assert!(seen.iter().all(|&o| o <= len - MIN_VISIBLE));
    }

    #[test]
    fn scroll_left_wraps_to_last_stop() {
        let len = 25;
        assert_eq!(scroll_left(0, len), 20);
        assert_eq!(scroll_left(20, len), 10);
        assert_eq!(scroll_left(10, len), 0);
    }

    #[test]
    fn short_labels_never_scroll() {
        assert_eq!(scroll_right(0, 4), 0);
        assert_eq!(scroll_left(0, 4), 0);
        assert_eq!(scroll_right(0, 16), scroll_right(0, 16));
    }
}
