/// Compute the display width of a string after stripping ANSI escapes.
///
/// Used both to pick the longest line of a block set and by the cell
/// measurer, so escape sequences that survived sanitizing never inflate a
/// block.
pub fn display_width(text: &str) -> usize {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);
    unicode_width::UnicodeWidthStr::width(&*clean_str)
}
