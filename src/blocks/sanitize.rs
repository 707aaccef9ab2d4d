/// Turn raw stream bytes into displayable text.
///
/// `\r\n` and lone `\r` become `\n`, tabs become a single space, ANSI escape
/// sequences are removed and every other control character is dropped.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn sanitize(raw: &[u8]) -> String {
    // the escape stripper only keeps line feeds, so fold the other
    // whitespace controls first
    let mut folded = Vec::with_capacity(raw.len());
    let mut bytes = raw.iter().copied().peekable();
    while let Some(byte) = bytes.next() {
        match byte {
            b'\r' => {
                if bytes.peek() != Some(&b'\n') {
                    folded.push(b'\n');
                }
            }
            b'\t' => folded.push(b' '),
            other => folded.push(other),
        }
    }

    let stripped = strip_ansi_escapes::strip(&folded);
    String::from_utf8_lossy(&stripped)
        .chars()
        .filter(|ch| *ch == '\n' || !ch.is_control())
        .collect()
}
