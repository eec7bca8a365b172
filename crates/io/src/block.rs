/// Reads until `buf` is full or the source reports end-of-file.
///
/// Short reads from the underlying source are retried so that every block but
/// the last one is exactly `buf.len()` bytes long.
///
/// # Errors
///
/// - `std::io::Error` from the underlying reader. `Interrupted` is retried.
pub fn fill_block<R: std::io::Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> std::io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}

/// `floor(done * 100 / total)`, saturating at 100.
///
/// An empty total counts as complete.
#[inline]
#[must_use]
pub fn percent_of(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }

    // u128 keeps `done * 100` exact for any u64 length.
    let pct = (u128::from(done) * 100) / u128::from(total);

    u8::try_from(pct.min(100)).unwrap_or(100)
}
