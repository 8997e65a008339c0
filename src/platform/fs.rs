// perfsplit - platform/fs.rs
//
// File reading helpers for input logs.

use crate::util::constants;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Open a log file for buffered sequential reading.
pub fn open_log(path: &Path) -> io::Result<BufReader<File>> {
    let file = File::open(path)?;
    Ok(BufReader::with_capacity(constants::READ_BUFFER_SIZE, file))
}

/// Feed every line of `reader` to `on_line`, in order, as raw bytes.
///
/// Lines are not decoded: a log in a legacy encoding (GBK, Latin-1) comes
/// through unchanged. The `\n` or `\r\n` terminator is stripped. On error,
/// lines delivered before the failure stay delivered.
pub fn for_each_line<R, F>(mut reader: R, mut on_line: F) -> io::Result<()>
where
    R: BufRead,
    F: FnMut(Vec<u8>),
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        on_line(std::mem::take(&mut buf));
    }
}
