use qrx_core::{QrxError, QrxResult, MAX_PAYLOAD};

/// Cut a payload into `<offset>/<total>|<data>` chunk strings, the format
/// `ChunkAssembler` reads back.
///
/// Cuts never split a UTF-8 character, so a chunk may carry slightly
/// fewer than `chunk_len` data bytes.
pub fn split_payload(data: &str, chunk_len: usize) -> QrxResult<Vec<String>> {
    if chunk_len == 0 || data.is_empty() { return Err(QrxError::InvalidState); }
    if data.len() > MAX_PAYLOAD { return Err(QrxError::PayloadTooLarge); }

    let total = data.len();
    let mut chunks = Vec::with_capacity(total.div_ceil(chunk_len));
    let mut offset = 0;

    while offset < total {
        let mut end = core::cmp::min(offset + chunk_len, total);
        while !data.is_char_boundary(end) {
            end -= 1;
        }
        if end == offset {
            // Single character wider than chunk_len: emit it whole.
            end = offset + 1;
            while !data.is_char_boundary(end) {
                end += 1;
            }
        }
        chunks.push(format!("{}/{}|{}", offset, total, &data[offset..end]));
        offset = end;
    }
    Ok(chunks)
}
