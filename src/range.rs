// HTTP Range header parsing against a known object size.

/// Inclusive byte interval, validated against the object's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes the interval covers.
    pub fn byte_len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Outcome of interpreting a request's Range header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// No range, non-`bytes` unit, multi-range, or malformed syntax — serve
    /// the full body.
    Full,
    /// A single satisfiable interval.
    Partial(ByteRange),
    /// Syntactically a range, but outside `[0, size)` — answer 416.
    Unsatisfiable,
}

/// Parse a Range header value.
/// Supports:
/// - bytes=start-end
/// - bytes=start-
/// - bytes=-suffix_len
///
/// Multi-range requests are treated as rangeless; the response format here
/// is single-part only.
pub fn parse_range_header(value: Option<&str>, size: u64) -> RangeRequest {
    let Some(value) = value else {
        return RangeRequest::Full;
    };
    let Some(spec) = value.trim().strip_prefix("bytes=") else {
        return RangeRequest::Full;
    };
    if spec.contains(',') {
        return RangeRequest::Full;
    }
    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeRequest::Full;
    };
    let start_str = start_str.trim();
    let end_str = end_str.trim();

    if start_str.is_empty() {
        // Suffix form: last N bytes.
        let Ok(suffix_len) = end_str.parse::<u64>() else {
            return RangeRequest::Full;
        };
        if suffix_len == 0 || size == 0 {
            return RangeRequest::Unsatisfiable;
        }
        return RangeRequest::Partial(ByteRange {
            start: size.saturating_sub(suffix_len),
            end: size - 1,
        });
    }

    let Ok(start) = start_str.parse::<u64>() else {
        return RangeRequest::Full;
    };
    let end = if end_str.is_empty() {
        if size == 0 {
            return RangeRequest::Unsatisfiable;
        }
        size - 1
    } else {
        match end_str.parse::<u64>() {
            Ok(end) => end,
            Err(_) => return RangeRequest::Full,
        }
    };

    if size == 0 || start > end || end >= size {
        return RangeRequest::Unsatisfiable;
    }
    RangeRequest::Partial(ByteRange { start, end })
}
