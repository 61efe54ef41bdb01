//! Planning of classification requests for a semantic tokens operation.

use tower_lsp_server::ls_types::Range;

use crate::document::LineIndex;

use super::source::ClassificationRequest;

/// Turn the requested ranges into backend requests ordered by start offset.
///
/// `None` (or an empty list) classifies the whole document in one request.
/// The result is never empty, and concatenating the decoded output of the
/// requests in order keeps tokens sorted.
pub fn plan_requests(
    file: &str,
    index: &LineIndex,
    ranges: Option<&[Range]>,
) -> Vec<ClassificationRequest> {
    let ranges = ranges.filter(|ranges| !ranges.is_empty());
    let Some(ranges) = ranges else {
        return vec![ClassificationRequest {
            file: file.to_string(),
            start: 0,
            length: index.len(),
        }];
    };

    let mut requests: Vec<ClassificationRequest> = ranges
        .iter()
        .map(|range| {
            let start = index.position_to_offset(range.start);
            let end = index.position_to_offset(range.end).max(start);
            ClassificationRequest {
                file: file.to_string(),
                start,
                length: end - start,
            }
        })
        .collect();
    requests.sort_by_key(|request| request.start);
    requests
}
