use std::ops::Range;

/// Replace the given byte ranges of `content`.
///
/// Ranges must be sorted and must not overlap, which holds for the matches of a single
/// regex scan.
pub(crate) fn splice(content: &str, replacements: &[(Range<usize>, String)]) -> String {
  let mut output = String::with_capacity(content.len());
  let mut cursor = 0;
  for (span, replacement) in replacements {
    output.push_str(&content[cursor..span.start]);
    output.push_str(replacement);
    cursor = span.end;
  }
  output.push_str(&content[cursor..]);
  output
}
