/// Tracks fenced code blocks while scanning markdown line by line.
///
/// A block opens on three or more backticks or tildes and closes on a fence
/// of the same character that is at least as long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceTracker {
  fence: Option<(char, usize)>,
}

impl FenceTracker {
  #[must_use]
  pub const fn new() -> Self {
    Self { fence: None }
  }

  #[must_use]
  pub const fn in_code_block(&self) -> bool {
    self.fence.is_some()
  }

  /// Feed one line. Returns `true` if the line belongs to a code block,
  /// including its opening and closing fences.
  pub fn observe(&mut self, line: &str) -> bool {
    let indent = line.len() - line.trim_start_matches(' ').len();
    let trimmed = line.trim_start();
    let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'));

    let Some(marker) = marker.filter(|_| indent <= 3) else {
      return self.in_code_block();
    };
    let count = trimmed.chars().take_while(|&c| c == marker).count();
    if count < 3 {
      return self.in_code_block();
    }

    match self.fence {
      None => self.fence = Some((marker, count)),
      Some((open, open_count)) if open == marker && count >= open_count => {
        self.fence = None;
      },
      Some(_) => {},
    }
    true
  }
}

/// Replace the contents of inline code spans in `line` with spaces.
///
/// Byte offsets are preserved, so positions found in the masked line are
/// valid in the original. An unmatched backtick run is left as-is.
#[must_use]
pub fn mask_code_spans(line: &str) -> String {
  let bytes = line.as_bytes();
  let mut masked = line.to_string().into_bytes();
  let mut idx = 0;

  while idx < bytes.len() {
    if bytes[idx] != b'`' {
      idx += 1;
      continue;
    }
    let run = bytes[idx..].iter().take_while(|&&b| b == b'`').count();
    let body_start = idx + run;

    let close = find_backtick_run(&bytes[body_start..], run);
    match close {
      Some(offset) => {
        let body_end = body_start + offset;
        for byte in &mut masked[body_start..body_end] {
          *byte = b' ';
        }
        idx = body_end + run;
      },
      None => idx = body_start,
    }
  }

  // Span bounds are ASCII backticks, so whole characters were replaced.
  String::from_utf8(masked)
    .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Offset of the first backtick run of exactly `len` in `haystack`.
fn find_backtick_run(haystack: &[u8], len: usize) -> Option<usize> {
  let mut idx = 0;
  while idx < haystack.len() {
    if haystack[idx] == b'`' {
      let run = haystack[idx..].iter().take_while(|&&b| b == b'`').count();
      if run == len {
        return Some(idx);
      }
      idx += run;
    } else {
      idx += 1;
    }
  }
  None
}
