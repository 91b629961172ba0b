use crate::line_utils::is_comment;
use crate::model::{CommentStatement, Statement};

/// Consumes a maximal run of contiguous comment lines (spec §4.5).
/// `lines[0]` must already be a comment line.
pub fn scan(lines: &[String]) -> (Statement, usize) {
    let mut captured = Vec::new();
    let mut consumed = 0;

    while consumed < lines.len() {
        let trimmed = lines[consumed].trim();
        if !is_comment(trimmed) {
            break;
        }
        captured.push(trimmed.strip_prefix('#').unwrap_or(trimmed).to_string());
        consumed += 1;
    }

    (Statement::Comment(CommentStatement { lines: captured }), consumed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_contiguous_comment_run() {
        let lines = vec![
            "# first".to_string(),
            "#  second, extra space kept".to_string(),
            "RUN echo hi".to_string(),
        ];
        let (stmt, consumed) = scan(&lines);
        let Statement::Comment(comment) = stmt else {
            panic!("expected Comment")
        };
        assert_eq!(consumed, 2);
        assert_eq!(comment.lines, vec![" first", "  second, extra space kept"]);
    }
}
